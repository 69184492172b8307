//! Plain value types shared by notifiers, watches and adapters.

mod level;
mod platform;
mod send_config;

pub use level::Level;
pub use platform::Platform;
pub use send_config::SendConfig;
