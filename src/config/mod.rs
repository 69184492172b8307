//! Notifier configuration.
//!
//! Settings come from two places, lowest priority first:
//! 1. `{PLATFORM}_BOT_TOKEN`, `{PLATFORM}_CHANNEL`, `{PLATFORM}_MENTION_TO`
//!    environment variables (read once, when a notifier is built)
//! 2. Values passed to `init` or to the individual calls

pub mod error;
pub mod loader;
pub mod settings;

pub use error::ConfigError;
pub use loader::{ConfigLoader, PlatformEnv};
pub use settings::{NotifierSettings, SendOptions, Verbosity, WatchOptions};
