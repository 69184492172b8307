//! Notist Library
//!
//! Slack and Discord notifications for long-running work: plain messages,
//! start/end/error reports around blocks and functions, and batched progress
//! over iterators.
//!
//! ```ignore
//! use notist::{NotifierSettings, Platform, Registry, SendOptions, SendTo, WatchOptions};
//!
//! let registry = Registry::new();
//! registry.init(Platform::Slack, NotifierSettings::new().channel("ops"));
//!
//! registry.send("Job finished!", SendTo::Initialized, &SendOptions::new());
//!
//! let watch = registry.watch(SendTo::Initialized, &WatchOptions::new().label("import"));
//! watch.try_run(|| import_rows())?;
//!
//! for batch in registry.watch_iterable(batches, 10, None, SendTo::Initialized, &WatchOptions::new()) {
//!     process(batch);
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod services;
pub mod utils;
pub mod watch;

pub use config::{NotifierSettings, SendOptions, Verbosity, WatchOptions};
pub use error::{NotifyError, NotifyResult};
pub use logger::{LoggerConfig, init_logger};
pub use models::{Level, Platform, SendConfig};
pub use services::{Notifier, Registry, SendTo};
pub use watch::{FunctionTable, Watch, WatchArgs, WatchGuard, WatchedIter};

/// Crate version
pub fn pkg_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
