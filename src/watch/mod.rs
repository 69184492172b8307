//! Watches: start/end/error notifications around blocks, functions and
//! iterations.
//!
//! - [`Watch`] covers a block ([`Watch::enter`], [`Watch::run`]) or a
//!   function ([`Watch::wrap`]).
//! - [`WatchedIter`] reports progress over an iterator in batches.
//! - [`FunctionTable`] is the registration target for
//!   [`Notifier::register`](crate::Notifier::register).
//!
//! A watch may carry several reporters (one per destination). Start messages
//! go out in reporter order, end and error messages in reverse order.

mod args;
mod details;
mod iterable;
mod scope;
mod table;

use std::any::Any;

pub use args::WatchArgs;
pub(crate) use details::Details;
pub use iterable::WatchedIter;
pub use scope::{Watch, WatchGuard};
pub use table::{FunctionTable, WatchedFn};

use crate::models::{Level, Platform};
use crate::services::notifications::BoundSender;

/// One destination's view of a watch.
#[derive(Debug, Clone)]
pub(crate) struct Reporter {
    sender: BoundSender,
    callsite_level: Level,
}

impl Reporter {
    pub(crate) fn new(sender: BoundSender, callsite_level: Level) -> Self {
        Self {
            sender,
            callsite_level,
        }
    }

    pub(crate) fn platform(&self) -> Platform {
        self.sender.notifier().platform()
    }

    pub(crate) fn verbose(&self) -> bool {
        self.sender.config().verbose
    }

    pub(crate) fn callsite_level(&self) -> Level {
        self.callsite_level
    }

    pub(crate) fn info(&self, body: &str) {
        self.sender.emit(body, Level::Info, None, false);
    }

    /// Final message of a successful watch
    pub(crate) fn ended(&self, body: &str) {
        self.sender.emit(body, Level::Info, None, true);
    }

    pub(crate) fn failed(&self, body: &str, traceback: &str) {
        self.sender.emit(body, Level::Error, Some(traceback), true);
    }
}

/// Text carried by a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
