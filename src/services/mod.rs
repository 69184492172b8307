//! Notifiers and the registry that hands them out.
//!
//! `notifications` holds one notifier per destination together with the
//! platform adapters; `registry` maps destinations to notifiers and fans a
//! call out over several of them.

pub mod notifications;
mod registry;

pub use notifications::{Destination, DiscordProvider, NotificationMessage, Notifier, SlackProvider};
pub use registry::{Registry, SendTo};
