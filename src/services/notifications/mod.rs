//! Notifiers and the destinations they deliver through.
//!
//! The core trait `Destination` hides the platform API; `Notifier` holds the
//! per-destination defaults and turns sends and watches into messages.

mod discord_provider;
mod notifier;
mod provider;
mod slack_provider;

#[cfg(test)]
pub(crate) mod recording_provider;

pub use discord_provider::{DISCORD_API_BASE, DiscordProvider};
pub use notifier::{BoundSender, Notifier};
pub use provider::{Destination, NotificationMessage, TRACEBACK_COLOR, TRACEBACK_COLOR_HEX};
pub use slack_provider::{SLACK_API_BASE, SlackProvider};
