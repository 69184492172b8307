//! Core destination trait and the message handed to it.
//!
//! This module provides the abstraction over notification platforms, so the
//! notifier and the watch machinery never depend on a concrete API.

use serde::Serialize;

use crate::error::NotifyResult;

/// Accent colour used for traceback attachments (Slack hex form)
pub const TRACEBACK_COLOR_HEX: &str = "#ff3d33";

/// Accent colour used for traceback embeds (Discord integer form)
pub const TRACEBACK_COLOR: u32 = 0xFF3D33;

/// Message to be delivered by a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    /// Message body, without any mention prefix
    pub body: String,
    /// Target channel (Slack channel name or ID, Discord channel ID)
    pub channel: Option<String>,
    /// Mention target, set only when the mention policy selected it
    pub mention: Option<String>,
    /// Error details shown as an attachment/embed
    pub traceback: Option<String>,
}

impl NotificationMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            channel: None,
            mention: None,
            traceback: None,
        }
    }

    /// Text actually posted: `<mention>\n<body>` when a mention is attached,
    /// the bare body otherwise.
    pub fn text(&self) -> String {
        match &self.mention {
            Some(mention) => format!("<{}>\n{}", mention, self.body),
            None => self.body.clone(),
        }
    }
}

/// Trait for notification destinations (Slack, Discord, ...)
///
/// Implementations perform exactly one blocking request per call. They
/// return errors instead of logging them; the notifier decides what to log.
/// All destinations must be Send + Sync so notifiers can be shared.
///
/// # Example Implementation
/// ```ignore
/// pub struct EchoDestination;
///
/// impl Destination for EchoDestination {
///     fn deliver(&self, message: &NotificationMessage) -> NotifyResult<()> {
///         println!("{}", message.text());
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "echo"
///     }
/// }
/// ```
pub trait Destination: Send + Sync {
    /// Delivers a notification message
    ///
    /// # Arguments
    /// * `message` - The notification message to send
    ///
    /// # Returns
    /// Ok(()) once the platform accepted the message
    fn deliver(&self, message: &NotificationMessage) -> NotifyResult<()>;

    /// Returns the destination name for logging/debugging
    fn name(&self) -> &'static str;

    /// Validates destination configuration (optional, default no-op)
    fn validate_config(&self) -> NotifyResult<()> {
        Ok(())
    }
}
