//! In-memory destination used by the crate's tests.

use std::sync::{Arc, Mutex};

use super::provider::{Destination, NotificationMessage};
use crate::error::{NotifyError, NotifyResult};
use crate::models::Platform;

/// Records every delivered message instead of sending it.
#[derive(Clone, Default)]
pub(crate) struct RecordingProvider {
    sent: Arc<Mutex<Vec<NotificationMessage>>>,
    fail: bool,
}

impl RecordingProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A destination that rejects every message with an HTTP 500
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn sent(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.sent().iter().map(NotificationMessage::text).collect()
    }
}

impl Destination for RecordingProvider {
    fn deliver(&self, message: &NotificationMessage) -> NotifyResult<()> {
        if message.channel.is_none() {
            return Err(NotifyError::MissingChannel {
                platform: Platform::Slack,
            });
        }
        if self.fail {
            return Err(NotifyError::HttpStatus {
                platform: Platform::Slack,
                status: 500,
                body: "internal error".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Notifier for `platform` delivering into a fresh recording destination.
///
/// A token is filled in when the settings carry none so the notifier is not
/// disabled by the missing-token check.
pub(crate) fn recording_notifier(
    platform: Platform,
    settings: crate::config::NotifierSettings,
) -> (super::Notifier, RecordingProvider) {
    let settings = match settings.token {
        Some(_) => settings,
        None => settings.token("test-token"),
    };
    let provider = RecordingProvider::new();
    let notifier = super::Notifier::new(platform, settings, Arc::new(provider.clone()));
    (notifier, provider)
}
