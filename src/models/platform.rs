//! Supported notification destinations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// A notification platform a message can be sent to.
///
/// Ordering follows declaration order and decides the fan-out order when a
/// call targets every initialized destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Slack,
    Discord,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Slack, Platform::Discord];

    /// Lowercase destination name (`"slack"`, `"discord"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Slack => "slack",
            Platform::Discord => "discord",
        }
    }

    /// Human-facing platform name used in log lines
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Slack => "Slack",
            Platform::Discord => "Discord",
        }
    }

    /// Prefix of the fallback environment variables (`SLACK_BOT_TOKEN`, ...)
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Platform::Slack => "SLACK",
            Platform::Discord => "DISCORD",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slack" => Ok(Platform::Slack),
            "discord" => Ok(Platform::Discord),
            _ => Err(NotifyError::Validation {
                field: "send_to".to_string(),
                reason: format!("Unknown destination '{}'. Valid destinations are: slack, discord", s),
            }),
        }
    }
}
