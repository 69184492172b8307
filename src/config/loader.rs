//! Environment fallback loader for notifier settings
//!
//! Each platform reads three variables, prefixed with the uppercase platform
//! name:
//! - `SLACK_BOT_TOKEN` -> `bot_token`
//! - `SLACK_CHANNEL` -> `channel`
//! - `SLACK_MENTION_TO` -> `mention_to`

use config::{Config, Environment, Map};
use serde::Deserialize;

use crate::config::error::ConfigError;
use crate::models::Platform;

/// Separator between the platform prefix and the key
const PREFIX_SEPARATOR: &str = "_";

/// Values found in the environment for one platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlatformEnv {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub mention_to: Option<String>,
}

/// Loads [`PlatformEnv`] values through the `config` crate.
///
/// By default the process environment is read. Tests (and embedders that
/// manage their own secrets) can inject a fixed variable map instead.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    source: Option<Map<String, String>>,
}

impl ConfigLoader {
    /// Loader backed by the process environment
    pub fn new() -> Self {
        Self { source: None }
    }

    /// Loader backed by a fixed map of variable names to values
    ///
    /// Keys use the same names as real environment variables
    /// (e.g. `DISCORD_CHANNEL`).
    pub fn with_source<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            source: Some(source),
        }
    }

    /// Load the fallback values for `platform`
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be collected or
    /// deserialized.
    pub fn load(&self, platform: Platform) -> Result<PlatformEnv, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(platform.env_prefix())
                    .prefix_separator(PREFIX_SEPARATOR)
                    .ignore_empty(true)
                    .source(self.source.clone()),
            )
            .build()?;

        config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!(
                "Failed to deserialize {} environment: {}",
                platform.env_prefix(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_platform_variables() {
        let loader = ConfigLoader::with_source([
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("SLACK_CHANNEL", "ops"),
            ("SLACK_MENTION_TO", "@U0123456789"),
            ("DISCORD_CHANNEL", "1234567890"),
        ]);

        let env = loader.load(Platform::Slack).expect("Should load slack env");
        assert_eq!(env.bot_token.as_deref(), Some("xoxb-test"));
        assert_eq!(env.channel.as_deref(), Some("ops"));
        assert_eq!(env.mention_to.as_deref(), Some("@U0123456789"));
    }

    #[test]
    fn test_other_platform_is_ignored() {
        let loader = ConfigLoader::with_source([("SLACK_CHANNEL", "ops")]);
        let env = loader.load(Platform::Discord).expect("Should load discord env");
        assert_eq!(env, PlatformEnv::default());
    }

    #[test]
    fn test_numeric_channel_stays_a_string() {
        let loader = ConfigLoader::with_source([("DISCORD_CHANNEL", "1234567890123456789")]);
        let env = loader.load(Platform::Discord).expect("Should load discord env");
        assert_eq!(env.channel.as_deref(), Some("1234567890123456789"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let loader = ConfigLoader::with_source([("SLACK_BOT_TOKEN", "")]);
        let env = loader.load(Platform::Slack).expect("Should load slack env");
        assert!(env.bot_token.is_none());
    }
}
