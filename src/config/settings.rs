//! Notifier defaults and per-call overrides.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::models::{Level, Platform};

// ============================================================================
// Default value functions
// ============================================================================

fn default_mention_level() -> Level {
    Level::Error
}

fn default_callsite_level() -> Level {
    Level::Error
}

fn default_true() -> bool {
    true
}

fn default_context_before() -> usize {
    1
}

fn default_context_after() -> usize {
    4
}

// ============================================================================
// Verbosity
// ============================================================================

/// How much a notifier logs locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Nothing is logged locally
    Quiet,
    /// Only construction-time diagnostics are logged
    InitOnly,
    /// Construction diagnostics and every sent message are logged
    #[default]
    Full,
}

impl Verbosity {
    /// Whether construction-time diagnostics are logged
    pub fn logs_init(self) -> bool {
        self != Verbosity::Quiet
    }

    /// Whether per-message lines are logged
    pub fn logs_messages(self) -> bool {
        self == Verbosity::Full
    }
}

impl From<bool> for Verbosity {
    fn from(verbose: bool) -> Self {
        if verbose { Verbosity::Full } else { Verbosity::Quiet }
    }
}

// ============================================================================
// NotifierSettings
// ============================================================================

/// Defaults a notifier is built with.
///
/// Every per-call option falls back to these. `token`, `channel` and
/// `mention_to` additionally fall back to the platform environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierSettings {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub mention_to: Option<String>,
    #[serde(default = "default_mention_level")]
    pub mention_level: Level,
    #[serde(default = "default_true")]
    pub mention_if_ends: bool,
    #[serde(default = "default_callsite_level")]
    pub callsite_level: Level,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub verbose: Verbosity,
    #[serde(default)]
    pub disable: bool,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            channel: None,
            mention_to: None,
            mention_level: default_mention_level(),
            mention_if_ends: true,
            callsite_level: default_callsite_level(),
            token: None,
            verbose: Verbosity::default(),
            disable: false,
        }
    }
}

impl NotifierSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn mention_to(mut self, mention_to: impl Into<String>) -> Self {
        self.mention_to = Some(mention_to.into());
        self
    }

    pub fn mention_level(mut self, level: Level) -> Self {
        self.mention_level = level;
        self
    }

    pub fn mention_if_ends(mut self, mention_if_ends: bool) -> Self {
        self.mention_if_ends = mention_if_ends;
        self
    }

    pub fn callsite_level(mut self, level: Level) -> Self {
        self.callsite_level = level;
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn verbose(mut self, verbose: impl Into<Verbosity>) -> Self {
        self.verbose = verbose.into();
        self
    }

    pub fn disable(mut self, disable: bool) -> Self {
        self.disable = disable;
        self
    }

    /// Fill `token`, `channel` and `mention_to` from the environment where
    /// they were not given explicitly.
    pub fn with_env_fallback(mut self, env: crate::config::PlatformEnv) -> Self {
        self.token = self.token.or(env.bot_token);
        self.channel = self.channel.or(env.channel);
        self.mention_to = self.mention_to.or(env.mention_to);
        self
    }

    /// Validate platform-specific constraints
    ///
    /// Discord only accepts numeric channel IDs.
    pub fn validate(&self, platform: Platform) -> Result<(), ConfigError> {
        if let (Platform::Discord, Some(channel)) = (platform, &self.channel) {
            if channel.is_empty() || !channel.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::validation(
                    "channel".to_string(),
                    format!(
                        "Discord channel must be a numeric channel ID, got '{}'",
                        channel
                    ),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Per-call overrides
// ============================================================================

/// Overrides for a single `send`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub channel: Option<String>,
    pub mention_to: Option<String>,
    pub verbose: Option<bool>,
    pub disable: Option<bool>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn mention_to(mut self, mention_to: impl Into<String>) -> Self {
        self.mention_to = Some(mention_to.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn disable(mut self, disable: bool) -> Self {
        self.disable = Some(disable);
        self
    }

    /// Settings used when a `send` has to create its notifier
    pub(crate) fn to_init_settings(&self) -> NotifierSettings {
        NotifierSettings {
            channel: self.channel.clone(),
            mention_to: self.mention_to.clone(),
            verbose: self.verbose.map(Verbosity::from).unwrap_or_default(),
            disable: self.disable.unwrap_or(false),
            ..NotifierSettings::default()
        }
    }
}

/// Overrides for `watch`, `register` and `watch_iterable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Names of the watched function's arguments whose values are shown
    pub params: Vec<String>,
    pub label: Option<String>,
    pub channel: Option<String>,
    pub mention_to: Option<String>,
    pub mention_level: Option<Level>,
    pub mention_if_ends: Option<bool>,
    pub callsite_level: Option<Level>,
    pub callsite_context_before: usize,
    pub callsite_context_after: usize,
    pub verbose: Option<bool>,
    pub disable: Option<bool>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            params: Vec::new(),
            label: None,
            channel: None,
            mention_to: None,
            mention_level: None,
            mention_if_ends: None,
            callsite_level: None,
            callsite_context_before: default_context_before(),
            callsite_context_after: default_context_after(),
            verbose: None,
            disable: None,
        }
    }
}

impl WatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show argument values of each call, labelled with `names` in argument
    /// order. `_` skips a position. Ignored for blocks and iterables.
    pub fn params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn mention_to(mut self, mention_to: impl Into<String>) -> Self {
        self.mention_to = Some(mention_to.into());
        self
    }

    pub fn mention_level(mut self, level: Level) -> Self {
        self.mention_level = Some(level);
        self
    }

    pub fn mention_if_ends(mut self, mention_if_ends: bool) -> Self {
        self.mention_if_ends = Some(mention_if_ends);
        self
    }

    pub fn callsite_level(mut self, level: Level) -> Self {
        self.callsite_level = Some(level);
        self
    }

    pub fn callsite_context(mut self, before: usize, after: usize) -> Self {
        self.callsite_context_before = before;
        self.callsite_context_after = after;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn disable(mut self, disable: bool) -> Self {
        self.disable = Some(disable);
        self
    }

    /// Settings used when a watch has to create its notifier
    pub(crate) fn to_init_settings(&self) -> NotifierSettings {
        let defaults = NotifierSettings::default();
        NotifierSettings {
            channel: self.channel.clone(),
            mention_to: self.mention_to.clone(),
            mention_level: self.mention_level.unwrap_or(defaults.mention_level),
            mention_if_ends: self.mention_if_ends.unwrap_or(defaults.mention_if_ends),
            callsite_level: self.callsite_level.unwrap_or(defaults.callsite_level),
            verbose: self.verbose.map(Verbosity::from).unwrap_or_default(),
            disable: self.disable.unwrap_or(false),
            token: None,
        }
    }
}
