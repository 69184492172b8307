use serde::Serialize;

use super::Level;

/// Effective settings for one send, watch or iterable watch.
///
/// Built by the notifier from its defaults with call-site overrides on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendConfig {
    pub channel: Option<String>,
    pub mention_to: Option<String>,
    pub mention_level: Level,
    pub mention_if_ends: bool,
    pub verbose: bool,
    pub disable: bool,
}

impl SendConfig {
    /// Returns the mention target if a message at `level` should carry it.
    ///
    /// `ends` marks the final message of a watch, which is mentioned whenever
    /// `mention_if_ends` is set.
    pub fn mention_for(&self, level: Level, ends: bool) -> Option<&str> {
        let target = self.mention_to.as_deref()?;
        if level.reaches(self.mention_level) || (ends && self.mention_if_ends) {
            Some(target)
        } else {
            None
        }
    }
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            channel: None,
            mention_to: None,
            mention_level: Level::Error,
            mention_if_ends: true,
            verbose: true,
            disable: false,
        }
    }
}
