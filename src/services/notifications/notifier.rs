//! Per-destination notifier.

use std::fmt;
use std::sync::Arc;

use crate::config::{ConfigLoader, NotifierSettings, SendOptions, WatchOptions};
use crate::models::{Level, Platform, SendConfig};
use crate::utils::CallSite;
use crate::watch::{Details, FunctionTable, Reporter, Watch, WatchArgs, WatchedIter};

use super::discord_provider::DiscordProvider;
use super::provider::{Destination, NotificationMessage};
use super::slack_provider::SlackProvider;

const SEND_PREFIX: &str = "Send message: ";

struct NotifierInner {
    platform: Platform,
    settings: NotifierSettings,
    disabled: bool,
    destination: Arc<dyn Destination>,
}

/// Sends messages and builds watches for one destination.
///
/// Cloning is cheap; clones share the same destination and defaults.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("platform", &self.inner.platform)
            .field("destination", &self.inner.destination.name())
            .field("disabled", &self.inner.disabled)
            .finish()
    }
}

impl Notifier {
    /// Build a notifier over an existing destination.
    ///
    /// Logs the construction diagnostics unless the settings are quiet. A
    /// missing token or a destination that rejects its own configuration
    /// disables the notifier.
    pub fn new(
        platform: Platform,
        settings: NotifierSettings,
        destination: Arc<dyn Destination>,
    ) -> Self {
        let logs_init = settings.verbose.logs_init();
        let mut disabled = settings.disable;

        if disabled {
            if logs_init {
                tracing::info!(
                    platform = %platform,
                    "{}Notifier is disabled. No messages will be sent.",
                    platform
                );
            }
        } else if settings.token.is_none() {
            if logs_init {
                tracing::error!(
                    platform = %platform,
                    "Missing {} bot token. Pass a token or set {}_BOT_TOKEN. {}Notifier is disabled.",
                    platform,
                    platform.env_prefix(),
                    platform
                );
            }
            disabled = true;
        } else if let Err(e) = destination.validate_config() {
            if logs_init {
                tracing::error!(
                    platform = %platform,
                    error = %e,
                    "Invalid {} configuration: {}. {}Notifier is disabled.",
                    platform,
                    e,
                    platform
                );
            }
            disabled = true;
        } else if logs_init {
            if let Err(e) = settings.validate(platform) {
                tracing::warn!(platform = %platform, error = %e, "{}", e);
            }
            match &settings.channel {
                Some(channel) => tracing::info!(
                    platform = %platform,
                    "{}Notifier initialized with default channel: {}",
                    platform,
                    channel
                ),
                None => tracing::warn!(
                    platform = %platform,
                    "No default {} channel configured. The channel must be given on every call.",
                    platform
                ),
            }
        }

        Self {
            inner: Arc::new(NotifierInner {
                platform,
                settings,
                disabled,
                destination,
            }),
        }
    }

    /// Build a notifier talking to the real platform API.
    ///
    /// `token`, `channel` and `mention_to` fall back to the `{PLATFORM}_*`
    /// environment variables.
    pub fn connect(platform: Platform, settings: NotifierSettings) -> Self {
        Self::connect_with(platform, settings, &ConfigLoader::new())
    }

    /// Same as [`Notifier::connect`] with an explicit environment source
    pub fn connect_with(
        platform: Platform,
        settings: NotifierSettings,
        loader: &ConfigLoader,
    ) -> Self {
        let settings = match loader.load(platform) {
            Ok(env) => settings.with_env_fallback(env),
            Err(e) => {
                if settings.verbose.logs_init() {
                    tracing::warn!(
                        platform = %platform,
                        error = %e,
                        "Failed to read {} environment: {}",
                        platform,
                        e
                    );
                }
                settings
            }
        };

        let token = settings.token.clone().unwrap_or_default();
        let destination: Arc<dyn Destination> = match platform {
            Platform::Slack => Arc::new(SlackProvider::new(token)),
            Platform::Discord => Arc::new(DiscordProvider::new(token)),
        };
        Self::new(platform, settings, destination)
    }

    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    /// Defaults after the environment fallback was applied
    pub fn settings(&self) -> &NotifierSettings {
        &self.inner.settings
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.disabled
    }

    /// Send `data` as a plain message.
    ///
    /// A mention target, when present, is always mentioned. Delivery errors
    /// are logged and never returned.
    pub fn send(&self, data: impl fmt::Display, options: &SendOptions) {
        let mention_to = options
            .mention_to
            .clone()
            .or_else(|| self.inner.settings.mention_to.clone());
        let config = SendConfig {
            channel: options
                .channel
                .clone()
                .or_else(|| self.inner.settings.channel.clone()),
            mention_level: if mention_to.is_some() {
                Level::Info
            } else {
                Level::Error
            },
            mention_to,
            mention_if_ends: self.inner.settings.mention_if_ends,
            verbose: options
                .verbose
                .unwrap_or(self.inner.settings.verbose.logs_messages()),
            disable: options.disable.unwrap_or(self.inner.disabled),
        };
        self.dispatch(
            &config,
            &data.to_string(),
            None,
            Level::Info,
            false,
            SEND_PREFIX,
        );
    }

    /// Watch for a block or a function; see [`Watch`].
    #[track_caller]
    pub fn watch(&self, options: &WatchOptions) -> Watch {
        self.watch_at(options, CallSite::capture())
    }

    /// Replace `table[name]` with a watched wrapper.
    ///
    /// Leaves the table untouched (with a warning when verbose) when `name`
    /// has no entry. Registering twice wraps twice.
    #[track_caller]
    pub fn register<A: WatchArgs + 'static, R: 'static>(
        &self,
        table: &mut FunctionTable<A, R>,
        name: &str,
        options: &WatchOptions,
    ) {
        let watch = self.watch_at(options, CallSite::capture());
        if watch.attach(table, name) && self.inner.settings.verbose.logs_init() {
            tracing::info!(
                platform = %self.inner.platform,
                "{}Notifier registered on `{}.{}`",
                self.inner.platform,
                table.name(),
                name
            );
        }
    }

    /// Wrap `iterable` so progress is reported every `step` items.
    #[track_caller]
    pub fn watch_iterable<I: IntoIterator>(
        &self,
        iterable: I,
        step: usize,
        total: Option<usize>,
        options: &WatchOptions,
    ) -> WatchedIter<I::IntoIter> {
        let details = Details::from_options(options, CallSite::capture())
            .subject(std::any::type_name::<I>());
        WatchedIter::new(
            iterable.into_iter(),
            vec![self.reporter(options)],
            details,
            step,
            total,
        )
    }

    pub(crate) fn watch_at(&self, options: &WatchOptions, site: CallSite) -> Watch {
        Watch::new(
            vec![self.reporter(options)],
            Details::from_options(options, site),
        )
    }

    pub(crate) fn reporter(&self, options: &WatchOptions) -> Reporter {
        let callsite_level = options
            .callsite_level
            .unwrap_or(self.inner.settings.callsite_level);
        Reporter::new(self.bind(self.watch_config(options)), callsite_level)
    }

    /// Effective config for a watch: overrides win over defaults
    pub(crate) fn watch_config(&self, options: &WatchOptions) -> SendConfig {
        let defaults = &self.inner.settings;
        SendConfig {
            channel: options.channel.clone().or_else(|| defaults.channel.clone()),
            mention_to: options
                .mention_to
                .clone()
                .or_else(|| defaults.mention_to.clone()),
            mention_level: options.mention_level.unwrap_or(defaults.mention_level),
            mention_if_ends: options.mention_if_ends.unwrap_or(defaults.mention_if_ends),
            verbose: options.verbose.unwrap_or(defaults.verbose.logs_messages()),
            disable: options.disable.unwrap_or(self.inner.disabled),
        }
    }

    pub fn bind(&self, config: SendConfig) -> BoundSender {
        BoundSender {
            notifier: self.clone(),
            config,
        }
    }

    fn dispatch(
        &self,
        config: &SendConfig,
        body: &str,
        traceback: Option<&str>,
        level: Level,
        ends: bool,
        prefix: &str,
    ) {
        let platform = self.inner.platform;
        let result = if config.disable {
            Ok(())
        } else {
            let message = NotificationMessage {
                body: body.to_string(),
                channel: config.channel.clone(),
                mention: config.mention_for(level, ends).map(str::to_string),
                traceback: traceback.map(str::to_string),
            };
            self.inner.destination.deliver(&message)
        };

        if !config.verbose {
            return;
        }
        match result {
            Ok(()) if config.disable => {}
            Ok(()) => match level {
                Level::Info => tracing::info!(platform = %platform, "{}{}", prefix, body),
                Level::Warning => tracing::warn!(platform = %platform, "{}{}", prefix, body),
                Level::Error => tracing::error!(platform = %platform, "{}{}", prefix, body),
            },
            Err(e) => tracing::error!(
                platform = %platform,
                error = %e,
                "Error sending to {}: {}",
                platform,
                e
            ),
        }
    }
}

/// A notifier bound to the effective config of one watch.
#[derive(Clone, Debug)]
pub struct BoundSender {
    notifier: Notifier,
    config: SendConfig,
}

impl BoundSender {
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &SendConfig {
        &self.config
    }

    /// Send `body` at `level`; `ends` marks the final message of a watch.
    pub fn emit(&self, body: &str, level: Level, traceback: Option<&str>, ends: bool) {
        self.notifier
            .dispatch(&self.config, body, traceback, level, ends, "")
    }
}
