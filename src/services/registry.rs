//! Registry of notifiers, one per destination, and fan-out over several
//! destinations.

use std::fmt;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::config::{NotifierSettings, SendOptions, Verbosity, WatchOptions};
use crate::models::Platform;
use crate::services::notifications::Notifier;
use crate::utils::CallSite;
use crate::watch::{Details, FunctionTable, Watch, WatchArgs, WatchedIter};

type NotifierFactory = Box<dyn Fn(Platform, NotifierSettings) -> Notifier + Send + Sync>;

/// Which destinations a call goes to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SendTo {
    /// Every destination initialized so far
    #[default]
    Initialized,
    One(Platform),
    Many(Vec<Platform>),
}

impl From<Platform> for SendTo {
    fn from(platform: Platform) -> Self {
        SendTo::One(platform)
    }
}

impl From<Vec<Platform>> for SendTo {
    fn from(platforms: Vec<Platform>) -> Self {
        SendTo::Many(platforms)
    }
}

impl From<&[Platform]> for SendTo {
    fn from(platforms: &[Platform]) -> Self {
        SendTo::Many(platforms.to_vec())
    }
}

impl<const N: usize> From<[Platform; N]> for SendTo {
    fn from(platforms: [Platform; N]) -> Self {
        SendTo::Many(platforms.to_vec())
    }
}

/// One resolved destination of a call
struct Target {
    platform: Platform,
    /// Later destinations of a fan-out log construction only
    quiet: bool,
}

impl Target {
    fn init_settings(&self, mut settings: NotifierSettings) -> NotifierSettings {
        if self.quiet && settings.verbose == Verbosity::Full {
            settings.verbose = Verbosity::InitOnly;
        }
        settings
    }

    fn watch_options(&self, options: &WatchOptions) -> WatchOptions {
        let mut options = options.clone();
        if self.quiet {
            options.verbose = Some(false);
        }
        options
    }

    fn send_options(&self, options: &SendOptions) -> SendOptions {
        let mut options = options.clone();
        if self.quiet {
            options.verbose = Some(false);
        }
        options
    }
}

/// Notifiers by destination.
///
/// The registry starts empty. `init` creates a notifier once per
/// destination; every other call creates a missing notifier from the
/// options it was given. Creation is atomic per destination.
pub struct Registry {
    notifiers: DashMap<Platform, Notifier>,
    factory: NotifierFactory,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("destinations", &self.destinations())
            .finish()
    }
}

impl Registry {
    /// Registry whose notifiers talk to the real platform APIs
    pub fn new() -> Self {
        Self::with_factory(Notifier::connect)
    }

    /// Registry building its notifiers with `factory`
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(Platform, NotifierSettings) -> Notifier + Send + Sync + 'static,
    {
        Self {
            notifiers: DashMap::new(),
            factory: Box::new(factory),
        }
    }

    /// Create notifiers for `send_to`.
    ///
    /// A destination that already has a notifier keeps it; the new settings
    /// are ignored with a warning.
    pub fn init(&self, send_to: impl Into<SendTo>, settings: NotifierSettings) {
        for target in self.targets(send_to.into()) {
            let settings = target.init_settings(settings.clone());
            match self.notifiers.entry(target.platform) {
                Entry::Occupied(_) => {
                    if settings.verbose.logs_init() {
                        tracing::warn!(
                            platform = %target.platform,
                            "{}Notifier already initialized. Skipping initialization.",
                            target.platform
                        );
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert((self.factory)(target.platform, settings));
                }
            }
        }
    }

    pub fn get(&self, platform: Platform) -> Option<Notifier> {
        self.notifiers.get(&platform).map(|n| n.value().clone())
    }

    /// Initialized destinations, in fan-out order
    pub fn destinations(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.notifiers.iter().map(|e| *e.key()).collect();
        platforms.sort();
        platforms
    }

    /// Send `data` to every destination in `send_to`.
    pub fn send(&self, data: impl fmt::Display, send_to: impl Into<SendTo>, options: &SendOptions) {
        let data = data.to_string();
        for target in self.targets(send_to.into()) {
            let notifier = self.notifier(&target, options.to_init_settings());
            notifier.send(&data, &target.send_options(options));
        }
    }

    /// Watch covering every destination in `send_to`.
    ///
    /// Without any destination the returned watch sends nothing.
    #[track_caller]
    pub fn watch(&self, send_to: impl Into<SendTo>, options: &WatchOptions) -> Watch {
        let site = CallSite::capture();
        let watches: Vec<Watch> = self
            .targets(send_to.into())
            .iter()
            .map(|target| {
                self.notifier(target, options.to_init_settings())
                    .watch_at(&target.watch_options(options), site.clone())
            })
            .collect();
        Watch::combine(watches)
    }

    /// Replace `table[name]` with a version watched on every destination in
    /// `send_to`.
    #[track_caller]
    pub fn register<A: WatchArgs + 'static, R: 'static>(
        &self,
        table: &mut FunctionTable<A, R>,
        name: &str,
        send_to: impl Into<SendTo>,
        options: &WatchOptions,
    ) {
        let watch = self.watch(send_to, options);
        if watch.is_noop() {
            return;
        }
        if watch.attach(table, name) {
            tracing::debug!(table = table.name(), function = name, "Registered watch");
        }
    }

    /// Progress-reporting iterator over `iterable` for every destination in
    /// `send_to`.
    ///
    /// Without any destination the items are passed through untouched.
    #[track_caller]
    pub fn watch_iterable<I: IntoIterator>(
        &self,
        iterable: I,
        step: usize,
        total: Option<usize>,
        send_to: impl Into<SendTo>,
        options: &WatchOptions,
    ) -> WatchedIter<I::IntoIter> {
        let site = CallSite::capture();
        let reporters: Vec<_> = self
            .targets(send_to.into())
            .iter()
            .map(|target| {
                self.notifier(target, options.to_init_settings())
                    .reporter(&target.watch_options(options))
            })
            .collect();

        if reporters.is_empty() {
            return WatchedIter::passthrough(iterable.into_iter());
        }
        let details =
            Details::from_options(options, site).subject(std::any::type_name::<I>());
        WatchedIter::new(iterable.into_iter(), reporters, details, step, total)
    }

    /// Existing notifier for the target, or a new one built from `settings`
    fn notifier(&self, target: &Target, settings: NotifierSettings) -> Notifier {
        self.notifiers
            .entry(target.platform)
            .or_insert_with(|| (self.factory)(target.platform, target.init_settings(settings)))
            .value()
            .clone()
    }

    fn targets(&self, send_to: SendTo) -> Vec<Target> {
        let mut platforms = match send_to {
            SendTo::Initialized => self.destinations(),
            SendTo::One(platform) => vec![platform],
            SendTo::Many(platforms) => platforms,
        };
        let mut seen = Vec::with_capacity(platforms.len());
        platforms.retain(|p| {
            let first = !seen.contains(p);
            seen.push(*p);
            first
        });

        if platforms.is_empty() {
            tracing::warn!(
                "No destination specified. Pass `send_to` or initialize a destination with \
                 `Registry::init`. No notifications will be sent."
            );
        }

        platforms
            .into_iter()
            .enumerate()
            .map(|(i, platform)| Target {
                platform,
                quiet: i > 0,
            })
            .collect()
    }
}
