//! Watches over blocks and functions.

use std::borrow::Cow;
use std::fmt::{Debug, Display};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use super::args::WatchArgs;
use super::table::FunctionTable;
use super::{Details, Reporter, panic_message};

/// Reports the start and the end (or failure) of a piece of work.
///
/// A watch is a description; nothing is sent until it is used:
/// - [`Watch::enter`] returns a guard for a scoped block. Dropping the guard
///   sends the end message, or an error message while unwinding.
/// - [`Watch::run`] / [`Watch::try_run`] watch a closure. Errors and panics
///   are reported and then handed back unchanged.
/// - [`Watch::wrap`] / [`Watch::try_wrap`] turn a function into a watched
///   function; every call gets its own start and end message.
///
/// # Example
/// ```ignore
/// let watch = notifier.watch(&WatchOptions::new().label("nightly import"));
/// let rows = watch.try_run(|| import_rows(&path))?;
/// ```
#[derive(Debug, Clone)]
pub struct Watch {
    reporters: Vec<Reporter>,
    details: Details,
}

impl Watch {
    pub(crate) fn new(reporters: Vec<Reporter>, details: Details) -> Self {
        Self { reporters, details }
    }

    /// A watch that sends nothing
    pub fn noop() -> Self {
        Self {
            reporters: Vec::new(),
            details: Details::default(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.reporters.is_empty()
    }

    /// Merge several watches into one.
    ///
    /// The result starts each part in the given order and ends them in
    /// reverse order. Label and call site are taken from the first watch.
    pub fn combine(watches: impl IntoIterator<Item = Watch>) -> Watch {
        let mut watches = watches.into_iter();
        let Some(mut combined) = watches.next() else {
            return Watch::noop();
        };
        for watch in watches {
            combined.reporters.extend(watch.reporters);
        }
        combined
    }

    /// Name shown as `function: <name>` in every message.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.details = self.details.function(name);
        self
    }

    /// Send the start message and return a guard that ends the watch.
    pub fn enter(self) -> WatchGuard {
        let started = self.begin();
        WatchGuard {
            watch: self,
            started: Some(started),
        }
    }

    /// Watch `f`, reporting a panic as an error before resuming it.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        self.observe(f, |_| None)
    }

    /// Watch a fallible `f`; an `Err` is reported and returned unchanged.
    pub fn try_run<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: Display + Debug,
    {
        self.observe(f, |result| match result {
            Ok(_) => None,
            Err(e) => Some((e.to_string(), format!("{:?}", e))),
        })
    }

    /// Watched version of `f`.
    ///
    /// Functions with several arguments take a tuple. Unless [`Watch::named`]
    /// was used, the function is named after the type of `f`. The call site
    /// shown in messages is where `wrap` was called (` ▷ defined at:`), not
    /// where each call happens. Argument values named by
    /// [`WatchOptions::params`](crate::WatchOptions::params) are shown per call.
    pub fn wrap<A, R, F>(self, f: F) -> impl Fn(A) -> R
    where
        A: WatchArgs,
        F: Fn(A) -> R,
    {
        let watch = self.for_function::<F>();
        move |args: A| watch.for_call(&args).run(|| f(args))
    }

    /// Watched version of a fallible `f`; see [`Watch::try_run`].
    pub fn try_wrap<A, T, E, F>(self, f: F) -> impl Fn(A) -> Result<T, E>
    where
        A: WatchArgs,
        F: Fn(A) -> Result<T, E>,
        E: Display + Debug,
    {
        let watch = self.for_function::<F>();
        move |args: A| watch.for_call(&args).try_run(|| f(args))
    }

    /// Replace `table[name]` with its watched version.
    ///
    /// Returns `false` when the entry does not exist; verbose reporters warn.
    pub(crate) fn attach<A: WatchArgs + 'static, R: 'static>(
        self,
        table: &mut FunctionTable<A, R>,
        name: &str,
    ) -> bool {
        let Some(original) = table.get(name) else {
            for reporter in self.reporters.iter().filter(|r| r.verbose()) {
                tracing::warn!(
                    platform = %reporter.platform(),
                    table = table.name(),
                    function = name,
                    "Cannot register on `{}.{}`: no such function. Skipping.",
                    table.name(),
                    name
                );
            }
            return false;
        };

        let wrapped = self.named(name).wrap(move |args: A| original(args));
        table.insert(name, wrapped);
        true
    }

    fn for_function<F>(mut self) -> Self {
        if !self.details.has_function() {
            self = self.named(std::any::type_name::<F>());
        }
        self.details = self.details.definition();
        self
    }

    /// This watch with the argument values of one call in its messages
    fn for_call(&self, args: &impl WatchArgs) -> Cow<'_, Watch> {
        if self.is_noop() || !self.details.has_params() {
            return Cow::Borrowed(self);
        }
        Cow::Owned(Watch {
            reporters: self.reporters.clone(),
            details: self.details.with_args(&args.arg_values()),
        })
    }

    fn observe<R>(
        &self,
        f: impl FnOnce() -> R,
        failure: impl FnOnce(&R) -> Option<(String, String)>,
    ) -> R {
        let started = self.begin();
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => {
                match failure(&value) {
                    Some((error, traceback)) => self.fail(started, &error, &traceback),
                    None => self.succeed(started),
                }
                value
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                let traceback = format!("panicked: {}", message);
                self.fail(started, &message, &traceback);
                panic::resume_unwind(payload)
            }
        }
    }

    fn begin(&self) -> Instant {
        let started = Instant::now();
        for reporter in &self.reporters {
            reporter.info(&self.details.started(reporter.callsite_level()));
        }
        started
    }

    fn succeed(&self, started: Instant) {
        let elapsed = started.elapsed();
        for reporter in self.reporters.iter().rev() {
            reporter.ended(&self.details.ended(reporter.callsite_level(), elapsed));
        }
    }

    fn fail(&self, started: Instant, error: &str, traceback: &str) {
        let elapsed = started.elapsed();
        for reporter in self.reporters.iter().rev() {
            let body = self
                .details
                .failed(reporter.callsite_level(), error, elapsed);
            reporter.failed(&body, traceback);
        }
    }
}

/// Scoped watch; the end message is sent when the guard goes away.
///
/// If the thread is panicking at that point an error message is sent instead.
/// Use [`WatchGuard::fail`] to report an error without panicking.
#[must_use = "the watch ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct WatchGuard {
    watch: Watch,
    started: Option<Instant>,
}

impl WatchGuard {
    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// End the watch now
    pub fn finish(mut self) {
        if let Some(started) = self.started.take() {
            self.watch.succeed(started);
        }
    }

    /// End the watch with an error message for `error`
    pub fn fail<E: Display + Debug + ?Sized>(mut self, error: &E) {
        if let Some(started) = self.started.take() {
            self.watch
                .fail(started, &error.to_string(), &format!("{:?}", error));
        }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        let Some(started) = self.started.take() else {
            return;
        };
        if thread::panicking() {
            self.watch
                .fail(started, "panicked", "the watched block panicked");
        } else {
            self.watch.succeed(started);
        }
    }
}
