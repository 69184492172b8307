//! Progress reporting over iterators.

use std::fmt::{Debug, Display};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use super::{Details, Reporter, panic_message};
use crate::models::Level;
use crate::utils::format_duration;

/// Items `first..=last` (1-based) of the batch being processed
#[derive(Debug, Clone, Copy)]
struct Batch {
    first: usize,
    last: usize,
    started: Instant,
}

#[derive(Debug, Default)]
struct Progress {
    started: Option<Instant>,
    yielded: usize,
    batch: Option<Batch>,
    in_item: bool,
    finished: bool,
}

/// Iterator adapter that reports progress every `step` items.
///
/// The first call to `next` sends `Start watching`; each batch sends a
/// `Processing` message when its first item is yielded and a `Processed`
/// message once its last item is done. Exhausting the iterator closes a
/// partial batch and sends `End watching`.
///
/// A plain `for` loop cannot observe failures in the loop body. Use
/// [`WatchedIter::try_run`] (or [`WatchedIter::run`] for panics only) to get
/// an `Error while processing` message for the batch that failed.
///
/// # Example
/// ```ignore
/// let files = notifier.watch_iterable(paths, 10, Some(paths_len), &WatchOptions::new());
/// files.try_run(|files| {
///     for path in files {
///         upload(&path)?;
///     }
///     Ok(())
/// })?;
/// ```
#[derive(Debug)]
pub struct WatchedIter<I> {
    inner: I,
    reporters: Vec<Reporter>,
    details: Details,
    step: usize,
    total: Option<usize>,
    progress: Progress,
}

impl<I: Iterator> WatchedIter<I> {
    /// A `step` of 0 is raised to 1 with a warning.
    pub(crate) fn new(
        inner: I,
        reporters: Vec<Reporter>,
        details: Details,
        step: usize,
        total: Option<usize>,
    ) -> Self {
        let step = if step == 0 {
            for reporter in reporters.iter().filter(|r| r.verbose()) {
                tracing::warn!(
                    platform = %reporter.platform(),
                    "Step must be at least 1. Setting step to 1 for {}Notifier.",
                    reporter.platform()
                );
            }
            1
        } else {
            step
        };

        Self {
            inner,
            reporters,
            details,
            step,
            total,
            progress: Progress::default(),
        }
    }

    /// Iterator that only passes items through
    pub(crate) fn passthrough(inner: I) -> Self {
        Self::new(inner, Vec::new(), Details::default(), 1, None)
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Number of items handed out so far
    pub fn count_yielded(&self) -> usize {
        self.progress.yielded
    }

    /// Run `body` with the iterator; a panic is reported for the current
    /// batch and then resumed.
    pub fn run<R>(mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        self.ensure_started();
        match panic::catch_unwind(AssertUnwindSafe(|| body(&mut self))) {
            Ok(value) => {
                self.close();
                value
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                self.fail(&message, &format!("panicked: {}", message));
                panic::resume_unwind(payload)
            }
        }
    }

    /// Run a fallible `body` with the iterator; an `Err` is reported for the
    /// current batch and returned unchanged.
    pub fn try_run<T, E>(mut self, body: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: Display + Debug,
    {
        self.ensure_started();
        match panic::catch_unwind(AssertUnwindSafe(|| body(&mut self))) {
            Ok(Ok(value)) => {
                self.close();
                Ok(value)
            }
            Ok(Err(e)) => {
                self.fail(&e.to_string(), &format!("{:?}", e));
                Err(e)
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                self.fail(&message, &format!("panicked: {}", message));
                panic::resume_unwind(payload)
            }
        }
    }

    fn ensure_started(&mut self) {
        if self.progress.started.is_some() {
            return;
        }
        self.progress.started = Some(Instant::now());
        for reporter in &self.reporters {
            reporter.info(&self.details.started(reporter.callsite_level()));
        }
    }

    fn item_started(&mut self) {
        let index = self.progress.yielded;
        self.progress.yielded += 1;
        if index % self.step != 0 {
            return;
        }

        let limit = self.total.filter(|t| *t > 0).unwrap_or(usize::MAX);
        let batch = Batch {
            first: index + 1,
            last: (index + self.step).min(limit),
            started: Instant::now(),
        };
        self.progress.batch = Some(batch);
        for reporter in &self.reporters {
            let body = format!(
                "Processing {} from{}...{}",
                self.range(&batch),
                self.details.describe(),
                self.details
                    .origin_block(Level::Info, reporter.callsite_level())
            );
            reporter.info(&body);
        }
    }

    fn item_done(&self) {
        if self.progress.yielded % self.step == 0 {
            self.batch_done();
        }
    }

    fn batch_done(&self) {
        let Some(batch) = self.progress.batch else {
            return;
        };
        for reporter in &self.reporters {
            let body = format!(
                "Processed {} from{}.{}\n{}",
                self.range(&batch),
                self.details.describe(),
                self.details
                    .origin_block(Level::Info, reporter.callsite_level()),
                self.timing(&batch)
            );
            reporter.info(&body);
        }
    }

    /// End the iteration after the scoped body returned early.
    fn close(&mut self) {
        if self.progress.finished {
            return;
        }
        if std::mem::take(&mut self.progress.in_item) {
            self.item_done();
        }
        self.finish();
    }

    fn finish(&mut self) {
        if self.progress.yielded % self.step != 0 {
            if let Some(batch) = self.progress.batch.as_mut() {
                batch.last = self.progress.yielded;
            }
            self.batch_done();
        }

        let total = self.elapsed_total();
        for reporter in &self.reporters {
            let body = format!(
                "End watching{}.{}\nTotal execution time: {}.",
                self.details.describe(),
                self.details
                    .origin_block(Level::Info, reporter.callsite_level()),
                total
            );
            reporter.ended(&body);
        }
        self.progress.finished = true;
    }

    fn fail(&mut self, error: &str, traceback: &str) {
        if self.progress.finished {
            return;
        }
        self.progress.finished = true;

        let batch = self.progress.batch.filter(|_| self.progress.in_item);
        for reporter in &self.reporters {
            let origin = self
                .details
                .origin_block(Level::Error, reporter.callsite_level());
            let body = match &batch {
                Some(batch) => format!(
                    "Error while processing {} from{}: {}{}\n{}",
                    self.range(batch),
                    self.details.describe(),
                    error,
                    origin,
                    self.timing(batch)
                ),
                None => format!(
                    "Error while watching{}: {}{}\nTotal execution time: {}.",
                    self.details.describe(),
                    error,
                    origin,
                    self.elapsed_total()
                ),
            };
            reporter.failed(&body, traceback);
        }
    }

    /// `item 3 of 10` / `items 1–5 of 10`
    fn range(&self, batch: &Batch) -> String {
        let mut text = if self.step == 1 {
            format!("item {}", batch.first)
        } else {
            format!("items {}–{}", batch.first, batch.last)
        };
        if let Some(total) = self.total {
            text.push_str(&format!(" of {}", total));
        }
        text
    }

    fn timing(&self, batch: &Batch) -> String {
        format!(
            "Execution time for {}: {}.\nTotal execution time: {}.",
            self.range(batch),
            format_duration(batch.started.elapsed()),
            self.elapsed_total()
        )
    }

    fn elapsed_total(&self) -> String {
        format_duration(
            self.progress
                .started
                .map(|s| s.elapsed())
                .unwrap_or_default(),
        )
    }
}

impl<I: Iterator> Iterator for WatchedIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.progress.finished {
            return None;
        }
        self.ensure_started();
        if std::mem::take(&mut self.progress.in_item) {
            self.item_done();
        }

        match self.inner.next() {
            Some(item) => {
                self.item_started();
                self.progress.in_item = true;
                Some(item)
            }
            None => {
                self.finish();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.progress.finished {
            (0, Some(0))
        } else {
            self.inner.size_hint()
        }
    }
}
