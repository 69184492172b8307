//! Named function slots that watches can be registered on.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A function stored in a [`FunctionTable`]
pub type WatchedFn<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// Table of named functions sharing one signature.
///
/// Callers dispatch through the table, so replacing an entry changes what
/// every later call runs. Functions with several arguments take a tuple.
///
/// # Example
/// ```ignore
/// let mut jobs = FunctionTable::new("jobs");
/// jobs.insert("rebuild_index", |force: bool| rebuild_index(force));
/// notifier.register(&mut jobs, "rebuild_index", &WatchOptions::new());
/// jobs.call("rebuild_index", true);
/// ```
pub struct FunctionTable<A, R> {
    name: String,
    entries: BTreeMap<String, WatchedFn<A, R>>,
}

impl<A, R> FunctionTable<A, R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Table name used in log lines
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store `f` under `name`, replacing any previous entry.
    pub fn insert<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(f));
        self
    }

    pub fn get(&self, name: &str) -> Option<WatchedFn<A, R>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Call the function stored under `name`; `None` if there is none.
    pub fn call(&self, name: &str, args: A) -> Option<R> {
        self.entries.get(name).map(|f| f(args))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A, R> fmt::Debug for FunctionTable<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("name", &self.name)
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::config::{NotifierSettings, WatchOptions};
    use crate::models::Platform;
    use crate::services::notifications::recording_provider::recording_notifier;

    /// Log sink for a scoped subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn with_captured_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        logs.text()
    }

    fn table() -> FunctionTable<(u32, u32), u32> {
        let mut table: FunctionTable<(u32, u32), u32> = FunctionTable::new("math");
        table.insert("add", |(a, b)| a + b);
        table
    }

    #[test]
    fn test_insert_and_call() {
        let table = table();
        assert!(table.contains("add"));
        assert_eq!(table.call("add", (2, 3)), Some(5));
        assert_eq!(table.call("sub", (2, 3)), None);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["add"]);
    }

    #[test]
    fn test_register_wraps_entry() {
        let (notifier, provider) =
            recording_notifier(Platform::Slack, NotifierSettings::new().channel("ops"));
        let mut table = table();

        notifier.register(&mut table, "add", &WatchOptions::new());

        assert_eq!(table.call("add", (1, 1)), Some(2));
        assert_eq!(table.call("add", (2, 2)), Some(4));
        let texts = provider.texts();
        assert_eq!(texts.len(), 4);
        assert_eq!(texts[0], "Start watching [function: add]...");
    }

    #[test]
    fn test_register_shows_params() {
        let (notifier, provider) =
            recording_notifier(Platform::Slack, NotifierSettings::new().channel("ops"));
        let mut table = table();

        notifier.register(&mut table, "add", &WatchOptions::new().params(["lhs", "rhs"]));
        table.call("add", (2, 5));

        let texts = provider.texts();
        assert_eq!(texts[0], "Start watching [function: add(lhs=2, rhs=5)]...");
        assert!(texts[1].starts_with("End watching [function: add(lhs=2, rhs=5)]."));
    }

    #[test]
    fn test_register_missing_entry_is_noop() {
        let (notifier, provider) =
            recording_notifier(Platform::Slack, NotifierSettings::new().channel("ops"));
        let mut table = table();

        notifier.register(&mut table, "missing", &WatchOptions::new());

        assert_eq!(table.len(), 1);
        assert!(!table.contains("missing"));
        assert_eq!(table.call("add", (1, 1)), Some(2));
        assert!(provider.sent().is_empty());
    }

    #[test]
    fn test_missing_entry_warning_follows_verbosity() {
        let (notifier, _) =
            recording_notifier(Platform::Slack, NotifierSettings::new().channel("ops"));
        let mut table = table();

        let verbose = with_captured_logs(|| {
            notifier.register(&mut table, "missing", &WatchOptions::new());
        });
        let quiet = with_captured_logs(|| {
            notifier.register(&mut table, "missing", &WatchOptions::new().verbose(false));
        });

        assert!(verbose.contains("Cannot register on `math.missing`"));
        assert!(!quiet.contains("Cannot register"));
    }

    #[test]
    fn test_register_twice_double_wraps() {
        let (notifier, provider) =
            recording_notifier(Platform::Slack, NotifierSettings::new().channel("ops"));
        let mut table = table();

        notifier.register(&mut table, "add", &WatchOptions::new());
        notifier.register(&mut table, "add", &WatchOptions::new());
        table.call("add", (1, 1));

        assert_eq!(provider.sent().len(), 4);
    }
}
