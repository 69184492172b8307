//! Text shared by every watch message: target description and call site.

use std::time::Duration;

use super::args::render_params;
use crate::config::WatchOptions;
use crate::models::Level;
use crate::utils::{CallSite, format_duration};

/// Where a watch was created and how much source to show around it.
#[derive(Debug, Clone)]
pub(crate) struct Origin {
    site: CallSite,
    before: usize,
    after: usize,
    /// The watch wraps a function defined through it
    definition: bool,
}

impl Origin {
    pub(crate) fn new(site: CallSite, before: usize, after: usize) -> Self {
        Self {
            site,
            before,
            after,
            definition: false,
        }
    }

    fn render(&self) -> String {
        let label = if self.definition { "defined at" } else { "at" };
        let mut block = format!("\n ▷ {}: {}", label, self.site);
        if let Some(snippet) = self.site.snippet(self.before, self.after) {
            block.push('\n');
            block.push_str(&snippet);
        }
        block
    }
}

/// Description of what is being watched.
#[derive(Debug, Clone, Default)]
pub(crate) struct Details {
    label: Option<String>,
    function: Option<String>,
    subject: Option<String>,
    params: Vec<String>,
    args: Option<String>,
    origin: Option<Origin>,
}

impl Details {
    pub(crate) fn from_options(options: &WatchOptions, site: CallSite) -> Self {
        Self {
            label: options.label.clone(),
            params: options.params.clone(),
            origin: Some(Origin::new(
                site,
                options.callsite_context_before,
                options.callsite_context_after,
            )),
            ..Self::default()
        }
    }

    /// Iterated value, rendered as ` <subject>`
    pub(crate) fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub(crate) fn function(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }

    pub(crate) fn has_function(&self) -> bool {
        self.function.is_some()
    }

    /// The call site now marks where a function was wrapped
    pub(crate) fn definition(mut self) -> Self {
        if let Some(origin) = self.origin.as_mut() {
            origin.definition = true;
        }
        self
    }

    pub(crate) fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    /// Copy carrying the argument values of one call
    pub(crate) fn with_args(&self, values: &[String]) -> Self {
        Self {
            args: render_params(&self.params, values),
            ..self.clone()
        }
    }

    /// ` <subject> [label, function: name]` with absent parts left out.
    pub(crate) fn describe(&self) -> String {
        let mut text = String::new();
        if let Some(subject) = &self.subject {
            text.push_str(&format!(" <{}>", subject));
        }

        let mut parts = Vec::new();
        if let Some(label) = &self.label {
            parts.push(label.clone());
        }
        match (&self.function, &self.args) {
            (Some(function), Some(args)) => parts.push(format!("function: {}({})", function, args)),
            (Some(function), None) => parts.push(format!("function: {}", function)),
            (None, Some(args)) => parts.push(format!("args: {}", args)),
            (None, None) => {}
        }
        if !parts.is_empty() {
            text.push_str(&format!(" [{}]", parts.join(", ")));
        }
        text
    }

    /// Call-site block, present only when `level` reaches `callsite_level`.
    pub(crate) fn origin_block(&self, level: Level, callsite_level: Level) -> String {
        match &self.origin {
            Some(origin) if level.reaches(callsite_level) => origin.render(),
            _ => String::new(),
        }
    }

    pub(crate) fn started(&self, callsite_level: Level) -> String {
        format!(
            "Start watching{}...{}",
            self.describe(),
            self.origin_block(Level::Info, callsite_level)
        )
    }

    pub(crate) fn ended(&self, callsite_level: Level, elapsed: Duration) -> String {
        format!(
            "End watching{}.{}\nExecution time: {}.",
            self.describe(),
            self.origin_block(Level::Info, callsite_level),
            format_duration(elapsed)
        )
    }

    pub(crate) fn failed(&self, callsite_level: Level, error: &str, elapsed: Duration) -> String {
        format!(
            "Error while watching{}: {}{}\nExecution time: {}.",
            self.describe(),
            error,
            self.origin_block(Level::Error, callsite_level),
            format_duration(elapsed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> Details {
        Details::from_options(
            &WatchOptions::new().label("train"),
            CallSite::new("does/not/exist.rs", 12, 5),
        )
    }

    #[test]
    fn test_describe_parts() {
        assert_eq!(Details::default().describe(), "");
        assert_eq!(details().describe(), " [train]");
        assert_eq!(
            details().function("fit").describe(),
            " [train, function: fit]"
        );
        assert_eq!(
            Details::default().subject("Range<i32>").describe(),
            " <Range<i32>>"
        );
    }

    #[test]
    fn test_describe_call_args() {
        let details = Details::from_options(
            &WatchOptions::new().params(["epochs", "_", "lr"]),
            CallSite::new("does/not/exist.rs", 3, 1),
        )
        .function("train");
        assert!(details.has_params());

        let values = vec!["3".to_string(), "\"adam\"".to_string(), "0.1".to_string()];
        assert_eq!(
            details.with_args(&values).describe(),
            " [function: train(epochs=3, lr=0.1)]"
        );
        assert_eq!(details.describe(), " [function: train]");
    }

    #[test]
    fn test_definition_origin() {
        let details = details().definition();
        assert_eq!(
            details.origin_block(Level::Error, Level::Error),
            "\n ▷ defined at: does/not/exist.rs:12"
        );
    }

    #[test]
    fn test_origin_follows_callsite_level() {
        let details = details();
        assert_eq!(details.origin_block(Level::Info, Level::Error), "");
        assert_eq!(
            details.origin_block(Level::Error, Level::Error),
            "\n ▷ at: does/not/exist.rs:12"
        );
        assert_eq!(
            details.origin_block(Level::Info, Level::Info),
            "\n ▷ at: does/not/exist.rs:12"
        );
    }

    #[test]
    fn test_message_texts() {
        let details = details();
        assert_eq!(details.started(Level::Error), "Start watching [train]...");
        assert_eq!(
            details.ended(Level::Error, Duration::from_secs(61)),
            "End watching [train].\nExecution time: 1m 1s."
        );
        assert_eq!(
            details.failed(Level::Error, "boom", Duration::ZERO),
            "Error while watching [train]: boom\n ▷ at: does/not/exist.rs:12\nExecution time: 0s."
        );
    }
}
