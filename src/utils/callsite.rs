//! Call-site capture and source snippet rendering.
//!
//! Locations come from `#[track_caller]`, so the file path is the one the
//! compiler saw. Snippets are read from disk relative to the working
//! directory and silently omitted when the file is not there.

use std::fmt;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};

/// Source location a watch was created at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl CallSite {
    /// Location of the caller of the enclosing `#[track_caller]` function
    #[track_caller]
    pub fn capture() -> Self {
        Self::from(Location::caller())
    }

    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Read lines `[line - before, line + after)` from the source file.
    ///
    /// Returns `None` if the file cannot be read or the line is out of range.
    pub fn read_lines(&self, before: usize, after: usize) -> Option<Vec<(usize, String)>> {
        let source = fs::read_to_string(&self.file).ok()?;
        let lines: Vec<&str> = source.lines().collect();
        let line = self.line as usize;
        if line == 0 || line > lines.len() {
            return None;
        }

        let first = line.saturating_sub(before).max(1);
        let last = (line + after).saturating_sub(1).min(lines.len()).max(line);
        Some(
            (first..=last)
                .map(|number| (number, lines[number - 1].trim_end().to_string()))
                .collect(),
        )
    }

    /// Render a numbered snippet around the call line, marking it with `❯`.
    pub fn snippet(&self, before: usize, after: usize) -> Option<String> {
        let lines = self.read_lines(before, after)?;
        let width = lines.last().map(|(n, _)| n.to_string().len()).unwrap_or(1);
        let rendered: Vec<String> = lines
            .iter()
            .map(|(number, text)| {
                let marker = if *number == self.line as usize { '❯' } else { ' ' };
                format!("{} {:>width$} │ {}", marker, number, text, width = width)
            })
            .collect();
        Some(rendered.join("\n"))
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}
