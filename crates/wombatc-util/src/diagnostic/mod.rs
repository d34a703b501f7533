//! Diagnostic module - Error and warning reporting infrastructure.
//!
//! Diagnostics are plain data: a severity, a message, a hint, and labelled
//! source regions. Rendering (including all ANSI coloring) lives behind the
//! [`Renderer`] so that tests can assert on structure rather than bytes.
//!
//! # Examples
//!
//! ```
//! use wombatc_util::diagnostic::{Diagnostic, Handler};
//!
//! let handler = Handler::new();
//! handler.emit(Diagnostic::critical("unterminated string literal"));
//!
//! assert!(handler.has_criticals());
//! assert_eq!(handler.critical_count(), 1);
//! ```

mod render;

pub use render::{ColorMode, Renderer};

use crate::span::Region;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// A fatal problem; the pipeline halts after the owning stage.
    Critical,
    /// A non-fatal observation.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Critical => write!(f, "critical"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A label ties explanatory text to one or more source regions, so the
/// renderer can point a caret at the exact spot an error emerged from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// Text shown next to the caret.
    pub text: String,
    /// Regions the label points at.
    pub regions: Vec<Region>,
}

impl Label {
    pub fn new(text: impl Into<String>, regions: Vec<Region>) -> Self {
        Self {
            text: text.into(),
            regions,
        }
    }
}

/// A diagnostic message with severity, hint, and labelled regions.
///
/// # Examples
///
/// ```
/// use wombatc_util::diagnostic::{Diagnostic, Level};
///
/// let diag = Diagnostic::critical("mismatched types")
///     .with_hint("expected 'bool', got 'int'");
/// assert_eq!(diag.level, Level::Critical);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the diagnostic.
    pub level: Level,
    /// Primary message.
    pub message: String,
    /// Trailing hint, rendered after a `~`. May be empty.
    pub hint: String,
    /// Labelled regions; empty for "short" diagnostics.
    pub labels: Vec<Label>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            hint: String::new(),
            labels: Vec::new(),
        }
    }

    /// Create a critical diagnostic.
    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Level::Critical, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    /// Attach a hint string.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    /// Attach a label.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Convenience for the common one-region label.
    pub fn with_region(self, text: impl Into<String>, region: Region) -> Self {
        self.with_label(Label::new(text, vec![region]))
    }
}

/// Handler for collecting diagnostics.
///
/// Diagnostics are buffered; the driver decides when to flush them to the
/// user. Interior mutability keeps the emitting stages free of `&mut`
/// plumbing.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// Buffer a diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Check whether any critical diagnostics have been reported.
    pub fn has_criticals(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Critical)
    }

    pub fn critical_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Critical)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// Clone out the buffered diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Drain the buffer, handing ownership of the diagnostics to the caller.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Location, Region};

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Critical), "critical");
        assert_eq!(format!("{}", Level::Warning), "warning");
    }

    #[test]
    fn test_diagnostic_builders() {
        let diag = Diagnostic::critical("boom").with_hint("try harder");
        assert_eq!(diag.level, Level::Critical);
        assert_eq!(diag.message, "boom");
        assert_eq!(diag.hint, "try harder");
        assert!(diag.labels.is_empty());
    }

    #[test]
    fn test_diagnostic_with_region() {
        let region = Region::new("a.wo", Location::new(0, 3), vec!["let x".into()]);
        let diag = Diagnostic::critical("bad token").with_region("here", region.clone());
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.labels[0].text, "here");
        assert_eq!(diag.labels[0].regions, vec![region]);
    }

    #[test]
    fn test_handler_counts() {
        let handler = Handler::new();
        assert!(!handler.has_criticals());

        handler.emit(Diagnostic::critical("one"));
        handler.emit(Diagnostic::warning("two"));

        assert!(handler.has_criticals());
        assert_eq!(handler.critical_count(), 1);
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_handler_take_drains() {
        let handler = Handler::new();
        handler.emit(Diagnostic::warning("w"));
        let taken = handler.take();
        assert_eq!(taken.len(), 1);
        assert!(handler.diagnostics().is_empty());
    }

    #[test]
    fn test_handler_clear() {
        let handler = Handler::new();
        handler.emit(Diagnostic::critical("x"));
        handler.clear();
        assert!(!handler.has_criticals());
    }
}
