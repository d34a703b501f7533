//! Diagnostic rendering.
//!
//! Two textual forms are supported:
//!
//! - *Pretty*: header, `at file:line:col` anchor, the cited source line with
//!   a bracketed line number, a caret pointing at the column, and a hint.
//! - *Short*: header and hint only.
//!
//! Layout:
//!
//! ```text
//! critical: unterminated string literal
//! at demo.wo:3:9
//!  |
//! [3] let s: [5]char = "name;
//!  |                   ^ string starts here but is not terminated
//!  ~ close the literal with `"`
//! ```

use super::{Diagnostic, Level};
use crate::span::Region;
use std::fmt::Write as _;
use std::io::IsTerminal;

const RED_BOLD: &str = "\x1b[1;31m";
const GREEN_BOLD: &str = "\x1b[1;32m";
const YELLOW_BOLD: &str = "\x1b[1;33m";
const CYAN_BOLD: &str = "\x1b[1;36m";
const RESET: &str = "\x1b[0m";

/// Controls whether SGR escapes are emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// Color when standard error is a terminal.
    Auto,
    Always,
    Never,
}

/// Renders [`Diagnostic`]s to text.
pub struct Renderer {
    colored: bool,
}

impl Renderer {
    pub fn new(mode: ColorMode) -> Self {
        let colored = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stderr().is_terminal(),
        };
        Self { colored }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.colored {
            format!("{code}{text}{RESET}")
        } else {
            text.to_owned()
        }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let color = match diag.level {
            Level::Critical => RED_BOLD,
            Level::Warning => YELLOW_BOLD,
        };
        format!(
            "{}: {}",
            self.paint(color, &diag.level.to_string()),
            diag.message
        )
    }

    fn hint_line(&self, diag: &Diagnostic) -> String {
        format!("{} {}", self.paint(GREEN_BOLD, "~"), diag.hint)
    }

    fn marker(&self, region: &Region, label_text: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "at {}:{}:{}",
            region.file.display(),
            region.location.line + 1,
            region.location.col + 1
        );

        let raw = region.source.first().map(String::as_str).unwrap_or("");
        let (trimmed, offset) = left_trim(raw);

        let _ = writeln!(out, " |");
        let _ = writeln!(
            out,
            "[{}] {}",
            self.paint(CYAN_BOLD, &(region.location.line + 1).to_string()),
            trimmed
        );

        let caret = (region.location.col + 1).saturating_sub(offset);
        let _ = writeln!(out, " |{}^ {}", " ".repeat(caret), label_text);

        for extra in region.source.iter().skip(1) {
            let _ = writeln!(out, " |{extra}");
        }
        out
    }

    /// Render the rich form: header, anchors, source excerpts, carets, hint.
    pub fn render_pretty(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.header(diag));

        for label in &diag.labels {
            for region in &label.regions {
                out.push_str(&self.marker(region, &label.text));
            }
        }

        let _ = writeln!(out, "{}", self.hint_line(diag));
        out
    }

    /// Render the short form: header and hint only.
    pub fn render_short(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.header(diag));
        let _ = writeln!(out, "{}", self.hint_line(diag));
        out
    }

    /// Picks the pretty form when the diagnostic carries labels.
    pub fn render(&self, diag: &Diagnostic) -> String {
        if diag.labels.is_empty() {
            self.render_short(diag)
        } else {
            self.render_pretty(diag)
        }
    }
}

/// Strips leading whitespace, returning the trimmed line and the number of
/// characters removed.
fn left_trim(line: &str) -> (&str, usize) {
    let trimmed = line.trim_start();
    (trimmed, line.len() - trimmed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Location, Region};

    fn plain() -> Renderer {
        Renderer::new(ColorMode::Never)
    }

    #[test]
    fn test_left_trim() {
        assert_eq!(left_trim("    let x"), ("let x", 4));
        assert_eq!(left_trim("let x"), ("let x", 0));
        assert_eq!(left_trim(""), ("", 0));
    }

    #[test]
    fn test_short_form() {
        let diag = Diagnostic::critical("could not open: missing.wo").with_hint("no such file");
        let text = plain().render_short(&diag);
        assert_eq!(text, "critical: could not open: missing.wo\n~ no such file\n");
    }

    #[test]
    fn test_pretty_form_anchor_is_one_based() {
        let region = Region::new("demo.wo", Location::new(2, 8), vec!["let s: [5]char".into()]);
        let diag = Diagnostic::critical("bad type")
            .with_hint("fix it")
            .with_region("here", region);

        let text = plain().render_pretty(&diag);
        assert!(text.contains("at demo.wo:3:9"), "got: {text}");
        assert!(text.contains("[3] let s: [5]char"));
        assert!(text.ends_with("~ fix it\n"));
    }

    #[test]
    fn test_pretty_form_caret_accounts_for_trim() {
        let region = Region::new("demo.wo", Location::new(0, 6), vec!["    mut x: int".into()]);
        let diag = Diagnostic::critical("oops").with_region("label", region);

        let text = plain().render_pretty(&diag);
        // col 6, +1, minus the 4 trimmed spaces = 3 pad characters.
        assert!(text.contains(" |   ^ label"), "got: {text}");
    }

    #[test]
    fn test_render_picks_form_by_labels() {
        let short = Diagnostic::warning("w");
        assert!(!plain().render(&short).contains("at "));

        let region = Region::new("a.wo", Location::SINGULARITY, vec!["x".into()]);
        let pretty = Diagnostic::warning("w").with_region("t", region);
        assert!(plain().render(&pretty).contains("at a.wo:1:1"));
    }

    #[test]
    fn test_colored_header_uses_sgr() {
        let renderer = Renderer::new(ColorMode::Always);
        let diag = Diagnostic::critical("boom");
        let text = renderer.render_short(&diag);
        assert!(text.contains("\x1b[1;31mcritical\x1b[0m"));
    }
}
