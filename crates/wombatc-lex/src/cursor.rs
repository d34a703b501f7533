//! Character cursor for traversing source code.
//!
//! The cursor walks a vector of source lines. Columns index characters, not
//! bytes, and both coordinates are 0-based. Advancing past the end of a
//! physical line synthesizes a `'\n'`, then moves to `(line + 1, column 0)`;
//! the lines themselves are stored without terminators so diagnostics can
//! cite them verbatim.

use wombatc_util::{Location, SourceFile};

/// A cursor over the lines of one source file.
///
/// # Example
///
/// ```
/// use wombatc_lex::cursor::Cursor;
/// use wombatc_util::SourceFile;
///
/// let file = SourceFile::new("demo.wo", vec!["let x".into()]);
/// let mut cursor = Cursor::new(&file);
///
/// assert_eq!(cursor.current(), Some('l'));
/// cursor.advance();
/// assert_eq!(cursor.current(), Some('e'));
/// ```
pub struct Cursor {
    /// Source lines, pre-split into characters.
    lines: Vec<Vec<char>>,
    /// Current line (0-based).
    line: usize,
    /// Current column (0-based).
    col: usize,
}

impl Cursor {
    /// Creates a cursor over the given source file.
    pub fn new(file: &SourceFile) -> Self {
        Self {
            lines: file.lines.iter().map(|l| l.chars().collect()).collect(),
            line: 0,
            col: 0,
        }
    }

    /// The character under the cursor.
    ///
    /// Returns `Some('\n')` at the end of a physical line and `None` once
    /// every line is exhausted.
    pub fn current(&self) -> Option<char> {
        let line = self.lines.get(self.line)?;
        match line.get(self.col) {
            Some(c) => Some(*c),
            None => Some('\n'),
        }
    }

    /// The character `step` positions ahead of the cursor, crossing line
    /// boundaries the same way [`advance`] does.
    ///
    /// [`advance`]: Cursor::advance
    pub fn peek_next(&self, step: usize) -> Option<char> {
        let (mut line, mut col) = (self.line, self.col);
        for _ in 0..step {
            match self.lines.get(line) {
                None => return None,
                Some(text) => {
                    if col < text.len() {
                        col += 1;
                    } else {
                        line += 1;
                        col = 0;
                    }
                }
            }
        }
        let text = self.lines.get(line)?;
        match text.get(col) {
            Some(c) => Some(*c),
            None => Some('\n'),
        }
    }

    /// Moves one character forward.
    pub fn advance(&mut self) {
        let Some(text) = self.lines.get(self.line) else {
            return;
        };
        if self.col < text.len() {
            self.col += 1;
        } else {
            self.line += 1;
            self.col = 0;
        }
    }

    /// Moves `n` columns backward within the current line.
    ///
    /// Rewinding never crosses a line boundary; it exists for the one-token
    /// lookbehind the number lexer needs.
    pub fn rewind(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    /// Skips whitespace, synthesized newlines included.
    pub fn skip_whitespace(&mut self) {
        while let Some(c) = self.current() {
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    /// True once every line has been consumed.
    pub fn at_eof(&self) -> bool {
        self.line >= self.lines.len()
    }

    /// Current cursor coordinates (0-based).
    pub fn location(&self) -> Location {
        Location::new(self.line, self.col)
    }
}
