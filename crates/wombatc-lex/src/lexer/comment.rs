//! Line comment skipping. No token is emitted for comments.

use super::core::Lexer;

impl Lexer<'_> {
    /// Consumes a `#` comment through the end of the line, leaving the
    /// cursor on the line terminator.
    pub(crate) fn skip_line_comment(&mut self) {
        // Eat the hash.
        self.cursor.advance();
        while let Some(c) = self.cursor.current() {
            if c == '\n' {
                break;
            }
            self.cursor.advance();
        }
    }
}
