//! Numeric literal lexing.

use wombatc_util::Location;

use super::core::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer<'_> {
    /// Lexes an integer or float literal.
    ///
    /// One or more digits, optionally followed by `.` and one or more
    /// digits. A dot with no digits after it is rewound and left for the
    /// next token.
    pub(crate) fn lex_number(&mut self, loc: Location) -> Token {
        let mut lexeme = String::new();

        while let Some(c) = self.cursor.current() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        if self.cursor.current() == Some('.') {
            // Eat the radix point, then look for the fraction.
            self.cursor.advance();
            let mut after_radix = String::new();
            while let Some(c) = self.cursor.current() {
                if c.is_ascii_digit() {
                    after_radix.push(c);
                    self.cursor.advance();
                } else {
                    break;
                }
            }

            if !after_radix.is_empty() {
                lexeme.push('.');
                lexeme.push_str(&after_radix);
                return Token::new(TokenKind::LiteralFloat, lexeme, loc);
            }
            self.cursor.rewind(1);
        }

        Token::new(TokenKind::LiteralNum, lexeme, loc)
    }
}
