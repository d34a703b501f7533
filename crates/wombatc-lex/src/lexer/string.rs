//! String and character literal lexing.

use wombatc_util::Location;

use super::core::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer<'_> {
    /// Lexes a string literal. The lexeme keeps its surrounding quotes and
    /// escape sequences raw; later stages interpret them.
    ///
    /// Valid escapes are `\\`, `\n`, and `\"`. Anything else, or a line or
    /// file ending before the closing quote, is a critical diagnostic.
    pub(crate) fn lex_string(&mut self, loc: Location) -> Token {
        let mut lexeme = String::from('"');
        self.cursor.advance();

        loop {
            match self.cursor.current() {
                None | Some('\n') => {
                    self.report_critical(
                        "unterminated string literal",
                        "close the literal with `\"`",
                        "string starts here but is not terminated",
                        loc,
                    );
                    return Token::new(TokenKind::LiteralString, lexeme, loc);
                }
                Some('\\') => {
                    lexeme.push('\\');
                    self.cursor.advance();

                    match self.cursor.current() {
                        Some(escaped @ ('n' | '\\' | '"')) => {
                            lexeme.push(escaped);
                            self.cursor.advance();
                        }
                        Some(other) => {
                            self.report_critical(
                                format!("unexpected escape sequence: '\\{other}'"),
                                "",
                                "invalid char",
                                self.cursor.location(),
                            );
                            lexeme.push(other);
                            self.cursor.advance();
                        }
                        None => {}
                    }
                }
                Some('"') => {
                    lexeme.push('"');
                    self.cursor.advance();
                    return Token::new(TokenKind::LiteralString, lexeme, loc);
                }
                Some(c) => {
                    lexeme.push(c);
                    self.cursor.advance();
                }
            }
        }
    }

    /// Lexes a char literal: exactly one character (or nothing) between
    /// single quotes. The lexeme is the bare character, without quotes.
    pub(crate) fn lex_char(&mut self, loc: Location) -> Token {
        self.cursor.advance();

        if self.cursor.current() == Some('\'') {
            // Empty pair.
            self.cursor.advance();
            return Token::new(TokenKind::LiteralChar, "", loc);
        }

        let ch = match self.cursor.current() {
            Some(c) if c != '\n' => {
                self.cursor.advance();
                c.to_string()
            }
            _ => String::new(),
        };

        if self.cursor.current() == Some('\'') {
            self.cursor.advance();
        } else {
            self.report_critical(
                "unterminated char literal",
                "close the literal with `'`",
                "",
                loc,
            );
        }
        Token::new(TokenKind::LiteralChar, ch, loc)
    }
}
