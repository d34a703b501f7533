//! Punctuation and operator lexing.
//!
//! Two passes: characters that cannot begin a compound operator are assigned
//! directly; the rest are resolved with one (or, for `<<=`/`>>=`, two)
//! characters of lookahead.

use wombatc_util::Location;

use super::core::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer<'_> {
    pub(crate) fn lex_symbol(&mut self, loc: Location, first: char) -> Token {
        // Single-character tokens with no two-character variants.
        let single = match first {
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '[' => Some(TokenKind::OpenBracket),
            ']' => Some(TokenKind::CloseBracket),
            '{' => Some(TokenKind::OpenCurly),
            '}' => Some(TokenKind::CloseCurly),
            ':' => Some(TokenKind::Colon),
            ';' => Some(TokenKind::SemiColon),
            ',' => Some(TokenKind::Comma),
            '.' => Some(TokenKind::Dot),
            '~' => Some(TokenKind::Tilde),
            _ => None,
        };
        if let Some(kind) = single {
            self.cursor.advance();
            return Token::new(kind, first.to_string(), loc);
        }

        // Characters that may begin compound operators.
        let (kind, lexeme) = match first {
            '+' => self.with_eq_variant(TokenKind::Plus, "+", TokenKind::PlusAssign),
            '-' => match self.cursor.peek_next(1) {
                Some('=') => self.take2(TokenKind::MinusAssign, "-="),
                Some('>') => self.take2(TokenKind::ReturnArrow, "->"),
                _ => self.take1(TokenKind::Minus, "-"),
            },
            '*' => match self.cursor.peek_next(1) {
                Some('=') => self.take2(TokenKind::StarAssign, "*="),
                Some('*') => self.take2(TokenKind::DoubleStar, "**"),
                _ => self.take1(TokenKind::Star, "*"),
            },
            '/' => match self.cursor.peek_next(1) {
                Some('=') => self.take2(TokenKind::SlashAssign, "/="),
                Some('/') => self.take2(TokenKind::DoubleSlash, "//"),
                _ => self.take1(TokenKind::Slash, "/"),
            },
            '%' => self.with_eq_variant(TokenKind::Percent, "%", TokenKind::PercentAssign),
            '|' => self.with_eq_variant(TokenKind::Pipe, "|", TokenKind::PipeAssign),
            '^' => self.with_eq_variant(TokenKind::Hat, "^", TokenKind::HatAssign),
            '&' => self.with_eq_variant(TokenKind::Ampersand, "&", TokenKind::AmpersandAssign),
            '<' => match self.cursor.peek_next(1) {
                Some('=') => self.take2(TokenKind::Le, "<="),
                Some('<') => {
                    if self.cursor.peek_next(2) == Some('=') {
                        self.take3(TokenKind::ShlAssign, "<<=")
                    } else {
                        self.take2(TokenKind::ShiftLeft, "<<")
                    }
                }
                _ => self.take1(TokenKind::Lt, "<"),
            },
            '>' => match self.cursor.peek_next(1) {
                Some('=') => self.take2(TokenKind::Ge, ">="),
                Some('>') => {
                    if self.cursor.peek_next(2) == Some('=') {
                        self.take3(TokenKind::ShrAssign, ">>=")
                    } else {
                        self.take2(TokenKind::ShiftRight, ">>")
                    }
                }
                _ => self.take1(TokenKind::Gt, ">"),
            },
            '=' => self.with_eq_variant(TokenKind::Eq, "=", TokenKind::DoubleEq),
            '!' => self.with_eq_variant(TokenKind::Bang, "!", TokenKind::NotEq),
            other => {
                self.cursor.advance();
                return Token::new(TokenKind::Foreign, other.to_string(), loc);
            }
        };
        Token::new(kind, lexeme, loc)
    }

    /// `base`, or the `=`-suffixed variant when the next char is `=`.
    fn with_eq_variant(
        &mut self,
        base: TokenKind,
        base_lexeme: &str,
        with_eq: TokenKind,
    ) -> (TokenKind, String) {
        if self.cursor.peek_next(1) == Some('=') {
            self.take2(with_eq, &format!("{base_lexeme}="))
        } else {
            self.take1(base, base_lexeme)
        }
    }

    fn take1(&mut self, kind: TokenKind, lexeme: &str) -> (TokenKind, String) {
        self.cursor.advance();
        (kind, lexeme.to_owned())
    }

    fn take2(&mut self, kind: TokenKind, lexeme: &str) -> (TokenKind, String) {
        self.cursor.advance();
        self.cursor.advance();
        (kind, lexeme.to_owned())
    }

    fn take3(&mut self, kind: TokenKind, lexeme: &str) -> (TokenKind, String) {
        self.cursor.advance();
        self.cursor.advance();
        self.cursor.advance();
        (kind, lexeme.to_owned())
    }
}
