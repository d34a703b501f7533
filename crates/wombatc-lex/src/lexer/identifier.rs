//! Identifier, keyword, and readable lexing.

use wombatc_util::Location;

use super::core::Lexer;
use crate::token::{Keyword, Token, TokenKind};

impl Lexer<'_> {
    /// Lexes a word starting with an alphabetic character or `_`.
    ///
    /// Classification happens after consumption: a trailing `!` tags the
    /// word as a readable; `true`/`false` become boolean literals; known
    /// keywords become keyword tokens; everything else is an identifier.
    pub(crate) fn lex_word(&mut self, loc: Location) -> Token {
        let mut lexeme = String::new();

        while let Some(c) = self.cursor.current() {
            if c.is_ascii_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        if self.cursor.current() == Some('!') {
            self.cursor.advance();
            lexeme.push('!');
            return Token::new(TokenKind::Readable, lexeme, loc);
        }

        let kind = if lexeme == "true" || lexeme == "false" {
            TokenKind::LiteralBoolean
        } else if Keyword::from_lexeme(&lexeme).is_some() {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, lexeme, loc)
    }
}
