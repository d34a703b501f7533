//! Core lexer implementation: dispatch and diagnostics plumbing.

use wombatc_util::{Diagnostic, Handler, Location, SourceFile};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind, TokenStream};

/// Lexer for the Wombat language.
///
/// Dispatches on the current character after skipping whitespace and
/// comments. Every produced token carries the location of its first
/// character.
pub struct Lexer<'a> {
    /// Character cursor over the source lines.
    pub(crate) cursor: Cursor,

    /// Source file, kept for diagnostic regions.
    file: &'a SourceFile,

    /// Sink for lexical diagnostics.
    handler: &'a Handler,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a SourceFile, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(file),
            file,
            handler,
        }
    }

    /// Lexes the whole source into a token stream terminated by EOF.
    pub fn lex_source(mut self) -> TokenStream {
        let mut stream = TokenStream::new();
        loop {
            let token = self.next_token();
            let at_end = token.kind == TokenKind::Eof;
            stream.feed(token);
            if at_end {
                break;
            }
        }
        stream
    }

    /// Produces the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let loc = self.cursor.location();
        match self.cursor.current() {
            None => Token::eof(loc),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.lex_word(loc),
            Some(c) if c.is_ascii_digit() => self.lex_number(loc),
            Some('"') => self.lex_string(loc),
            Some('\'') => self.lex_char(loc),
            Some(c) if is_symbol_start(c) => self.lex_symbol(loc, c),
            Some(c) => {
                self.cursor.advance();
                Token::new(TokenKind::Foreign, c.to_string(), loc)
            }
        }
    }

    /// Skips whitespace and `#` line comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.current() == Some('#') {
                self.skip_line_comment();
            } else {
                break;
            }
        }
    }

    /// Reports a critical diagnostic with a caret at `loc`.
    pub(crate) fn report_critical(
        &self,
        message: impl Into<String>,
        hint: impl Into<String>,
        label: impl Into<String>,
        loc: Location,
    ) {
        self.handler.emit(
            Diagnostic::critical(message)
                .with_hint(hint)
                .with_region(label, self.file.region_at(loc)),
        );
    }
}

/// Characters that may start a punctuator or operator token.
pub(crate) fn is_symbol_start(c: char) -> bool {
    matches!(
        c,
        '(' | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | ':'
            | ';'
            | ','
            | '.'
            | '~'
            | '+'
            | '-'
            | '*'
            | '/'
            | '%'
            | '|'
            | '^'
            | '&'
            | '<'
            | '>'
            | '='
            | '!'
    )
}
