//! wombatc-lex - Lexical Analyzer
//!
//! Transforms Wombat source text into a [`TokenStream`]. The lexer is the
//! only stage that touches the file system: it reads the input fully into
//! memory as lines (so diagnostics can cite source), then drives a character
//! cursor over them.
//!
//! Malformed literals produce critical diagnostics with a labelled region
//! pointing at the offending position; lexing resumes after each report so a
//! single pass can surface several problems.
//!
//! ```
//! use wombatc_lex::lex_text;
//! use wombatc_lex::token::TokenKind;
//! use wombatc_util::Handler;
//!
//! let handler = Handler::new();
//! let (stream, _file) = lex_text("demo.wo", "let x: int = 42;", &handler);
//!
//! let kinds: Vec<_> = stream.iter().map(|t| t.kind).collect();
//! assert_eq!(kinds.first(), Some(&TokenKind::Keyword));
//! assert_eq!(kinds.last(), Some(&TokenKind::Eof));
//! ```

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{AssignOp, BinOpKind, Keyword, LiteralKind, Token, TokenKind, TokenStream, UnOpKind};

use std::path::Path;
use wombatc_util::{Diagnostic, Handler, SourceFile};

/// Lexes a file from disk.
///
/// A read failure produces a single short critical diagnostic and an empty
/// stream; the pipeline never starts in that case.
pub fn lex_file(path: &Path, handler: &Handler) -> (TokenStream, SourceFile) {
    match SourceFile::read(path) {
        Ok(file) => {
            let stream = Lexer::new(&file, handler).lex_source();
            (stream, file)
        }
        Err(err) => {
            handler.emit(
                Diagnostic::critical(format!("could not open: {}", path.display()))
                    .with_hint(err.to_string()),
            );
            (TokenStream::new(), SourceFile::new(path, Vec::new()))
        }
    }
}

/// Lexes in-memory text, using `name` as the cited file name.
///
/// Used by tests and by the builtin-signature loader.
pub fn lex_text(name: &str, text: &str, handler: &Handler) -> (TokenStream, SourceFile) {
    let file = SourceFile::new(name, text.lines().map(str::to_owned).collect());
    let stream = Lexer::new(&file, handler).lex_source();
    (stream, file)
}
