//! wombatc-par - Syntactic Analyzer
//!
//! Consumes a fully-lexed [`TokenStream`] and produces an [`Ast`].
//! Declarations and statements use plain recursive descent; expressions use
//! Pratt precedence climbing (see [`expr`]).
//!
//! Parse errors are fatal: the parser reports the first offending token and
//! stops, leaving recovery to a future edition of the language.
//!
//! [`expr`]: crate::expr

pub mod ast;
pub mod expr;
pub mod items;
pub mod pretty;
pub mod stmt;
pub mod types;

use thiserror::Error;
use wombatc_lex::{Token, TokenKind, TokenStream};
use wombatc_util::{Location, Symbol};

use ast::{Ast, FnDecl, Import};

/// A fatal parse error anchored at the offending token.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub hint: String,
    pub loc: Location,
}

impl ParseError {
    pub fn new(message: impl Into<String>, loc: Location) -> Self {
        Self {
            message: message.into(),
            hint: String::new(),
            loc,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }
}

pub type PResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over a token stream.
///
/// Holds the previous and current tokens and supports bounded lookahead via
/// [`nth_is`].
///
/// [`nth_is`]: Parser::nth_is
pub struct Parser {
    stream: TokenStream,
    pub(crate) cur: Token,
    pub(crate) prev: Token,
    /// Name of the function currently being parsed; return statements
    /// quote it.
    pub(crate) current_fn: Option<Symbol>,
}

impl Parser {
    pub fn new(mut stream: TokenStream) -> Self {
        stream.reset();
        let cur = stream
            .eat_one()
            .unwrap_or_else(|| Token::eof(Location::SINGULARITY));
        Self {
            stream,
            cur,
            prev: Token::new(TokenKind::None, "", Location::SINGULARITY),
            current_fn: None,
        }
    }

    /// Parses a whole program: top-level imports and function declarations.
    pub fn parse(mut self) -> PResult<Ast> {
        let mut ast = Ast::default();

        while !self.cur.match_kind(TokenKind::Eof) {
            if self.cur.match_keyword(wombatc_lex::Keyword::Fn) {
                ast.functions.push(self.fn_decl()?);
            } else if self.cur.match_keyword(wombatc_lex::Keyword::Import) {
                ast.imports.push(self.import_stmt()?);
            } else {
                return Err(self.error(format!(
                    "expected a function declaration but got '{}'",
                    self.describe_cur()
                )));
            }
        }
        Ok(ast)
    }

    /// Advances the cursor by one token.
    pub(crate) fn bump(&mut self) {
        let next = self
            .stream
            .eat_one()
            .unwrap_or_else(|| Token::eof(self.cur.loc));
        self.prev = std::mem::replace(&mut self.cur, next);
    }

    /// Peeks `n` tokens past the current one and applies a predicate;
    /// out-of-range lookahead is simply false.
    pub(crate) fn nth_is(&self, n: usize, pred: impl Fn(&Token) -> bool) -> bool {
        match n {
            0 => pred(&self.cur),
            _ => self.stream.peek_ahead(n - 1).is_some_and(pred),
        }
    }

    /// Consumes the current token if it has the expected kind, otherwise
    /// fails with a diagnostic naming the expectation.
    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> PResult<Token> {
        if self.cur.match_kind(kind) {
            let token = self.cur.clone();
            self.bump();
            Ok(token)
        } else {
            Err(self.error(format!(
                "expected {} {} but got '{}'",
                kind.meaning(),
                context,
                self.describe_cur()
            )))
        }
    }

    /// Consumes a statement-terminating semicolon.
    pub(crate) fn expect_semi(&mut self, context: &str) -> PResult<()> {
        self.expect(TokenKind::SemiColon, context)?;
        Ok(())
    }

    /// Builds a parse error anchored at the current token.
    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.cur.loc)
    }

    /// The current token's lexeme, or a description when it has none.
    pub(crate) fn describe_cur(&self) -> String {
        if self.cur.lexeme.is_empty() {
            self.cur.kind.meaning().to_owned()
        } else {
            self.cur.lexeme.clone()
        }
    }

    fn import_stmt(&mut self) -> PResult<Import> {
        let loc = self.cur.loc;
        self.bump(); // 'import'
        let name = self.expect(TokenKind::Identifier, "after 'import'")?;
        self.expect_semi("after import statement")?;
        Ok(Import {
            name: Symbol::intern(&name.lexeme),
            loc,
        })
    }

    fn fn_decl(&mut self) -> PResult<FnDecl> {
        items::parse_fn_decl(self)
    }
}

#[cfg(test)]
pub(crate) fn parse_source(src: &str) -> PResult<Ast> {
    let handler = wombatc_util::Handler::new();
    let (stream, _) = wombatc_lex::lex_text("test.wo", src, &handler);
    assert!(
        !handler.has_criticals(),
        "lexing failed: {:?}",
        handler.diagnostics()
    );
    Parser::new(stream).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stmt;

    #[test]
    fn test_parse_minimal_program() {
        let ast = parse_source("fn int main()\n  return 1;\nend").unwrap();
        assert_eq!(ast.functions.len(), 1);
        let main = &ast.functions[0];
        assert_eq!(main.header.name.as_str(), "main");
        assert_eq!(main.header.ret_type.to_string(), "int");
        assert!(main.header.params.is_empty());
        assert_eq!(main.body.stmts.len(), 1);
    }

    #[test]
    fn test_parse_import() {
        let ast = parse_source("import io;\nfn free main()\n  quit(0);\nend").unwrap();
        assert_eq!(ast.imports.len(), 1);
        assert_eq!(ast.imports[0].name.as_str(), "io");
    }

    #[test]
    fn test_empty_function_body_is_rejected() {
        let err = parse_source("fn free main()\nend").unwrap_err();
        assert!(err.message.contains("without a body"), "{}", err.message);
    }

    #[test]
    fn test_top_level_statement_is_rejected() {
        let err = parse_source("let x: int = 1;").unwrap_err();
        assert!(err.message.contains("expected a function declaration"));
    }

    #[test]
    fn test_unclosed_function_is_rejected() {
        let err = parse_source("fn free main()\n  quit(0);").unwrap_err();
        assert!(
            err.message.contains("'}' or 'end'"),
            "unexpected message: {}",
            err.message
        );
    }

    #[test]
    fn test_return_carries_enclosing_fn_name() {
        let ast = parse_source("fn int foo()\n  return 2;\nend").unwrap();
        match &ast.functions[0].body.stmts[0] {
            Stmt::Return(ret) => assert_eq!(ret.fn_name.as_str(), "foo"),
            other => panic!("expected return, got {other:?}"),
        }
    }
}
