//! Function declarations, parameters, and type annotations.
//!
//! ```text
//! fn-decl := 'fn' type IDENT '(' params? ')' block 'end'
//! params  := param (',' param)*
//! param   := 'mut'? IDENT ':' type
//! type    := IDENT | 'ptr' '<' type '>' | '[' INT ']' type
//! ```

use wombatc_lex::{Keyword, TokenKind};
use wombatc_util::Symbol;

use crate::ast::{FnDecl, FnHeader, Param};
use crate::types::{Mutability, Primitive, Type, TypeRef};
use crate::{PResult, Parser};

pub(crate) fn parse_fn_decl(parser: &mut Parser) -> PResult<FnDecl> {
    let header = parse_fn_header(parser)?;

    parser.current_fn = Some(header.name);
    let body = parser.parse_block()?;
    parser.current_fn = None;

    if body.stmts.is_empty() {
        return Err(parser.error("cannot define function without a body"));
    }

    if !parser.cur.match_keyword(Keyword::End) {
        return Err(parser.error(format!(
            "expected 'end' keyword but got '{}'",
            parser.describe_cur()
        )));
    }
    parser.bump();

    Ok(FnDecl { header, body })
}

fn parse_fn_header(parser: &mut Parser) -> PResult<FnHeader> {
    let loc = parser.cur.loc;
    parser.bump(); // 'fn'

    let ret_type = parser.parse_type()?;
    let name = parser.expect(TokenKind::Identifier, "to name the function")?;
    parser.expect(TokenKind::OpenParen, "in fn declaration")?;
    let params = parse_params(parser)?;
    parser.expect(TokenKind::CloseParen, "to close the parameter list")?;

    Ok(FnHeader {
        name: Symbol::intern(&name.lexeme),
        params,
        ret_type,
        loc,
    })
}

fn parse_params(parser: &mut Parser) -> PResult<Vec<Param>> {
    let mut params = Vec::new();
    if parser.cur.match_kind(TokenKind::CloseParen) {
        // Empty parameter list; the parentheses are still required.
        return Ok(params);
    }

    loop {
        params.push(parse_param(parser)?);
        if parser.cur.match_kind(TokenKind::CloseParen) {
            return Ok(params);
        }
        parser.expect(
            TokenKind::Comma,
            "or a closing parenthesis after function parameter",
        )?;
    }
}

fn parse_param(parser: &mut Parser) -> PResult<Param> {
    let mutability = if parser.cur.match_keyword(Keyword::Mut) {
        parser.bump();
        Mutability::Mutable
    } else {
        Mutability::Immutable
    };

    let name = parser.expect(TokenKind::Identifier, "to name the parameter")?;
    parser.expect(TokenKind::Colon, "after param identifier")?;
    let ty = parser.parse_type()?;

    Ok(Param {
        mutability,
        name: Symbol::intern(&name.lexeme),
        ty,
    })
}

impl Parser {
    /// Parses a type annotation.
    pub(crate) fn parse_type(&mut self) -> PResult<TypeRef> {
        if self.cur.match_kind(TokenKind::Identifier) {
            let prim = Primitive::from_name(&self.cur.lexeme).ok_or_else(|| {
                self.error(format!(
                    "expected a valid primitive type, got '{}'",
                    self.cur.lexeme
                ))
            })?;
            self.bump();
            return Ok(Type::primitive(prim));
        }

        if self.cur.match_keyword(Keyword::Ptr) {
            self.bump();
            self.expect(TokenKind::Lt, "after ptr keyword")?;
            let underlying = self.parse_type()?;
            self.expect_close_angle()?;
            return Ok(Type::pointer(underlying));
        }

        if self.cur.match_kind(TokenKind::OpenBracket) {
            self.bump();
            let len_tok = self.expect(TokenKind::LiteralNum, "as a constant array size")?;
            let len: usize = len_tok.lexeme.parse().map_err(|_| {
                self.error(format!("invalid array size '{}'", len_tok.lexeme))
            })?;
            self.expect(TokenKind::CloseBracket, "after array size")?;
            let elem = self.parse_type()?;
            return Ok(Type::array(len, elem));
        }

        Err(self.error(format!("expected type but got '{}'", self.describe_cur())))
    }

    /// Consumes the `>` closing a pointer type. A `>>` token (as in
    /// `ptr<ptr<int>>`) is split in place: one angle is consumed and the
    /// other remains the current token.
    fn expect_close_angle(&mut self) -> PResult<()> {
        use wombatc_lex::Token;
        use wombatc_util::Location;

        if self.cur.match_kind(TokenKind::Gt) {
            self.bump();
            return Ok(());
        }
        if self.cur.match_kind(TokenKind::ShiftRight) {
            let loc = Location::new(self.cur.loc.line, self.cur.loc.col + 1);
            self.cur = Token::new(TokenKind::Gt, ">", loc);
            return Ok(());
        }
        Err(self.error(format!(
            "expected '>' after ptr type but got '{}'",
            self.describe_cur()
        )))
    }

    /// Parses a bodiless signature: `'fn' type IDENT '(' params? ')' ';'`.
    ///
    /// This is how the builtin table is loaded; builtins are declared in the
    /// language's own syntax.
    pub fn parse_fn_signature(&mut self) -> PResult<FnHeader> {
        if !self.cur.match_keyword(Keyword::Fn) {
            return Err(self.error(format!(
                "expected 'fn' to start a signature but got '{}'",
                self.describe_cur()
            )));
        }
        let header = parse_fn_header(self)?;
        self.expect_semi("after signature")?;
        Ok(header)
    }
}
