//! Statement and block parsing.
//!
//! Statement dispatch is keyword-led, except when the current token is an
//! identifier: one token of lookahead decides between a function call
//! (`IDENT (`) and an assignment.

use wombatc_lex::{Keyword, TokenKind};
use wombatc_util::Symbol;

use crate::ast::{Assign, Block, Break, If, Initializer, Loop, Return, Stmt, VarDecl};
use crate::expr::Precedence;
use crate::types::Mutability;
use crate::{PResult, Parser};

impl Parser {
    /// Parses statements until a `}` or `end` scope terminator (which is
    /// left unconsumed).
    pub(crate) fn parse_block(&mut self) -> PResult<Block> {
        let mut block = Block::default();
        loop {
            if self.cur.match_kind(TokenKind::CloseCurly)
                || self.cur.match_keyword(Keyword::End)
            {
                return Ok(block);
            }
            if self.cur.match_kind(TokenKind::Eof) {
                return Err(self.error("must close a scope with either '}' or 'end'"));
            }
            block.stmts.push(self.parse_stmt()?);
        }
    }

    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        if self.cur.match_keyword(Keyword::Let) || self.cur.match_keyword(Keyword::Mut) {
            return Ok(Stmt::VarDecl(self.var_decl()?));
        }
        if self.cur.match_keyword(Keyword::Return) {
            return Ok(Stmt::Return(self.return_stmt()?));
        }
        if self.cur.match_keyword(Keyword::If) {
            return Ok(Stmt::If(self.if_stmt()?));
        }
        if self.cur.match_keyword(Keyword::Loop) {
            return Ok(Stmt::Loop(self.loop_stmt()?));
        }
        if self.cur.match_keyword(Keyword::Break) {
            let loc = self.cur.loc;
            self.bump();
            self.expect_semi("after 'break'")?;
            return Ok(Stmt::Break(Break { loc }));
        }
        if self.cur.match_keyword(Keyword::Fn) {
            return Err(self
                .error("function declarations are only allowed at the top level"));
        }
        if self.cur.match_kind(TokenKind::Identifier) {
            if self.nth_is(1, |t| t.match_kind(TokenKind::OpenParen)) {
                let call = self.fn_call_expr()?;
                self.expect_semi("after function call")?;
                return Ok(Stmt::Call(call));
            }
            return Ok(Stmt::Assign(self.assignment()?));
        }
        Err(self.error(format!(
            "unknown piece of code, got '{}'",
            self.describe_cur()
        )))
    }

    /// `('let' | 'mut') IDENT ':' type ('=' expr)? ';'`
    fn var_decl(&mut self) -> PResult<VarDecl> {
        let loc = self.cur.loc;
        let mutability = if self.cur.match_keyword(Keyword::Mut) {
            Mutability::Mutable
        } else {
            Mutability::Immutable
        };
        self.bump();

        let name = self.expect(TokenKind::Identifier, "after the binding keyword")?;
        self.expect(TokenKind::Colon, "after the identifier")?;
        let ty = self.parse_type()?;

        let init = if self.cur.match_kind(TokenKind::SemiColon) {
            self.bump();
            None
        } else {
            let eq = self.expect(TokenKind::Eq, "to initialize the declaration")?;
            let op = eq
                .assign_op()
                .ok_or_else(|| self.error("expected a '=' initializer"))?;
            let expr = self.expr(Precedence::Dummy)?;
            self.expect_semi("after local declaration")?;
            Some(Initializer { op, expr })
        };

        Ok(VarDecl {
            mutability,
            name: Symbol::intern(&name.lexeme),
            ty,
            init,
            loc,
        })
    }

    /// `IDENT assign-op expr ';'`
    fn assignment(&mut self) -> PResult<Assign> {
        let name = self.expect(TokenKind::Identifier, "on the left of an assignment")?;

        let op = self.cur.assign_op().ok_or_else(|| {
            self.error(format!(
                "expected an assignment operator but got '{}'",
                self.describe_cur()
            ))
        })?;
        self.bump();

        let expr = self.expr(Precedence::Dummy)?;
        self.expect_semi("after assignment")?;

        Ok(Assign {
            name: Symbol::intern(&name.lexeme),
            op,
            expr,
            loc: name.loc,
        })
    }

    /// `'return' expr? ';'`
    fn return_stmt(&mut self) -> PResult<Return> {
        let loc = self.cur.loc;
        let fn_name = self
            .current_fn
            .ok_or_else(|| self.error("'return' outside of a function"))?;
        self.bump();

        if self.cur.match_kind(TokenKind::SemiColon) {
            self.bump();
            return Ok(Return {
                fn_name,
                expr: None,
                loc,
            });
        }

        let expr = self.expr(Precedence::Dummy)?;
        self.expect_semi("after return statement")?;
        Ok(Return {
            fn_name,
            expr: Some(expr),
            loc,
        })
    }

    /// `'if' expr '{' block '}' ('else' (if | '{' block '}'))?`
    fn if_stmt(&mut self) -> PResult<If> {
        let loc = self.cur.loc;
        self.bump(); // 'if'

        let cond = self.expr(Precedence::Dummy)?;
        self.expect(TokenKind::OpenCurly, "to open the if body")?;
        let then_block = self.parse_block()?;
        self.expect(TokenKind::CloseCurly, "to close the if body")?;

        let else_block = if self.cur.match_keyword(Keyword::Else) {
            self.bump();
            if self.cur.match_keyword(Keyword::If) {
                // `else if` chains nest as a one-statement else block.
                let nested = self.if_stmt()?;
                Some(Block {
                    stmts: vec![Stmt::If(nested)],
                })
            } else {
                self.expect(TokenKind::OpenCurly, "to open the else body")?;
                let block = self.parse_block()?;
                self.expect(TokenKind::CloseCurly, "to close the else body")?;
                Some(block)
            }
        } else {
            None
        };

        Ok(If {
            cond,
            then_block,
            else_block,
            loc,
        })
    }

    /// `'loop' '{' block '}'`
    fn loop_stmt(&mut self) -> PResult<Loop> {
        let loc = self.cur.loc;
        self.bump(); // 'loop'
        self.expect(TokenKind::OpenCurly, "to open the loop body")?;
        let body = self.parse_block()?;
        self.expect(TokenKind::CloseCurly, "to close the loop body")?;
        Ok(Loop { body, loc })
    }
}
