//! Expression parsing via Pratt precedence climbing.
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `or` | Left |
//! | 2 | `and` | Left |
//! | 3 | `==`, `!=`, `<`, `<=`, `>`, `>=` | Left |
//! | 4 | `\|` | Left |
//! | 5 | `^` | Left |
//! | 6 | `&` | Left |
//! | 7 | `<<`, `>>` | Left |
//! | 8 | `+`, `-` | Left |
//! | 9 | `*`, `/`, `%`, `//` | Left |
//! | 10 | `**` | Right |
//! | 11 | prefix `-`, `!`, `~`, `not` | Right |
//!
//! Grouping parentheses are unwrapped: `(e)` parses to the node for `e`.

use wombatc_lex::{BinOpKind, TokenKind};
use wombatc_util::Symbol;

use crate::ast::{BinExpr, Expr, FnCall, Literal, Subscript, UnExpr, VarTerm};
use crate::{PResult, Parser};

/// Binding strength of an operator. Variant order is the precedence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    /// Weakest level; the entry point for any expression.
    Dummy = 0,
    LogicalOr,
    LogicalAnd,
    Compare,
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Sum,
    Product,
    Pow,
    Prefix,
    /// Strongest level; nothing binds past it.
    Unambiguous,
}

impl Precedence {
    /// The next-tighter level, saturating at [`Precedence::Unambiguous`].
    fn tighter(self) -> Precedence {
        match self {
            Precedence::Dummy => Precedence::LogicalOr,
            Precedence::LogicalOr => Precedence::LogicalAnd,
            Precedence::LogicalAnd => Precedence::Compare,
            Precedence::Compare => Precedence::BitOr,
            Precedence::BitOr => Precedence::BitXor,
            Precedence::BitXor => Precedence::BitAnd,
            Precedence::BitAnd => Precedence::Shift,
            Precedence::Shift => Precedence::Sum,
            Precedence::Sum => Precedence::Product,
            Precedence::Product => Precedence::Pow,
            Precedence::Pow => Precedence::Prefix,
            Precedence::Prefix | Precedence::Unambiguous => Precedence::Unambiguous,
        }
    }
}

/// Operator associativity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

pub fn prec_from_bin_op(op: BinOpKind) -> Precedence {
    match op {
        BinOpKind::Or => Precedence::LogicalOr,
        BinOpKind::And => Precedence::LogicalAnd,
        BinOpKind::Eq
        | BinOpKind::NotEq
        | BinOpKind::Lt
        | BinOpKind::Le
        | BinOpKind::Gt
        | BinOpKind::Ge => Precedence::Compare,
        BinOpKind::BitOr => Precedence::BitOr,
        BinOpKind::BitXor => Precedence::BitXor,
        BinOpKind::BitAnd => Precedence::BitAnd,
        BinOpKind::Shl | BinOpKind::Shr => Precedence::Shift,
        BinOpKind::Add | BinOpKind::Sub => Precedence::Sum,
        BinOpKind::Mul | BinOpKind::Div | BinOpKind::FlooredDiv | BinOpKind::Mod => {
            Precedence::Product
        }
        BinOpKind::Pow => Precedence::Pow,
    }
}

pub fn assoc_from_bin_op(op: BinOpKind) -> Associativity {
    if op == BinOpKind::Pow {
        Associativity::Right
    } else {
        Associativity::Left
    }
}

impl Parser {
    /// Entry point for a full expression.
    pub fn parse_expr(&mut self) -> PResult<Expr> {
        self.expr(Precedence::Dummy)
    }

    /// The Pratt core: parse a primary, then fold in binary operators whose
    /// precedence is at least `min_prec`. Left-associative operators restart
    /// the right-hand side one level tighter; `**` restarts at its own level.
    pub(crate) fn expr(&mut self, min_prec: Precedence) -> PResult<Expr> {
        let mut base = self.expr_primary()?;

        while let Some(op) = self.cur.bin_op() {
            if prec_from_bin_op(op) < min_prec {
                break;
            }
            let loc = self.cur.loc;
            self.bump();

            let rhs = self.expr(rhs_precedence(op))?;
            base = Expr::Binary(Box::new(BinExpr {
                op,
                lhs: base,
                rhs,
                loc,
                ty: None,
            }));
        }
        Ok(base)
    }

    /// Primaries: unary operations, grouping, literals, and identifier-led
    /// forms (call, subscription, variable).
    fn expr_primary(&mut self) -> PResult<Expr> {
        if let Some(op) = self.cur.un_op() {
            let loc = self.cur.loc;
            self.bump();
            let operand = self.expr(Precedence::Prefix)?;
            return Ok(Expr::Unary(Box::new(UnExpr {
                op,
                operand,
                loc,
                ty: None,
            })));
        }

        if self.cur.match_kind(TokenKind::OpenParen) {
            self.bump();
            let group = self.expr(Precedence::Dummy)?;
            self.expect(TokenKind::CloseParen, "to close the group")?;
            return Ok(group);
        }

        if let Some(kind) = self.cur.literal_kind() {
            let lit = Literal {
                kind,
                lexeme: self.cur.lexeme.clone(),
                loc: self.cur.loc,
                ty: None,
            };
            self.bump();
            return Ok(Expr::Literal(lit));
        }

        if self.cur.match_kind(TokenKind::Identifier) {
            if self.nth_is(1, |t| t.match_kind(TokenKind::OpenParen)) {
                return Ok(Expr::Call(self.fn_call_expr()?));
            }
            if self.nth_is(1, |t| t.match_kind(TokenKind::OpenBracket)) {
                return self.subscript_expr();
            }
            let term = VarTerm {
                name: Symbol::intern(&self.cur.lexeme),
                loc: self.cur.loc,
                ty: None,
            };
            self.bump();
            return Ok(Expr::Var(term));
        }

        Err(self.error(format!(
            "invalid token: got '{}', expected expression",
            self.describe_cur()
        )))
    }

    /// `IDENT '(' (expr (',' expr)*)? ')'`
    pub(crate) fn fn_call_expr(&mut self) -> PResult<FnCall> {
        let name_tok = self.expect(TokenKind::Identifier, "to name the callee")?;
        self.expect(TokenKind::OpenParen, "after function name")?;

        let mut args = Vec::new();
        while !self.cur.match_kind(TokenKind::CloseParen) {
            args.push(self.expr(Precedence::Dummy)?);
            if self.cur.match_kind(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        self.expect(TokenKind::CloseParen, "to close the argument list")?;

        Ok(FnCall {
            name: Symbol::intern(&name_tok.lexeme),
            args,
            loc: name_tok.loc,
            ty: None,
        })
    }

    /// `IDENT '[' expr ']'`
    fn subscript_expr(&mut self) -> PResult<Expr> {
        let name_tok = self.expect(TokenKind::Identifier, "to name the array")?;
        self.expect(TokenKind::OpenBracket, "after array name")?;
        let index = self.expr(Precedence::Dummy)?;
        self.expect(TokenKind::CloseBracket, "to close the subscription")?;

        Ok(Expr::Subscript(Box::new(Subscript {
            array: Symbol::intern(&name_tok.lexeme),
            index,
            loc: name_tok.loc,
            ty: None,
        })))
    }
}

/// Minimum precedence for the right-hand side of `op`: the same level for
/// right-associative operators, one tighter for left-associative ones.
fn rhs_precedence(op: BinOpKind) -> Precedence {
    let prec = prec_from_bin_op(op);
    match assoc_from_bin_op(op) {
        Associativity::Right => prec,
        Associativity::Left => prec.tighter(),
    }
}
