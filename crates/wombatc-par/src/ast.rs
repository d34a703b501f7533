//! AST node definitions.
//!
//! The tree is strictly ownership-nested: every non-leaf node exclusively
//! owns its children. Expression nodes carry an optional decorated type that
//! is `None` out of the parser and `Some` after the semantic pass; the
//! semantic analyzer mutates only those fields.

use wombatc_lex::{AssignOp, BinOpKind, LiteralKind, UnOpKind};
use wombatc_util::{Location, Symbol};

use crate::types::{Mutability, TypeRef};

/// Root of a parsed program: an ordered list of top-level function
/// declarations, plus any imports.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    pub imports: Vec<Import>,
    pub functions: Vec<FnDecl>,
}

/// `import name;`
#[derive(Clone, Debug)]
pub struct Import {
    pub name: Symbol,
    pub loc: Location,
}

/// A function declaration with its body.
#[derive(Clone, Debug)]
pub struct FnDecl {
    pub header: FnHeader,
    pub body: Block,
}

/// `fn <ret-type> <name>(<params>)`
#[derive(Clone, Debug)]
pub struct FnHeader {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub ret_type: TypeRef,
    pub loc: Location,
}

/// One function parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub mutability: Mutability,
    pub name: Symbol,
    pub ty: TypeRef,
}

/// An ordered list of statements.
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

/// Statement variants.
#[derive(Clone, Debug)]
pub enum Stmt {
    VarDecl(VarDecl),
    Assign(Assign),
    Call(FnCall),
    Return(Return),
    If(If),
    Loop(Loop),
    Break(Break),
}

/// `let|mut name: type (= expr)?;`
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub mutability: Mutability,
    pub name: Symbol,
    pub ty: TypeRef,
    pub init: Option<Initializer>,
    pub loc: Location,
}

/// The initializing operator and expression of a declaration.
#[derive(Clone, Debug)]
pub struct Initializer {
    pub op: AssignOp,
    pub expr: Expr,
}

/// `name <assign-op> expr;`
#[derive(Clone, Debug)]
pub struct Assign {
    pub name: Symbol,
    pub op: AssignOp,
    pub expr: Expr,
    pub loc: Location,
}

/// `return expr?;` - carries the enclosing function's name so the semantic
/// pass can find the matching return type.
#[derive(Clone, Debug)]
pub struct Return {
    pub fn_name: Symbol,
    pub expr: Option<Expr>,
    pub loc: Location,
}

/// `if cond { ... } else { ... }`
#[derive(Clone, Debug)]
pub struct If {
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub loc: Location,
}

/// `loop { ... }`
#[derive(Clone, Debug)]
pub struct Loop {
    pub body: Block,
    pub loc: Location,
}

/// `break;`
#[derive(Clone, Debug)]
pub struct Break {
    pub loc: Location,
}

/// Expression variants.
#[derive(Clone, Debug)]
pub enum Expr {
    Literal(Literal),
    Binary(Box<BinExpr>),
    Unary(Box<UnExpr>),
    Var(VarTerm),
    Subscript(Box<Subscript>),
    Call(FnCall),
}

impl Expr {
    /// The decorated type, populated by the semantic pass.
    pub fn ty(&self) -> Option<&TypeRef> {
        match self {
            Expr::Literal(n) => n.ty.as_ref(),
            Expr::Binary(n) => n.ty.as_ref(),
            Expr::Unary(n) => n.ty.as_ref(),
            Expr::Var(n) => n.ty.as_ref(),
            Expr::Subscript(n) => n.ty.as_ref(),
            Expr::Call(n) => n.ty.as_ref(),
        }
    }

    /// Location of the expression's leading token.
    pub fn loc(&self) -> Location {
        match self {
            Expr::Literal(n) => n.loc,
            Expr::Binary(n) => n.loc,
            Expr::Unary(n) => n.loc,
            Expr::Var(n) => n.loc,
            Expr::Subscript(n) => n.loc,
            Expr::Call(n) => n.loc,
        }
    }
}

/// A literal expression, quoting the raw lexeme.
#[derive(Clone, Debug)]
pub struct Literal {
    pub kind: LiteralKind,
    pub lexeme: String,
    pub loc: Location,
    pub ty: Option<TypeRef>,
}

/// A binary operation.
#[derive(Clone, Debug)]
pub struct BinExpr {
    pub op: BinOpKind,
    pub lhs: Expr,
    pub rhs: Expr,
    pub loc: Location,
    pub ty: Option<TypeRef>,
}

/// A unary operation.
#[derive(Clone, Debug)]
pub struct UnExpr {
    pub op: UnOpKind,
    pub operand: Expr,
    pub loc: Location,
    pub ty: Option<TypeRef>,
}

/// A bare variable reference.
#[derive(Clone, Debug)]
pub struct VarTerm {
    pub name: Symbol,
    pub loc: Location,
    pub ty: Option<TypeRef>,
}

/// `array[index]` - the decorated type is the element type.
#[derive(Clone, Debug)]
pub struct Subscript {
    pub array: Symbol,
    pub index: Expr,
    pub loc: Location,
    pub ty: Option<TypeRef>,
}

/// A function call, in expression or statement position.
#[derive(Clone, Debug)]
pub struct FnCall {
    pub name: Symbol,
    pub args: Vec<Expr>,
    pub loc: Location,
    pub ty: Option<TypeRef>,
}
