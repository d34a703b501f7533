//! The semantic pass: scope resolution, type decoration, and type checking.

use thiserror::Error;
use wombatc_lex::{BinOpKind, LiteralKind, UnOpKind};
use wombatc_par::ast::{
    Assign, Ast, Block, Expr, FnCall, FnDecl, Return, Stmt, Subscript, VarDecl,
};
use wombatc_par::types::{Mutability, Primitive, Type, TypeRef};
use wombatc_util::Location;

use crate::builtins::builtin_headers;
use crate::scope::{SymbolInfo, SymbolTable};

/// A fatal semantic error, optionally anchored at a source location.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct SemaError {
    pub message: String,
    pub hint: String,
    pub loc: Option<Location>,
}

impl SemaError {
    fn at(message: impl Into<String>, loc: Location) -> Self {
        Self {
            message: message.into(),
            hint: String::new(),
            loc: Some(loc),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: String::new(),
            loc: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }
}

type SResult<T> = Result<T, SemaError>;

/// Walks the AST, resolving names and decorating every expression node with
/// its type.
pub struct SemanticAnalyzer {
    table: SymbolTable,
    loop_depth: usize,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            loop_depth: 0,
        }
    }

    /// Runs the full pass over a program.
    pub fn analyze(&mut self, ast: &mut Ast) -> SResult<()> {
        self.register_builtins()?;

        if let Some(import) = ast.imports.first() {
            return Err(SemaError::at(
                format!("imports are not supported: '{}'", import.name),
                import.loc,
            )
            .with_hint("remove the import statement"));
        }

        // Register every function first so mutually-recursive calls resolve.
        for func in &ast.functions {
            self.register_fn(func)?;
        }
        for func in &mut ast.functions {
            self.analyze_fn(func)?;
        }
        Ok(())
    }

    fn register_builtins(&mut self) -> SResult<()> {
        for header in builtin_headers()? {
            self.table.insert_global(
                header.name,
                SymbolInfo::Fn {
                    params: header.params,
                    ret_type: header.ret_type,
                },
            );
        }
        Ok(())
    }

    fn register_fn(&mut self, func: &FnDecl) -> SResult<()> {
        let name = func.header.name;
        if self.table.exists_in_current(name) {
            return Err(SemaError::at(
                format!("'{name}' was already declared in this scope."),
                func.header.loc,
            ));
        }
        self.table.insert_global(
            name,
            SymbolInfo::Fn {
                params: func.header.params.clone(),
                ret_type: func.header.ret_type.clone(),
            },
        );
        Ok(())
    }

    fn analyze_fn(&mut self, func: &mut FnDecl) -> SResult<()> {
        self.table.push_scope();
        for param in &func.header.params {
            self.table.insert(
                param.name,
                SymbolInfo::Var {
                    ty: param.ty.clone(),
                    mutability: param.mutability,
                },
            );
        }
        let result = self.analyze_block(&mut func.body);
        self.table.pop_scope();
        result
    }

    fn analyze_block(&mut self, block: &mut Block) -> SResult<()> {
        for stmt in &mut block.stmts {
            self.analyze_stmt(stmt)?;
        }
        Ok(())
    }

    fn analyze_stmt(&mut self, stmt: &mut Stmt) -> SResult<()> {
        match stmt {
            Stmt::VarDecl(decl) => self.analyze_var_decl(decl),
            Stmt::Assign(assign) => self.analyze_assign(assign),
            Stmt::Call(call) => self.analyze_call(call).map(|_| ()),
            Stmt::Return(ret) => self.analyze_return(ret),
            Stmt::If(stmt) => {
                let cond_ty = self.analyze_expr(&mut stmt.cond)?;
                if !cond_ty.is_primitive(Primitive::Bool) {
                    return Err(SemaError::at(
                        format!("if condition must be 'bool', got '{cond_ty}'"),
                        stmt.cond.loc(),
                    ));
                }
                self.analyze_block(&mut stmt.then_block)?;
                if let Some(else_block) = &mut stmt.else_block {
                    self.analyze_block(else_block)?;
                }
                Ok(())
            }
            Stmt::Loop(stmt) => {
                self.loop_depth += 1;
                let result = self.analyze_block(&mut stmt.body);
                self.loop_depth -= 1;
                result
            }
            Stmt::Break(stmt) => {
                if self.loop_depth == 0 {
                    return Err(SemaError::at("'break' outside of a loop", stmt.loc));
                }
                Ok(())
            }
        }
    }

    fn analyze_var_decl(&mut self, decl: &mut VarDecl) -> SResult<()> {
        if self.table.exists_in_current(decl.name) {
            return Err(SemaError::at(
                format!("'{}' was already declared in this scope.", decl.name),
                decl.loc,
            ));
        }

        if let Some(init) = &mut decl.init {
            let init_ty = self.analyze_expr(&mut init.expr)?;
            if !init_ty.same(&decl.ty) {
                return Err(SemaError::at(
                    format!("mismatched types: got '{init_ty}', expected: '{}'", decl.ty),
                    init.expr.loc(),
                ));
            }
        }

        // Insert last, so the initializer cannot see the binding.
        self.table.insert(
            decl.name,
            SymbolInfo::Var {
                ty: decl.ty.clone(),
                mutability: decl.mutability,
            },
        );
        Ok(())
    }

    fn analyze_assign(&mut self, assign: &mut Assign) -> SResult<()> {
        let (var_ty, mutability) = match self.table.lookup(assign.name) {
            None => {
                return Err(SemaError::at(
                    format!("'{}' was not declared in this scope.", assign.name),
                    assign.loc,
                ))
            }
            Some(SymbolInfo::Fn { .. }) => {
                return Err(SemaError::at(
                    format!("'{}' is a function and cannot be assigned to.", assign.name),
                    assign.loc,
                ))
            }
            Some(SymbolInfo::Var { ty, mutability }) => (ty.clone(), *mutability),
        };

        if mutability != Mutability::Mutable {
            return Err(SemaError::at(
                format!("'{}' is not mutable.", assign.name),
                assign.loc,
            )
            .with_hint("declare it with 'mut' to allow assignment"));
        }

        let rhs_ty = self.analyze_expr(&mut assign.expr)?;

        // A compound assignment must type like its desugared binary form.
        let result_ty = match assign.op.desugared() {
            Some(bin_op) => self.binary_result(bin_op, &var_ty, &rhs_ty, assign.loc)?,
            None => rhs_ty,
        };

        if !result_ty.same(&var_ty) {
            return Err(SemaError::at(
                format!(
                    "{} is of type: '{var_ty}', but got: '{result_ty}'",
                    assign.name
                ),
                assign.expr.loc(),
            ));
        }
        Ok(())
    }

    fn analyze_return(&mut self, ret: &mut Return) -> SResult<()> {
        let ret_type = match self.table.lookup(ret.fn_name) {
            Some(SymbolInfo::Fn { ret_type, .. }) => ret_type.clone(),
            _ => {
                return Err(SemaError::internal(format!(
                    "return statement bound to unknown function '{}'",
                    ret.fn_name
                )))
            }
        };

        if ret_type.is_primitive(Primitive::Free) {
            if let Some(expr) = &mut ret.expr {
                let got = self.analyze_expr(expr)?;
                return Err(SemaError::at(
                    format!("'{}' has return type 'free' but got '{got}'", ret.fn_name),
                    expr.loc(),
                ));
            }
            return Ok(());
        }

        let Some(expr) = &mut ret.expr else {
            return Err(SemaError::at(
                format!(
                    "'{}' requires a return value of type '{ret_type}'",
                    ret.fn_name
                ),
                ret.loc,
            ));
        };
        let got = self.analyze_expr(expr)?;
        if !got.same(&ret_type) {
            return Err(SemaError::at(
                format!(
                    "type mismatch in return: function '{}' expects '{ret_type}' but got '{got}'",
                    ret.fn_name
                ),
                expr.loc(),
            ));
        }
        Ok(())
    }

    fn analyze_expr(&mut self, expr: &mut Expr) -> SResult<TypeRef> {
        match expr {
            Expr::Literal(lit) => {
                let ty = match lit.kind {
                    LiteralKind::Int => Type::primitive(Primitive::Int),
                    LiteralKind::Float => Type::primitive(Primitive::Float),
                    LiteralKind::Char => Type::primitive(Primitive::Char),
                    LiteralKind::Bool => Type::primitive(Primitive::Bool),
                    LiteralKind::Str => {
                        // Chop the two surrounding quotes.
                        let len = lit.lexeme.len().saturating_sub(2);
                        Type::array(len, Type::primitive(Primitive::Char))
                    }
                };
                lit.ty = Some(ty.clone());
                Ok(ty)
            }
            Expr::Var(term) => {
                let ty = match self.table.lookup(term.name) {
                    None => {
                        return Err(SemaError::at(
                            format!("'{}' was not declared in this scope.", term.name),
                            term.loc,
                        ))
                    }
                    Some(SymbolInfo::Fn { .. }) => {
                        return Err(SemaError::at(
                            format!("invalid expression: '{}' not a term.", term.name),
                            term.loc,
                        ))
                    }
                    Some(SymbolInfo::Var { ty, .. }) => ty.clone(),
                };
                term.ty = Some(ty.clone());
                Ok(ty)
            }
            Expr::Subscript(sub) => self.analyze_subscript(sub),
            Expr::Binary(bin) => {
                let lhs_ty = self.analyze_expr(&mut bin.lhs)?;
                let rhs_ty = self.analyze_expr(&mut bin.rhs)?;
                let ty = self.binary_result(bin.op, &lhs_ty, &rhs_ty, bin.loc)?;
                bin.ty = Some(ty.clone());
                Ok(ty)
            }
            Expr::Unary(un) => {
                let operand_ty = self.analyze_expr(&mut un.operand)?;
                let ty = match un.op {
                    UnOpKind::Neg => {
                        if operand_ty.is_primitive(Primitive::Int)
                            || operand_ty.is_primitive(Primitive::Float)
                        {
                            operand_ty
                        } else {
                            return Err(SemaError::at(
                                format!("cannot negate type '{operand_ty}'"),
                                un.loc,
                            ));
                        }
                    }
                    UnOpKind::Not => {
                        if operand_ty.is_primitive(Primitive::Bool) {
                            Type::primitive(Primitive::Bool)
                        } else {
                            return Err(SemaError::at(
                                format!("cannot apply 'not' to type '{operand_ty}'"),
                                un.loc,
                            ));
                        }
                    }
                    UnOpKind::BitNot => {
                        if operand_ty.is_primitive(Primitive::Int)
                            || operand_ty.is_primitive(Primitive::Bool)
                        {
                            operand_ty
                        } else {
                            return Err(SemaError::at(
                                format!("cannot apply '~' to type '{operand_ty}'"),
                                un.loc,
                            ));
                        }
                    }
                };
                un.ty = Some(ty.clone());
                Ok(ty)
            }
            Expr::Call(call) => self.analyze_call(call),
        }
    }

    fn analyze_subscript(&mut self, sub: &mut Subscript) -> SResult<TypeRef> {
        let array_ty = match self.table.lookup(sub.array) {
            None => {
                return Err(SemaError::at(
                    format!("'{}' was not declared in this scope.", sub.array),
                    sub.loc,
                ))
            }
            Some(SymbolInfo::Fn { .. }) => {
                return Err(SemaError::at("cannot subscript a function.", sub.loc))
            }
            Some(SymbolInfo::Var { ty, .. }) => ty.clone(),
        };

        let index_ty = self.analyze_expr(&mut sub.index)?;
        if !index_ty.is_primitive(Primitive::Int) {
            return Err(SemaError::at(
                format!("array index must be an integer: got '{index_ty}'"),
                sub.index.loc(),
            ));
        }

        let Type::Array { elem, .. } = array_ty.as_ref() else {
            return Err(SemaError::at(
                format!("must use a subscriptable item, got: '{array_ty}' but expected an array"),
                sub.loc,
            ));
        };
        sub.ty = Some(elem.clone());
        Ok(elem.clone())
    }

    fn analyze_call(&mut self, call: &mut FnCall) -> SResult<TypeRef> {
        let (params, ret_type) = match self.table.lookup(call.name) {
            None => {
                return Err(SemaError::at(
                    format!("'{}' was not declared in this scope.", call.name),
                    call.loc,
                ))
            }
            Some(SymbolInfo::Var { .. }) => {
                return Err(SemaError::at(
                    format!("'{}' is not a function and cannot be called.", call.name),
                    call.loc,
                ))
            }
            Some(SymbolInfo::Fn { params, ret_type }) => (params.clone(), ret_type.clone()),
        };

        if call.args.len() != params.len() {
            return Err(SemaError::at(
                format!(
                    "function '{}' takes {} parameters but {} arguments were provided",
                    call.name,
                    params.len(),
                    call.args.len()
                ),
                call.loc,
            ));
        }

        for (arg, param) in call.args.iter_mut().zip(params.iter()) {
            let arg_ty = self.analyze_expr(arg)?;
            if !arg_ty.same(&param.ty) {
                return Err(SemaError::at(
                    format!(
                        "in '{}', '{}' expects argument of type '{}', but got '{arg_ty}'",
                        call.name, param.name, param.ty
                    ),
                    arg.loc(),
                ));
            }
        }

        call.ty = Some(ret_type.clone());
        Ok(ret_type)
    }

    /// The binary-operation typing rule.
    ///
    /// Arrays never participate; pointers delegate to the pointer-arithmetic
    /// rule; everything else requires equal operand types.
    fn binary_result(
        &self,
        op: BinOpKind,
        lhs: &TypeRef,
        rhs: &TypeRef,
        loc: Location,
    ) -> SResult<TypeRef> {
        if lhs.is_array() || rhs.is_array() {
            return Err(SemaError::at(
                format!("invalid expression: cannot use '{lhs}' and '{rhs}' in binary operation"),
                loc,
            ));
        }
        if lhs.is_pointer() || rhs.is_pointer() {
            return self.pointer_arithmetics(op, lhs, rhs, loc);
        }
        if !lhs.same(rhs) {
            return Err(SemaError::at(
                format!("mismatched types: '{lhs} {op} {rhs}'"),
                loc,
            ));
        }

        match op {
            BinOpKind::Add
            | BinOpKind::Sub
            | BinOpKind::Mul
            | BinOpKind::Div
            | BinOpKind::Pow
            | BinOpKind::FlooredDiv
            | BinOpKind::Mod
            | BinOpKind::BitXor
            | BinOpKind::BitAnd
            | BinOpKind::BitOr
            | BinOpKind::Shl
            | BinOpKind::Shr => Ok(lhs.clone()),
            BinOpKind::Eq
            | BinOpKind::NotEq
            | BinOpKind::Lt
            | BinOpKind::Gt
            | BinOpKind::Le
            | BinOpKind::Ge
            | BinOpKind::And
            | BinOpKind::Or => Ok(Type::primitive(Primitive::Bool)),
        }
    }

    /// The pointer-arithmetic rule.
    fn pointer_arithmetics(
        &self,
        op: BinOpKind,
        lhs: &TypeRef,
        rhs: &TypeRef,
        loc: Location,
    ) -> SResult<TypeRef> {
        let both_pointers = lhs.is_pointer() && rhs.is_pointer();
        match op {
            BinOpKind::Add => {
                if both_pointers {
                    return Err(SemaError::at("cannot add pointer to pointer", loc));
                }
                if lhs.is_pointer() && rhs.is_primitive(Primitive::Int) {
                    return Ok(lhs.clone());
                }
                if rhs.is_pointer() && lhs.is_primitive(Primitive::Int) {
                    return Ok(rhs.clone());
                }
                Err(SemaError::at(
                    format!("invalid pointer addition: '{lhs}' + '{rhs}'"),
                    loc,
                ))
            }
            BinOpKind::Sub => {
                if both_pointers {
                    let (Type::Pointer(l), Type::Pointer(r)) = (lhs.as_ref(), rhs.as_ref())
                    else {
                        unreachable!("both operands checked as pointers");
                    };
                    if !l.same(r) {
                        return Err(SemaError::at(
                            format!("cannot perform '-' operation on '{lhs}' and '{rhs}'"),
                            loc,
                        ));
                    }
                    return Ok(Type::primitive(Primitive::Int));
                }
                if lhs.is_pointer() && rhs.is_primitive(Primitive::Int) {
                    return Ok(lhs.clone());
                }
                Err(SemaError::at(
                    format!("invalid pointer subtraction: '{lhs}' - '{rhs}'"),
                    loc,
                ))
            }
            BinOpKind::Eq
            | BinOpKind::NotEq
            | BinOpKind::Lt
            | BinOpKind::Gt
            | BinOpKind::Le
            | BinOpKind::Ge => {
                if both_pointers {
                    let (Type::Pointer(l), Type::Pointer(r)) = (lhs.as_ref(), rhs.as_ref())
                    else {
                        unreachable!("both operands checked as pointers");
                    };
                    if !l.same(r) {
                        return Err(SemaError::at(
                            format!("invalid comparison of different types: '{lhs}' with '{rhs}'"),
                            loc,
                        ));
                    }
                    return Ok(Type::primitive(Primitive::Bool));
                }
                Err(SemaError::at(
                    format!("invalid pointer comparison: '{lhs}' vs '{rhs}'"),
                    loc,
                ))
            }
            _ => Err(SemaError::at(
                format!("unsupported pointer operation '{op}'"),
                loc,
            )),
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
