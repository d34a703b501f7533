//! AST pretty printing, used by the `-ast` dump flag.

use std::fmt::Write as _;

use crate::ast::{Ast, Block, Expr, FnDecl, Stmt};

/// Renders an indented, human-readable dump of the tree.
pub struct AstPrinter {
    out: String,
    depth: usize,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    pub fn print(mut self, ast: &Ast) -> String {
        for import in &ast.imports {
            self.line(&format!("import {}", import.name));
        }
        for func in &ast.functions {
            self.print_fn(func);
        }
        self.out
    }

    fn print_fn(&mut self, func: &FnDecl) {
        let params: Vec<String> = func
            .header
            .params
            .iter()
            .map(|p| format!("{} {}: {}", p.mutability, p.name, p.ty))
            .collect();
        self.line(&format!(
            "fn {} ({}) -> {}",
            func.header.name,
            params.join(", "),
            func.header.ret_type
        ));
        self.depth += 1;
        self.print_block(&func.body);
        self.depth -= 1;
    }

    fn print_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.print_stmt(stmt);
        }
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl(decl) => {
                self.line(&format!("{} {}: {}", decl.mutability, decl.name, decl.ty));
                if let Some(init) = &decl.init {
                    self.depth += 1;
                    self.print_expr(&init.expr);
                    self.depth -= 1;
                }
            }
            Stmt::Assign(assign) => {
                self.line(&format!("assign {} {}", assign.name, assign.op));
                self.depth += 1;
                self.print_expr(&assign.expr);
                self.depth -= 1;
            }
            Stmt::Call(call) => {
                self.line(&format!("call {}", call.name));
                self.depth += 1;
                for arg in &call.args {
                    self.print_expr(arg);
                }
                self.depth -= 1;
            }
            Stmt::Return(ret) => {
                self.line(&format!("return (from {})", ret.fn_name));
                if let Some(expr) = &ret.expr {
                    self.depth += 1;
                    self.print_expr(expr);
                    self.depth -= 1;
                }
            }
            Stmt::If(stmt) => {
                self.line("if");
                self.depth += 1;
                self.print_expr(&stmt.cond);
                self.line("then");
                self.depth += 1;
                self.print_block(&stmt.then_block);
                self.depth -= 1;
                if let Some(else_block) = &stmt.else_block {
                    self.line("else");
                    self.depth += 1;
                    self.print_block(else_block);
                    self.depth -= 1;
                }
                self.depth -= 1;
            }
            Stmt::Loop(stmt) => {
                self.line("loop");
                self.depth += 1;
                self.print_block(&stmt.body);
                self.depth -= 1;
            }
            Stmt::Break(_) => self.line("break"),
        }
    }

    fn print_expr(&mut self, expr: &Expr) {
        let ty_suffix = |t: Option<&crate::types::TypeRef>| match t {
            Some(ty) => format!(" :: {ty}"),
            None => String::new(),
        };
        match expr {
            Expr::Literal(lit) => {
                self.line(&format!("lit {:?} {}{}", lit.kind, lit.lexeme, ty_suffix(lit.ty.as_ref())));
            }
            Expr::Var(var) => {
                self.line(&format!("var {}{}", var.name, ty_suffix(var.ty.as_ref())));
            }
            Expr::Binary(bin) => {
                self.line(&format!("binop {}{}", bin.op, ty_suffix(bin.ty.as_ref())));
                self.depth += 1;
                self.print_expr(&bin.lhs);
                self.print_expr(&bin.rhs);
                self.depth -= 1;
            }
            Expr::Unary(un) => {
                self.line(&format!("unop {}{}", un.op, ty_suffix(un.ty.as_ref())));
                self.depth += 1;
                self.print_expr(&un.operand);
                self.depth -= 1;
            }
            Expr::Subscript(sub) => {
                self.line(&format!("subscript {}{}", sub.array, ty_suffix(sub.ty.as_ref())));
                self.depth += 1;
                self.print_expr(&sub.index);
                self.depth -= 1;
            }
            Expr::Call(call) => {
                self.line(&format!("call {}{}", call.name, ty_suffix(call.ty.as_ref())));
                self.depth += 1;
                for arg in &call.args {
                    self.print_expr(arg);
                }
                self.depth -= 1;
            }
        }
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}{}", "  ".repeat(self.depth), text);
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}
