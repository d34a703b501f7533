//! AST to three-address lowering.
//!
//! Each function lowers to a label, one `pop` per parameter in declaration
//! order, then the flattened body. Expression lowering is the classic
//! bottom-up walk: operands come back from subtrees, temporaries hold
//! intermediate results.
//!
//! Control flow synthesizes labels from independent monotonic counters:
//! `.Lif<n>_else` / `.Lif<n>_end` for branches, `.Lloop<n>_head` /
//! `.Lloop<n>_end` for loops. `break` jumps to the innermost loop's end
//! label. `and`/`or` evaluate both operands in Pratt order and combine them
//! with the strict logical ops; there is no hidden control flow inside an
//! expression.

use std::path::Path;

use thiserror::Error;
use wombatc_lex::LiteralKind;
use wombatc_par::ast::{Assign, Ast, Block, Expr, FnCall, FnDecl, Stmt, VarDecl};
use wombatc_par::types::Primitive;
use wombatc_util::{Location, Symbol};

use crate::ir::{Instruction, IrFunction, IrProgram, OpCode, Operand};

/// Number of arguments that travel in registers; the rest go on the stack.
const ABI_REGISTER_ARGS: usize = 6;

/// Bytes a temporary occupies in the frame.
const TEMP_SIZE: usize = 8;

/// A fatal lowering error.
///
/// A decorated AST that survives the semantic pass can only trip the float
/// and power limitations here; everything else guards internal invariants.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct LowerError {
    pub message: String,
    pub loc: Option<Location>,
}

impl LowerError {
    fn at(message: impl Into<String>, loc: Location) -> Self {
        Self {
            message: message.into(),
            loc: Some(loc),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            loc: None,
        }
    }
}

type LResult<T> = Result<T, LowerError>;

/// Lowers a decorated AST into an [`IrProgram`].
pub fn lower_program(ast: &Ast, src: &Path) -> LResult<IrProgram> {
    let mut lowering = Lowering::new();
    let mut program = IrProgram::new(src);
    for func in &ast.functions {
        program.functions.push(lowering.lower_fn(func)?);
    }
    Ok(program)
}

/// Lowering state: temp, loop, and branch counters are independent and
/// reset per program; stack accounting resets per function.
struct Lowering {
    temp_counter: usize,
    loop_counter: usize,
    branch_counter: usize,
    /// End labels of the loops currently being lowered, innermost last.
    loop_ends: Vec<String>,
    /// Bytes of locals, params, and temps in the current function.
    stack_space: usize,
}

impl Lowering {
    fn new() -> Self {
        Self {
            temp_counter: 0,
            loop_counter: 0,
            branch_counter: 0,
            loop_ends: Vec::new(),
            stack_space: 0,
        }
    }

    fn next_temp(&mut self) -> usize {
        let id = self.temp_counter;
        self.temp_counter += 1;
        self.stack_space += TEMP_SIZE;
        id
    }

    fn temp_symbol(id: usize) -> Symbol {
        Symbol::intern(&format!("%t{id}"))
    }

    fn lower_fn(&mut self, func: &FnDecl) -> LResult<IrFunction> {
        self.stack_space = 0;
        let mut lowered = IrFunction::new(func.header.name);

        lowered.push_inst(Instruction::new(
            OpCode::Label,
            Some(func.header.name),
            vec![],
        ));

        for param in &func.header.params {
            let size = param.ty.size_in_bytes().max(1);
            self.stack_space += size;
            lowered.push_inst(Instruction::new(
                OpCode::Pop,
                Some(param.name),
                vec![Operand::int_lit(size)],
            ));
        }

        let mut body = Vec::new();
        self.lower_block(&func.body, &mut body)?;
        lowered.insts.extend(body);
        lowered.stack_space = self.stack_space;
        Ok(lowered)
    }

    fn lower_block(&mut self, block: &Block, out: &mut Vec<Instruction>) -> LResult<()> {
        for stmt in &block.stmts {
            self.lower_stmt(stmt, out)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt, out: &mut Vec<Instruction>) -> LResult<()> {
        match stmt {
            Stmt::VarDecl(decl) => self.lower_var_decl(decl, out),
            Stmt::Assign(assign) => self.lower_assign(assign, out),
            Stmt::Call(call) => self.lower_call(call, false, out).map(|_| ()),
            Stmt::Return(ret) => {
                let mut ops = Vec::new();
                if let Some(expr) = &ret.expr {
                    ops.push(self.lower_expr(expr, out)?);
                }
                ops.push(Operand::label(ret.fn_name.as_str()));
                out.push(Instruction::new(OpCode::Ret, None, ops));
                Ok(())
            }
            Stmt::If(stmt) => {
                let cond = self.lower_expr(&stmt.cond, out)?;
                let n = self.branch_counter;
                self.branch_counter += 1;

                let else_label = format!(".Lif{n}_else");
                let end_label = format!(".Lif{n}_end");
                let target = if stmt.else_block.is_some() {
                    &else_label
                } else {
                    &end_label
                };

                out.push(Instruction::new(
                    OpCode::JmpFalse,
                    None,
                    vec![cond, Operand::label(target)],
                ));
                self.lower_block(&stmt.then_block, out)?;

                if let Some(else_block) = &stmt.else_block {
                    out.push(Instruction::new(
                        OpCode::Jmp,
                        None,
                        vec![Operand::label(&end_label)],
                    ));
                    out.push(Instruction::new(
                        OpCode::Label,
                        Some(Symbol::intern(&else_label)),
                        vec![],
                    ));
                    self.lower_block(else_block, out)?;
                }
                out.push(Instruction::new(
                    OpCode::Label,
                    Some(Symbol::intern(&end_label)),
                    vec![],
                ));
                Ok(())
            }
            Stmt::Loop(stmt) => {
                let n = self.loop_counter;
                self.loop_counter += 1;

                let head = format!(".Lloop{n}_head");
                let end = format!(".Lloop{n}_end");

                out.push(Instruction::new(
                    OpCode::Label,
                    Some(Symbol::intern(&head)),
                    vec![],
                ));
                self.loop_ends.push(end.clone());
                let result = self.lower_block(&stmt.body, out);
                self.loop_ends.pop();
                result?;

                out.push(Instruction::new(
                    OpCode::Jmp,
                    None,
                    vec![Operand::label(&head)],
                ));
                out.push(Instruction::new(
                    OpCode::Label,
                    Some(Symbol::intern(&end)),
                    vec![],
                ));
                Ok(())
            }
            Stmt::Break(stmt) => {
                let end = self.loop_ends.last().cloned().ok_or_else(|| {
                    LowerError::at("'break' lowered outside of a loop", stmt.loc)
                })?;
                out.push(Instruction::new(
                    OpCode::Jmp,
                    None,
                    vec![Operand::label(&end)],
                ));
                Ok(())
            }
        }
    }

    fn lower_var_decl(&mut self, decl: &VarDecl, out: &mut Vec<Instruction>) -> LResult<()> {
        let size = decl.ty.size_in_bytes().max(1);
        self.stack_space += size;
        out.push(Instruction::new(
            OpCode::Alloc,
            Some(decl.name),
            vec![Operand::int_lit(size)],
        ));

        if let Some(init) = &decl.init {
            let value = self.lower_expr(&init.expr, out)?;
            // A plain variable-to-variable initializer is a copy; anything
            // else stores a computed value.
            let op = if matches!(value, Operand::Sym(_)) {
                OpCode::Copy
            } else {
                OpCode::Assign
            };
            out.push(Instruction::new(op, Some(decl.name), vec![value]));
        }
        Ok(())
    }

    fn lower_assign(&mut self, assign: &Assign, out: &mut Vec<Instruction>) -> LResult<()> {
        let value = match assign.op.desugared() {
            None => self.lower_expr(&assign.expr, out)?,
            Some(bin_op) => {
                // `x op= e` desugars to `x = x op e`.
                let opcode = OpCode::from_bin_op(bin_op).ok_or_else(|| {
                    LowerError::at(
                        format!("unsupported binary op in lowering: '{bin_op}'"),
                        assign.loc,
                    )
                })?;
                let rhs = self.lower_expr(&assign.expr, out)?;
                let id = self.next_temp();
                out.push(Instruction::new(
                    opcode,
                    Some(Self::temp_symbol(id)),
                    vec![Operand::Sym(assign.name), rhs],
                ));
                Operand::Temp(id)
            }
        };
        out.push(Instruction::new(
            OpCode::Assign,
            Some(assign.name),
            vec![value],
        ));
        Ok(())
    }

    fn lower_expr(&mut self, expr: &Expr, out: &mut Vec<Instruction>) -> LResult<Operand> {
        match expr {
            Expr::Literal(lit) => {
                if lit.kind == LiteralKind::Float {
                    return Err(LowerError::at(
                        "float code generation is not implemented",
                        lit.loc,
                    ));
                }
                Ok(Operand::Lit {
                    lexeme: lit.lexeme.clone(),
                    kind: lit.kind,
                })
            }
            Expr::Var(term) => Ok(Operand::Sym(term.name)),
            Expr::Binary(bin) => {
                if bin.ty.as_ref().is_some_and(|t| t.is_primitive(Primitive::Float)) {
                    return Err(LowerError::at(
                        "float code generation is not implemented",
                        bin.loc,
                    ));
                }
                let opcode = OpCode::from_bin_op(bin.op).ok_or_else(|| {
                    LowerError::at(
                        format!("unsupported binary op in lowering: '{}'", bin.op),
                        bin.loc,
                    )
                })?;
                let lhs = self.lower_expr(&bin.lhs, out)?;
                let rhs = self.lower_expr(&bin.rhs, out)?;
                let id = self.next_temp();
                out.push(Instruction::new(
                    opcode,
                    Some(Self::temp_symbol(id)),
                    vec![lhs, rhs],
                ));
                Ok(Operand::Temp(id))
            }
            Expr::Unary(un) => {
                if un.ty.as_ref().is_some_and(|t| t.is_primitive(Primitive::Float)) {
                    return Err(LowerError::at(
                        "float code generation is not implemented",
                        un.loc,
                    ));
                }
                let operand = self.lower_expr(&un.operand, out)?;
                let id = self.next_temp();
                out.push(Instruction::new(
                    OpCode::from_un_op(un.op),
                    Some(Self::temp_symbol(id)),
                    vec![operand],
                ));
                Ok(Operand::Temp(id))
            }
            Expr::Subscript(sub) => {
                let index = self.lower_expr(&sub.index, out)?;
                let elem_size = sub
                    .ty
                    .as_ref()
                    .map(|t| t.size_in_bytes().max(1))
                    .ok_or_else(|| {
                        LowerError::internal("subscription reached lowering undecorated")
                    })?;
                let id = self.next_temp();
                out.push(Instruction::new(
                    OpCode::Load,
                    Some(Self::temp_symbol(id)),
                    vec![Operand::Sym(sub.array), index, Operand::int_lit(elem_size)],
                ));
                Ok(Operand::Temp(id))
            }
            Expr::Call(call) => {
                let result = self.lower_call(call, true, out)?;
                result.ok_or_else(|| {
                    LowerError::internal("expression call lowered without a result temp")
                })
            }
        }
    }

    /// Lowers a call site.
    ///
    /// Arguments are evaluated left-to-right. Pushes for the register-window
    /// arguments are emitted in declaration order so the first argument
    /// claims `rdi`; stack arguments (the seventh onward) are pushed in
    /// reverse so the seventh lands closest to the frame.
    fn lower_call(
        &mut self,
        call: &FnCall,
        want_result: bool,
        out: &mut Vec<Instruction>,
    ) -> LResult<Option<Operand>> {
        let values: Vec<Operand> = call
            .args
            .iter()
            .map(|arg| self.lower_expr(arg, out))
            .collect::<LResult<_>>()?;

        let register_args = values.len().min(ABI_REGISTER_ARGS);
        for value in &values[..register_args] {
            out.push(Instruction::new(OpCode::Push, None, vec![value.clone()]));
        }
        for value in values[register_args..].iter().rev() {
            out.push(Instruction::new(OpCode::Push, None, vec![value.clone()]));
        }

        let dst = if want_result {
            let id = self.next_temp();
            Some((id, Self::temp_symbol(id)))
        } else {
            None
        };

        out.push(Instruction::new(
            OpCode::Call,
            dst.map(|(_, sym)| sym),
            vec![
                Operand::label(call.name.as_str()),
                Operand::int_lit(values.len()),
            ],
        ));
        Ok(dst.map(|(id, _)| Operand::Temp(id)))
    }
}
