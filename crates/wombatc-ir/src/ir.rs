//! The three-address intermediate representation.
//!
//! An instruction is `(op, optional destination, ordered operands)`. Each
//! function is a flat instruction list whose first instruction must be a
//! `label` carrying the function's own name.

use std::fmt;
use std::fmt::Write as _;
use std::path::PathBuf;

use wombatc_lex::{BinOpKind, LiteralKind, UnOpKind};
use wombatc_util::Symbol;

/// IR operation codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpCode {
    Label,
    Copy,
    Alloc,
    Assign,
    Load,
    Temp,
    Push,
    Pop,
    Call,
    Ret,
    Syscall,
    Add,
    Sub,
    Mul,
    Div,
    FlooredDiv,
    Mod,
    And,
    Or,
    BitXor,
    BitAnd,
    BitOr,
    Shl,
    Shr,
    Eq,
    Lt,
    Le,
    NotEq,
    Ge,
    Gt,
    Neg,
    Not,
    BitNot,
    Jmp,
    JmpFalse,
    Nop,
}

impl OpCode {
    pub fn as_str(self) -> &'static str {
        match self {
            OpCode::Label => "label",
            OpCode::Copy => "copy",
            OpCode::Alloc => "alloc",
            OpCode::Assign => "assign",
            OpCode::Load => "load",
            OpCode::Temp => "temp",
            OpCode::Push => "push",
            OpCode::Pop => "pop",
            OpCode::Call => "call",
            OpCode::Ret => "ret",
            OpCode::Syscall => "syscall",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::FlooredDiv => "floored_div",
            OpCode::Mod => "mod",
            OpCode::And => "and",
            OpCode::Or => "or",
            OpCode::BitXor => "bit_xor",
            OpCode::BitAnd => "bit_and",
            OpCode::BitOr => "bit_or",
            OpCode::Shl => "shl",
            OpCode::Shr => "shr",
            OpCode::Eq => "eq",
            OpCode::Lt => "lt",
            OpCode::Le => "le",
            OpCode::NotEq => "neq",
            OpCode::Ge => "ge",
            OpCode::Gt => "gt",
            OpCode::Neg => "neg",
            OpCode::Not => "not",
            OpCode::BitNot => "bit_not",
            OpCode::Jmp => "jmp",
            OpCode::JmpFalse => "jmp_false",
            OpCode::Nop => "nop",
        }
    }

    /// The opcode matching a binary operator. `**` has no three-address
    /// opcode and stays unsupported in lowering.
    pub fn from_bin_op(op: BinOpKind) -> Option<OpCode> {
        Some(match op {
            BinOpKind::Add => OpCode::Add,
            BinOpKind::Sub => OpCode::Sub,
            BinOpKind::Mul => OpCode::Mul,
            BinOpKind::Pow => return None,
            BinOpKind::Div => OpCode::Div,
            BinOpKind::FlooredDiv => OpCode::FlooredDiv,
            BinOpKind::Mod => OpCode::Mod,
            BinOpKind::And => OpCode::And,
            BinOpKind::Or => OpCode::Or,
            BinOpKind::BitXor => OpCode::BitXor,
            BinOpKind::BitAnd => OpCode::BitAnd,
            BinOpKind::BitOr => OpCode::BitOr,
            BinOpKind::Shl => OpCode::Shl,
            BinOpKind::Shr => OpCode::Shr,
            BinOpKind::Eq => OpCode::Eq,
            BinOpKind::Lt => OpCode::Lt,
            BinOpKind::Le => OpCode::Le,
            BinOpKind::NotEq => OpCode::NotEq,
            BinOpKind::Ge => OpCode::Ge,
            BinOpKind::Gt => OpCode::Gt,
        })
    }

    pub fn from_un_op(op: UnOpKind) -> OpCode {
        match op {
            UnOpKind::Neg => OpCode::Neg,
            UnOpKind::Not => OpCode::Not,
            UnOpKind::BitNot => OpCode::BitNot,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An instruction operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// A literal, quoting its source lexeme.
    Lit { lexeme: String, kind: LiteralKind },
    /// A named variable.
    Sym(Symbol),
    /// A temporary, numbered monotonically per program.
    Temp(usize),
}

impl Operand {
    pub fn int_lit(value: usize) -> Operand {
        Operand::Lit {
            lexeme: value.to_string(),
            kind: LiteralKind::Int,
        }
    }

    pub fn label(name: &str) -> Operand {
        Operand::Lit {
            lexeme: name.to_owned(),
            kind: LiteralKind::Str,
        }
    }

    pub fn is_lit(&self) -> bool {
        matches!(self, Operand::Lit { .. })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Lit { lexeme, .. } => f.write_str(lexeme),
            Operand::Sym(name) => write!(f, "{name}"),
            Operand::Temp(id) => write!(f, "%t{id}"),
        }
    }
}

/// One three-address instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub op: OpCode,
    pub dst: Option<Symbol>,
    pub ops: Vec<Operand>,
}

impl Instruction {
    pub fn new(op: OpCode, dst: Option<Symbol>, ops: Vec<Operand>) -> Self {
        Self { op, dst, ops }
    }

    pub fn match_code(&self, op: OpCode) -> bool {
        self.op == op
    }
}

/// One lowered function: a label-led instruction list plus the stack space
/// its locals and temporaries occupy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrFunction {
    pub name: Symbol,
    pub insts: Vec<Instruction>,
    /// Bytes of locals, parameters, and temporaries; codegen aligns this
    /// to 16 before reserving the frame.
    pub stack_space: usize,
}

impl IrFunction {
    pub fn new(name: Symbol) -> Self {
        Self {
            name,
            insts: Vec::new(),
            stack_space: 0,
        }
    }

    pub fn push_inst(&mut self, inst: Instruction) {
        self.insts.push(inst);
    }

    /// Whether `inst` is the label opening this function.
    pub fn is_fn_label(&self, inst: &Instruction) -> bool {
        inst.match_code(OpCode::Label) && inst.dst == Some(self.name)
    }

    /// Renders the function as text, one instruction per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for inst in &self.insts {
            let line = self.dump_inst(inst);
            if self.is_fn_label(inst) {
                let _ = writeln!(out, "{line}");
            } else {
                let _ = writeln!(out, "\t{line}");
            }
        }
        out
    }

    fn dump_inst(&self, inst: &Instruction) -> String {
        let dst = |i: &Instruction| {
            i.dst.map(|d| d.to_string()).unwrap_or_default()
        };
        let ops = |i: &Instruction| {
            i.ops
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        match inst.op {
            OpCode::Label => {
                if self.is_fn_label(inst) {
                    format!("@{}:", dst(inst))
                } else {
                    format!("{}:", dst(inst))
                }
            }
            OpCode::Add
            | OpCode::Sub
            | OpCode::Mul
            | OpCode::Div
            | OpCode::FlooredDiv
            | OpCode::Mod
            | OpCode::And
            | OpCode::Or
            | OpCode::BitXor
            | OpCode::BitAnd
            | OpCode::BitOr
            | OpCode::Shl
            | OpCode::Shr
            | OpCode::Eq
            | OpCode::Lt
            | OpCode::Le
            | OpCode::NotEq
            | OpCode::Ge
            | OpCode::Gt
            | OpCode::Neg
            | OpCode::Not
            | OpCode::BitNot
            | OpCode::Load => {
                format!("{} = {}: {}", dst(inst), inst.op, ops(inst))
            }
            OpCode::Call => match inst.dst {
                Some(d) => format!("{d} = call {}", ops(inst)),
                None => format!("call {}", ops(inst)),
            },
            OpCode::Nop => "nop".to_owned(),
            OpCode::Push => format!("push {}", ops(inst)),
            OpCode::Jmp => format!("jmp {}", ops(inst)),
            _ => {
                if inst.dst.is_some() {
                    format!("{} {}, {}", inst.op, dst(inst), ops(inst))
                } else {
                    format!("{} {}", inst.op, ops(inst))
                }
            }
        }
    }
}

/// A lowered program: the functions plus the origin source path.
#[derive(Clone, Debug, Default)]
pub struct IrProgram {
    pub src: PathBuf,
    pub functions: Vec<IrFunction>,
}

impl IrProgram {
    pub fn new(src: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            functions: Vec::new(),
        }
    }

    /// Renders the whole program as text.
    pub fn dump(&self) -> String {
        self.functions.iter().map(IrFunction::dump).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_names() {
        assert_eq!(OpCode::FlooredDiv.as_str(), "floored_div");
        assert_eq!(OpCode::NotEq.as_str(), "neq");
        assert_eq!(OpCode::JmpFalse.as_str(), "jmp_false");
    }

    #[test]
    fn test_bin_op_mapping() {
        assert_eq!(OpCode::from_bin_op(BinOpKind::Add), Some(OpCode::Add));
        assert_eq!(
            OpCode::from_bin_op(BinOpKind::FlooredDiv),
            Some(OpCode::FlooredDiv)
        );
        assert_eq!(OpCode::from_bin_op(BinOpKind::NotEq), Some(OpCode::NotEq));
        assert_eq!(OpCode::from_bin_op(BinOpKind::Pow), None);
        assert_eq!(OpCode::from_un_op(UnOpKind::BitNot), OpCode::BitNot);
    }

    #[test]
    fn test_operand_display() {
        assert_eq!(Operand::int_lit(42).to_string(), "42");
        assert_eq!(Operand::Temp(3).to_string(), "%t3");
        assert_eq!(Operand::Sym(Symbol::intern("x")).to_string(), "x");
    }

    #[test]
    fn test_function_dump() {
        let name = Symbol::intern("main");
        let mut func = IrFunction::new(name);
        func.push_inst(Instruction::new(OpCode::Label, Some(name), vec![]));
        func.push_inst(Instruction::new(
            OpCode::Add,
            Some(Symbol::intern("%t0")),
            vec![Operand::int_lit(1), Operand::int_lit(2)],
        ));
        func.push_inst(Instruction::new(
            OpCode::Ret,
            None,
            vec![Operand::Temp(0), Operand::label("main")],
        ));

        let dump = func.dump();
        assert!(dump.starts_with("@main:\n"));
        assert!(dump.contains("\t%t0 = add: 1, 2"));
        assert!(dump.contains("\tret %t0, main"));
    }
}
