//! NASM text emission for x86-64 Linux.
//!
//! The generator walks the IR one instruction at a time. There is no
//! general-purpose register allocator: `rax`/`rbx`/`rcx`/`rdx` are scratch
//! within a single instruction, temporaries live in frame slots, and the
//! only tracked register state is the six-slot argument window.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;
use wombatc_ir::{Instruction, IrFunction, IrProgram, OpCode, Operand};
use wombatc_lex::LiteralKind;
use wombatc_sem::BUILTINS;
use wombatc_util::Symbol;

use crate::abi::{mem_ident_from_size, Register, SystemVAbi};
use crate::error::{CodeGenError, Result};
use crate::stack_frame::FrameStack;

/// Bytes a temporary occupies.
const TEMP_SIZE: usize = 8;

/// Convenience entry point: emits a full program.
pub fn assemble(program: &IrProgram) -> Result<String> {
    CodeGen::new().assemble(program)
}

/// The x86-64 emitter.
pub struct CodeGen {
    frames: FrameStack,
    /// Occupancy of the argument-passing window.
    registers: FxHashMap<Register, bool>,
    /// Index of the next incoming parameter; reset per function.
    argument_position: usize,
    /// Indentation depth of emitted lines.
    depth: usize,
    /// Counter for emitter-local fixup labels.
    fixup_counter: usize,
    out: String,
}

impl CodeGen {
    pub fn new() -> Self {
        Self {
            frames: FrameStack::new(),
            registers: FxHashMap::default(),
            argument_position: 0,
            depth: 0,
            fixup_counter: 0,
            out: String::new(),
        }
    }

    /// Emits the whole program as NASM text.
    pub fn assemble(&mut self, program: &IrProgram) -> Result<String> {
        self.out.clear();
        self.depth = 0;
        self.fixup_counter = 0;
        self.registers.clear();

        self.emit_header();
        self.emit_data_section();
        self.emit_text_section(program)?;
        Ok(std::mem::take(&mut self.out))
    }

    fn emit_header(&mut self) {
        self.appendln("global _start");
        for builtin in &BUILTINS {
            self.appendln(&format!("extern {}", builtin.name));
        }
        self.appendln("");
    }

    fn emit_data_section(&mut self) {
        self.appendln("section .data");
        self.appendln("");
    }

    fn emit_text_section(&mut self, program: &IrProgram) -> Result<()> {
        self.appendln("section .text");
        self.appendln("_start:");
        self.indent();
        self.appendln("call main");
        self.appendln("mov rax, 60 ; syscall: exit");
        self.appendln("mov rdi, 0 ; exit code 0");
        self.appendln("syscall");
        self.dedent();
        self.appendln("");

        for func in &program.functions {
            self.emit_function(func)?;
            self.argument_position = 0;
        }
        Ok(())
    }

    fn emit_function(&mut self, func: &IrFunction) -> Result<()> {
        let opens_itself = func
            .insts
            .first()
            .is_some_and(|inst| func.is_fn_label(inst));
        if !opens_itself {
            return Err(CodeGenError::Internal(format!(
                "function '{}' does not begin with its own label",
                func.name
            )));
        }

        self.frames.enter_fn(func.name);

        self.appendln(&format!("{}:", func.name));
        self.indent();
        self.appendln("push rbp");
        self.appendln("mov rbp, rsp");

        let aligned = align_to(func.stack_space, 16);
        if aligned > 0 {
            self.appendln(&format!("sub rsp, {aligned}"));
        }
        self.appendln("");

        for inst in &func.insts[1..] {
            self.emit_instruction(inst)?;
        }

        self.dedent();
        self.appendln("");
        self.appendln(&format!(".end_{}:", func.name));
        self.indent();
        self.appendln("mov rsp, rbp");
        self.appendln("pop rbp");
        self.appendln("ret");
        self.dedent();
        self.appendln("");

        self.frames.exit_fn()
    }

    fn emit_instruction(&mut self, inst: &Instruction) -> Result<()> {
        match inst.op {
            OpCode::Label => {
                let label = dst_of(inst)?;
                self.dedent();
                self.appendln(&format!("{label}:"));
                self.indent();
                Ok(())
            }
            OpCode::Alloc => self.emit_alloc(inst),
            OpCode::Assign | OpCode::Copy => self.emit_assign(inst),
            OpCode::Push => self.emit_push(inst),
            OpCode::Pop => self.emit_pop(inst),
            OpCode::Call => self.emit_call(inst),
            OpCode::Ret => self.emit_ret(inst),
            OpCode::Load => self.emit_load(inst),
            OpCode::Add
            | OpCode::Sub
            | OpCode::Mul
            | OpCode::Div
            | OpCode::FlooredDiv
            | OpCode::Mod
            | OpCode::BitAnd
            | OpCode::BitOr
            | OpCode::BitXor => self.emit_arith(inst),
            OpCode::Shl | OpCode::Shr => self.emit_shift(inst),
            OpCode::Eq | OpCode::NotEq | OpCode::Lt | OpCode::Le | OpCode::Gt | OpCode::Ge => {
                self.emit_cmp(inst)
            }
            OpCode::And | OpCode::Or => self.emit_logical_binary(inst),
            OpCode::Not => self.emit_logical_not(inst),
            OpCode::Neg | OpCode::BitNot => self.emit_unary(inst),
            OpCode::Jmp => {
                let target = operand_at(inst, 0)?;
                self.appendln(&format!("jmp {target}"));
                Ok(())
            }
            OpCode::JmpFalse => {
                let cond = operand_at(inst, 0)?.clone();
                let target = operand_at(inst, 1)?.clone();
                self.load_operand(&cond, Register::Rax)?;
                self.appendln("cmp rax, 0");
                self.appendln(&format!("je {target}"));
                Ok(())
            }
            OpCode::Nop => Ok(()),
            // A correct pipeline never emits these.
            OpCode::Temp | OpCode::Syscall => Err(CodeGenError::Internal(format!(
                "unhandled instruction '{}'",
                inst.op
            ))),
        }
    }

    fn emit_alloc(&mut self, inst: &Instruction) -> Result<()> {
        let name = dst_of(inst)?;
        let size = lit_usize(operand_at(inst, 0)?)?;
        self.frames.current()?.alloc(name, size)?;
        self.appendln(&format!("; '{name}' allocation of {size} bytes"));
        Ok(())
    }

    fn emit_assign(&mut self, inst: &Instruction) -> Result<()> {
        let name = dst_of(inst)?;
        let value = operand_at(inst, 0)?.clone();
        let offset = self.frames.current_ref()?.offset_of(name)?;
        let size = self.frames.current_ref()?.size_of(name)?;

        // String literals fill a char-array slot byte by byte.
        if let Operand::Lit {
            lexeme,
            kind: LiteralKind::Str,
        } = &value
        {
            for (index, byte) in decode_string_literal(lexeme).iter().enumerate() {
                self.appendln(&format!("mov byte [rbp - {}], {byte}", offset - index));
            }
            return Ok(());
        }

        self.load_operand(&value, Register::Rax)?;
        let keyword = mem_ident_from_size(size)?;
        let src = Register::Rax.sized_name(size)?;
        self.appendln(&format!("mov {keyword} [rbp - {offset}], {src}"));
        Ok(())
    }

    fn emit_push(&mut self, inst: &Instruction) -> Result<()> {
        let value = operand_at(inst, 0)?.clone();
        match self.take_argument_register() {
            Some(register) => self.load_operand(&value, register),
            None => {
                // Window exhausted; the argument travels on the stack.
                self.load_operand(&value, Register::Rax)?;
                self.appendln("push rax");
                self.frames.current()?.extra_arguments += 1;
                Ok(())
            }
        }
    }

    fn emit_pop(&mut self, inst: &Instruction) -> Result<()> {
        let name = dst_of(inst)?;
        let size = lit_usize(operand_at(inst, 0)?)?;

        self.frames.current()?.alloc(name, size)?;
        let offset = self.frames.current_ref()?.offset_of(name)?;

        match SystemVAbi::arg_register(self.argument_position) {
            Some(register) => {
                let keyword = mem_ident_from_size(size)?;
                let src = register.sized_name(size)?;
                self.appendln(&format!("mov {keyword} [rbp - {offset}], {src}"));
            }
            None => {
                let stack_offset = SystemVAbi::stack_arg_offset(self.argument_position);
                self.appendln(&format!("mov rax, [rbp + {stack_offset}]"));
                let keyword = mem_ident_from_size(size)?;
                let src = Register::Rax.sized_name(size)?;
                self.appendln(&format!("mov {keyword} [rbp - {offset}], {src}"));
            }
        }
        self.argument_position += 1;
        Ok(())
    }

    fn emit_call(&mut self, inst: &Instruction) -> Result<()> {
        self.frames.align_current()?;

        let callee = operand_at(inst, 0)?.clone();
        let argc = lit_usize(operand_at(inst, 1)?)?;

        self.appendln(&format!("call {callee}"));

        if let Some(dst) = inst.dst {
            self.frames.current()?.alloc(dst, TEMP_SIZE)?;
            let offset = self.frames.current_ref()?.offset_of(dst)?;
            self.appendln(&format!("mov qword [rbp - {offset}], rax"));
        }

        self.release_argument_registers(argc);

        let cleanup = {
            let frame = self.frames.current()?;
            let extra = frame.extra_arguments;
            frame.extra_arguments = 0;
            extra * 8
        };
        if cleanup > 0 {
            self.appendln(&format!("add rsp, {cleanup}"));
        }
        Ok(())
    }

    fn emit_ret(&mut self, inst: &Instruction) -> Result<()> {
        let label = inst
            .ops
            .last()
            .ok_or(CodeGenError::BadOperands { op: "ret" })?
            .clone();
        if inst.ops.len() == 2 {
            let value = operand_at(inst, 0)?.clone();
            self.load_operand(&value, Register::Rax)?;
        }
        self.appendln(&format!("jmp .end_{label}"));
        Ok(())
    }

    fn emit_load(&mut self, inst: &Instruction) -> Result<()> {
        let dst = dst_of(inst)?;
        let array = match operand_at(inst, 0)? {
            Operand::Sym(name) => *name,
            _ => return Err(CodeGenError::BadOperands { op: "load" }),
        };
        let index = operand_at(inst, 1)?.clone();
        let elem_size = lit_usize(operand_at(inst, 2)?)?;

        self.frames.current()?.alloc(dst, TEMP_SIZE)?;
        let base = self.frames.current_ref()?.offset_of(array)?;

        self.load_operand(&index, Register::Rbx)?;
        match elem_size {
            8 => self.appendln(&format!("mov rax, qword [rbp - {base} + rbx*8]")),
            4 => self.appendln(&format!("mov eax, dword [rbp - {base} + rbx*4]")),
            2 => self.appendln(&format!("movzx rax, word [rbp - {base} + rbx*2]")),
            1 => self.appendln(&format!("movzx rax, byte [rbp - {base} + rbx*1]")),
            other => return Err(CodeGenError::InvalidSlotSize(other)),
        }
        self.store_rax_to(dst)?;
        Ok(())
    }

    fn emit_arith(&mut self, inst: &Instruction) -> Result<()> {
        let dst = dst_of(inst)?;
        self.frames.current()?.alloc(dst, TEMP_SIZE)?;

        let lhs = operand_at(inst, 0)?.clone();
        let rhs = operand_at(inst, 1)?.clone();
        self.load_operand(&lhs, Register::Rax)?;
        self.load_operand(&rhs, Register::Rbx)?;

        let mut result_in_rdx = false;
        match inst.op {
            OpCode::Add => self.appendln("add rax, rbx"),
            OpCode::Sub => self.appendln("sub rax, rbx"),
            OpCode::Mul => {
                self.appendln("xor rdx, rdx");
                self.appendln("imul rbx");
            }
            OpCode::Div => {
                self.appendln("cqo");
                self.appendln("idiv rbx");
            }
            OpCode::Mod => {
                self.appendln("cqo");
                self.appendln("idiv rbx");
                result_in_rdx = true;
            }
            OpCode::FlooredDiv => {
                // Truncated quotient, then a correction toward negative
                // infinity when the remainder is non-zero and the signs of
                // the operands differ.
                let fixup = self.fixup_counter;
                self.fixup_counter += 1;
                self.appendln("cqo");
                self.appendln("idiv rbx");
                self.appendln("test rdx, rdx");
                self.appendln(&format!("jz .fdiv{fixup}_done"));
                self.appendln("xor rdx, rbx");
                self.appendln(&format!("jns .fdiv{fixup}_done"));
                self.appendln("dec rax");
                self.appendln(&format!(".fdiv{fixup}_done:"));
            }
            OpCode::BitAnd => self.appendln("and rax, rbx"),
            OpCode::BitOr => self.appendln("or rax, rbx"),
            OpCode::BitXor => self.appendln("xor rax, rbx"),
            _ => return Err(CodeGenError::BadOperands { op: "arith" }),
        }

        if result_in_rdx {
            let offset = self.frames.current_ref()?.offset_of(dst)?;
            self.appendln(&format!("mov qword [rbp - {offset}], rdx"));
        } else {
            self.store_rax_to(dst)?;
        }
        self.appendln("");
        Ok(())
    }

    fn emit_shift(&mut self, inst: &Instruction) -> Result<()> {
        let dst = dst_of(inst)?;
        self.frames.current()?.alloc(dst, TEMP_SIZE)?;

        let lhs = operand_at(inst, 0)?.clone();
        let rhs = operand_at(inst, 1)?.clone();
        self.load_operand(&lhs, Register::Rax)?;
        self.load_operand(&rhs, Register::Rcx)?;

        match inst.op {
            OpCode::Shl => self.appendln("shl rax, cl"),
            // Arithmetic right shift keeps the sign of negative values.
            OpCode::Shr => self.appendln("sar rax, cl"),
            _ => return Err(CodeGenError::BadOperands { op: "shift" }),
        }
        self.store_rax_to(dst)?;
        self.appendln("");
        Ok(())
    }

    fn emit_cmp(&mut self, inst: &Instruction) -> Result<()> {
        let dst = dst_of(inst)?;
        self.frames.current()?.alloc(dst, TEMP_SIZE)?;

        let lhs = operand_at(inst, 0)?.clone();
        let rhs = operand_at(inst, 1)?.clone();
        self.load_operand(&lhs, Register::Rax)?;
        self.load_operand(&rhs, Register::Rbx)?;

        let set = match inst.op {
            OpCode::Eq => "sete",
            OpCode::NotEq => "setne",
            OpCode::Lt => "setl",
            OpCode::Le => "setle",
            OpCode::Gt => "setg",
            OpCode::Ge => "setge",
            _ => return Err(CodeGenError::BadOperands { op: "cmp" }),
        };

        self.appendln("cmp rax, rbx");
        self.appendln(&format!("{set} al"));
        self.appendln("movzx rax, al");
        self.store_rax_to(dst)?;
        self.appendln("");
        Ok(())
    }

    fn emit_logical_binary(&mut self, inst: &Instruction) -> Result<()> {
        let dst = dst_of(inst)?;
        self.frames.current()?.alloc(dst, TEMP_SIZE)?;

        let lhs = operand_at(inst, 0)?.clone();
        let rhs = operand_at(inst, 1)?.clone();
        self.load_operand(&lhs, Register::Rax)?;
        self.load_operand(&rhs, Register::Rbx)?;

        let op = match inst.op {
            OpCode::And => "and",
            OpCode::Or => "or",
            _ => return Err(CodeGenError::BadOperands { op: "logical" }),
        };

        // Normalize both sides to 0/1 before combining.
        self.appendln("cmp rax, 0");
        self.appendln("setne al");
        self.appendln("movzx rax, al");
        self.appendln("cmp rbx, 0");
        self.appendln("setne bl");
        self.appendln("movzx rbx, bl");
        self.appendln(&format!("{op} rax, rbx"));
        self.store_rax_to(dst)?;
        self.appendln("");
        Ok(())
    }

    fn emit_logical_not(&mut self, inst: &Instruction) -> Result<()> {
        let dst = dst_of(inst)?;
        self.frames.current()?.alloc(dst, TEMP_SIZE)?;

        let value = operand_at(inst, 0)?.clone();
        self.load_operand(&value, Register::Rax)?;
        self.appendln("cmp rax, 0");
        self.appendln("sete al");
        self.appendln("movzx rax, al");
        self.store_rax_to(dst)?;
        self.appendln("");
        Ok(())
    }

    fn emit_unary(&mut self, inst: &Instruction) -> Result<()> {
        let dst = dst_of(inst)?;
        self.frames.current()?.alloc(dst, TEMP_SIZE)?;

        let value = operand_at(inst, 0)?.clone();
        self.load_operand(&value, Register::Rax)?;
        match inst.op {
            OpCode::Neg => self.appendln("neg rax"),
            OpCode::BitNot => self.appendln("not rax"),
            _ => return Err(CodeGenError::BadOperands { op: "unary" }),
        }
        self.store_rax_to(dst)?;
        self.appendln("");
        Ok(())
    }

    /// Loads an operand into a register with a size-appropriate move.
    fn load_operand(&mut self, operand: &Operand, register: Register) -> Result<()> {
        match operand {
            Operand::Lit { lexeme, kind } => {
                let value = match kind {
                    LiteralKind::Int => lexeme.clone(),
                    LiteralKind::Bool => {
                        if lexeme == "true" { "1" } else { "0" }.to_owned()
                    }
                    LiteralKind::Char => {
                        let byte = lexeme.chars().next().map(|c| c as u32).unwrap_or(0);
                        byte.to_string()
                    }
                    LiteralKind::Float => return Err(CodeGenError::FloatUnsupported),
                    LiteralKind::Str => {
                        return Err(CodeGenError::Internal(
                            "string literal cannot be loaded into a register".into(),
                        ))
                    }
                };
                self.appendln(&format!("mov {}, {value}", register.name()));
                Ok(())
            }
            Operand::Sym(_) | Operand::Temp(_) => {
                let name = operand_symbol(operand)?;
                let offset = self.frames.current_ref()?.offset_of(name)?;
                let size = self.frames.current_ref()?.size_of(name)?;
                match size {
                    8 => self.appendln(&format!(
                        "mov {}, qword [rbp - {offset}]",
                        register.name()
                    )),
                    4 => self.appendln(&format!(
                        "mov {}, dword [rbp - {offset}]",
                        register.sized_name(4)?
                    )),
                    2 => self.appendln(&format!(
                        "movzx {}, word [rbp - {offset}]",
                        register.name()
                    )),
                    1 => self.appendln(&format!(
                        "movzx {}, byte [rbp - {offset}]",
                        register.name()
                    )),
                    other => return Err(CodeGenError::InvalidSlotSize(other)),
                }
                Ok(())
            }
        }
    }

    /// Stores `rax` into a named slot with the right size keyword.
    fn store_rax_to(&mut self, name: Symbol) -> Result<()> {
        let offset = self.frames.current_ref()?.offset_of(name)?;
        let size = self.frames.current_ref()?.size_of(name)?;
        let keyword = mem_ident_from_size(size)?;
        let src = Register::Rax.sized_name(size)?;
        self.appendln(&format!("mov {keyword} [rbp - {offset}], {src}"));
        Ok(())
    }

    /// Claims the first free register of the argument window.
    fn take_argument_register(&mut self) -> Option<Register> {
        for register in SystemVAbi::ARG_REGS {
            if !self.registers.get(&register).copied().unwrap_or(false) {
                self.registers.insert(register, true);
                return Some(register);
            }
        }
        None
    }

    /// Releases the window registers a finished call occupied.
    fn release_argument_registers(&mut self, argc: usize) {
        for register in SystemVAbi::ARG_REGS.iter().take(argc) {
            self.registers.insert(*register, false);
        }
    }

    fn appendln(&mut self, line: &str) {
        if line.is_empty() {
            self.out.push('\n');
            return;
        }
        let _ = writeln!(self.out, "{}{line}", "    ".repeat(self.depth));
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

fn align_to(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

fn dst_of(inst: &Instruction) -> Result<Symbol> {
    inst.dst.ok_or(CodeGenError::BadOperands {
        op: inst.op.as_str(),
    })
}

fn operand_at(inst: &Instruction, index: usize) -> Result<&Operand> {
    inst.ops.get(index).ok_or(CodeGenError::BadOperands {
        op: inst.op.as_str(),
    })
}

fn operand_symbol(operand: &Operand) -> Result<Symbol> {
    match operand {
        Operand::Sym(name) => Ok(*name),
        Operand::Temp(id) => Ok(Symbol::intern(&format!("%t{id}"))),
        Operand::Lit { .. } => Err(CodeGenError::Internal(
            "literal operand has no frame slot".into(),
        )),
    }
}

fn lit_usize(operand: &Operand) -> Result<usize> {
    match operand {
        Operand::Lit { lexeme, .. } => lexeme
            .parse()
            .map_err(|_| CodeGenError::Internal(format!("malformed size literal '{lexeme}'"))),
        _ => Err(CodeGenError::Internal(
            "expected a literal operand".into(),
        )),
    }
}

/// Strips the quotes from a string-literal lexeme and decodes its escapes.
fn decode_string_literal(lexeme: &str) -> Vec<u8> {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => bytes.push(b'\n'),
                Some('\\') => bytes.push(b'\\'),
                Some('"') => bytes.push(b'"'),
                Some(other) => bytes.push(other as u8),
                None => {}
            }
        } else {
            bytes.push(c as u8);
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use wombatc_par::Parser;
    use wombatc_sem::SemanticAnalyzer;
    use wombatc_util::Handler;

    /// Full front-end pipeline: source to NASM text.
    fn compile(src: &str) -> String {
        let handler = Handler::new();
        let (stream, _) = wombatc_lex::lex_text("test.wo", src, &handler);
        assert!(!handler.has_criticals());
        let mut ast = Parser::new(stream).parse().expect("parse failed");
        SemanticAnalyzer::new()
            .analyze(&mut ast)
            .expect("semantic analysis failed");
        let ir = wombatc_ir::lower_program(&ast, Path::new("test.wo")).expect("lowering failed");
        assemble(&ir).expect("emission failed")
    }

    fn lines_of(asm: &str) -> Vec<String> {
        asm.lines().map(|l| l.trim().to_owned()).collect()
    }

    #[test]
    fn test_program_prologue() {
        let asm = compile("fn int main()\n  return 0;\nend");
        let lines = lines_of(&asm);

        assert_eq!(lines[0], "global _start");
        for builtin in ["putchar", "putnum", "quit", "assert"] {
            assert!(asm.contains(&format!("extern {builtin}")));
        }
        assert!(asm.contains("section .data"));
        assert!(asm.contains("section .text"));
        assert!(asm.contains("_start:"));
        assert!(asm.contains("call main"));
        assert!(asm.contains("mov rax, 60"));
        assert!(asm.contains("mov rdi, 0"));
        assert!(lines.contains(&"syscall".to_owned()));
    }

    #[test]
    fn test_function_prologue_and_epilogue() {
        let asm = compile("fn int main()\n  mut x: int = 1;\n  return x;\nend");
        assert!(asm.contains("main:\n    push rbp\n    mov rbp, rsp"));
        assert!(asm.contains(".end_main:\n    mov rsp, rbp\n    pop rbp\n    ret"));
    }

    #[test]
    fn test_frame_reservation_is_16_aligned() {
        // One 8-byte local rounds up to 16.
        let asm = compile("fn free main()\n  mut x: int = 1;\n  quit(0);\nend");
        assert!(asm.contains("sub rsp, 16"), "{asm}");
    }

    #[test]
    fn test_arithmetic_scenario() {
        // return 1 + 2 * 3 computes through rax/rbx with temp spills.
        let asm = compile("fn int main()\n  return 1 + 2 * 3;\nend");
        assert!(asm.contains("xor rdx, rdx\n    imul rbx"));
        assert!(asm.contains("add rax, rbx"));
        assert!(asm.contains("jmp .end_main"));
    }

    #[test]
    fn test_variable_assignment_scenario() {
        let asm = compile("fn int main()\n  mut x: int = 5;\n  x = x + 10;\n  return x;\nend");
        assert!(asm.contains("; 'x' allocation of 8 bytes"));
        assert!(asm.contains("mov rax, 5\n    mov qword [rbp - 8], rax"));
        assert!(asm.contains("add rax, rbx"));
    }

    #[test]
    fn test_division_uses_cqo() {
        let asm = compile("fn int main()\n  return 7 / 2;\nend");
        assert!(asm.contains("cqo\n    idiv rbx"));
    }

    #[test]
    fn test_modulo_stores_rdx() {
        let asm = compile("fn int main()\n  return 7 % 2;\nend");
        assert!(asm.contains("idiv rbx"));
        assert!(asm.contains("], rdx"));
    }

    #[test]
    fn test_floored_division_fixup() {
        let asm = compile("fn int main()\n  return 7 // 2;\nend");
        assert!(asm.contains("jz .fdiv0_done"));
        assert!(asm.contains("xor rdx, rbx"));
        assert!(asm.contains("jns .fdiv0_done"));
        assert!(asm.contains("dec rax"));
        assert!(asm.contains(".fdiv0_done:"));
    }

    #[test]
    fn test_comparison_lowering() {
        let asm = compile("fn free main()\n  mut b: bool = 1 < 2;\n  quit(0);\nend");
        assert!(asm.contains("cmp rax, rbx\n    setl al\n    movzx rax, al"));
    }

    #[test]
    fn test_logical_and_normalizes_operands() {
        let asm = compile("fn free main()\n  mut b: bool = true and false;\n  quit(0);\nend");
        assert!(asm.contains("setne al"));
        assert!(asm.contains("setne bl"));
        assert!(asm.contains("and rax, rbx"));
    }

    #[test]
    fn test_logical_not() {
        let asm = compile("fn free main()\n  mut b: bool = not true;\n  quit(0);\nend");
        assert!(asm.contains("cmp rax, 0\n    sete al\n    movzx rax, al"));
    }

    #[test]
    fn test_shift_uses_cl() {
        let asm = compile("fn int main()\n  return 8 >> 2;\nend");
        assert!(asm.contains("sar rax, cl"));
        let asm = compile("fn int main()\n  return 1 << 4;\nend");
        assert!(asm.contains("shl rax, cl"));
    }

    #[test]
    fn test_single_argument_goes_to_rdi() {
        let asm = compile("fn free main()\n  putnum(1);\n  quit(0);\nend");
        assert!(asm.contains("mov rdi, 1\n    call putnum"), "{asm}");
        // quit reclaims rdi after putnum's window is released.
        assert!(asm.contains("mov rdi, 0\n    call quit"));
    }

    #[test]
    fn test_six_arguments_fill_the_register_window() {
        let src = "\
fn int six(a: int, b: int, c: int, d: int, e: int, f: int)
  return a;
end
fn free main()
  let x: int = six(1, 2, 3, 4, 5, 6);
  quit(0);
end";
        let asm = compile(src);
        for (value, reg) in [(1, "rdi"), (2, "rsi"), (3, "rdx"), (4, "rcx"), (5, "r8"), (6, "r9")] {
            assert!(
                asm.contains(&format!("mov {reg}, {value}")),
                "arg {value} should ride {reg}: {asm}"
            );
        }
        assert!(!asm.contains("push rax"));
        assert!(!asm.contains("add rsp, 8\n"));
    }

    #[test]
    fn test_seventh_argument_spills_to_stack() {
        let src = "\
fn int seven(a: int, b: int, c: int, d: int, e: int, f: int, g: int)
  return g;
end
fn free main()
  let x: int = seven(1, 2, 3, 4, 5, 6, 7);
  quit(0);
end";
        let asm = compile(src);
        assert!(asm.contains("mov rax, 7\n    push rax"), "{asm}");
        assert!(asm.contains("add rsp, 8"), "stack cleanup expected: {asm}");
        // Callee reads the seventh parameter from beyond the frame.
        assert!(asm.contains("mov rax, [rbp + 16]"));
    }

    #[test]
    fn test_call_result_is_captured_from_rax() {
        let src = "\
fn int answer()
  return 42;
end
fn int main()
  return answer();
end";
        let asm = compile(src);
        assert!(asm.contains("call answer\n    mov qword [rbp - 8], rax"));
    }

    #[test]
    fn test_parameters_store_from_abi_registers() {
        let asm = compile("fn int add(a: int, b: int)\n  return a + b;\nend\nfn free main()\n  let r: int = add(1, 2);\n  quit(0);\nend");
        assert!(asm.contains("mov qword [rbp - 8], rdi"));
        assert!(asm.contains("mov qword [rbp - 16], rsi"));
    }

    #[test]
    fn test_char_parameter_uses_byte_store() {
        let asm = compile("fn free main()\n  putchar('a');\n  quit(0);\nend");
        // 'a' loads as its code point into the argument register.
        assert!(asm.contains("mov rdi, 97"));
    }

    #[test]
    fn test_bool_local_uses_byte_slot() {
        let asm = compile("fn free main()\n  mut b: bool = true;\n  quit(0);\nend");
        assert!(asm.contains("; 'b' allocation of 1 bytes"));
        assert!(asm.contains("mov byte [rbp - 1], al"));
    }

    #[test]
    fn test_string_literal_fills_array_bytewise() {
        let asm = compile("fn free main()\n  let s: [2]char = \"hi\";\n  quit(0);\nend");
        assert!(asm.contains(&format!("mov byte [rbp - 2], {}", b'h')), "{asm}");
        assert!(asm.contains(&format!("mov byte [rbp - 1], {}", b'i')));
    }

    #[test]
    fn test_subscription_uses_scaled_index() {
        let asm = compile(
            "fn int main()\n  let xs: [3]int;\n  return xs[1];\nend",
        );
        assert!(asm.contains("mov rbx, 1"));
        assert!(asm.contains("mov rax, qword [rbp - 24 + rbx*8]"), "{asm}");
    }

    #[test]
    fn test_if_else_branches() {
        let asm = compile(
            "fn free main()\n  if true { putnum(1); } else { putnum(2); }\n  quit(0);\nend",
        );
        assert!(asm.contains("cmp rax, 0\n    je .Lif0_else"));
        assert!(asm.contains("jmp .Lif0_end"));
        assert!(asm.contains(".Lif0_else:"));
        assert!(asm.contains(".Lif0_end:"));
    }

    #[test]
    fn test_loop_shape() {
        let asm = compile("fn free main()\n  loop { break; }\n  quit(0);\nend");
        assert!(asm.contains(".Lloop0_head:"));
        assert!(asm.contains("jmp .Lloop0_end"));
        assert!(asm.contains("jmp .Lloop0_head"));
        assert!(asm.contains(".Lloop0_end:"));
    }

    #[test]
    fn test_negation_and_bitnot() {
        let asm = compile("fn int main()\n  return -5;\nend");
        assert!(asm.contains("neg rax"));
        let asm = compile("fn int main()\n  return ~5;\nend");
        assert!(asm.contains("not rax"));
    }

    #[test]
    fn test_every_emitted_frame_is_16_byte_aligned() {
        let srcs = [
            "fn free main()\n  mut a: bool = true;\n  quit(0);\nend",
            "fn free main()\n  mut a: int = 1;\n  mut b: int = 2;\n  mut c: bool = false;\n  quit(0);\nend",
        ];
        for src in srcs {
            let asm = compile(src);
            for line in asm.lines() {
                if let Some(rest) = line.trim().strip_prefix("sub rsp, ") {
                    let bytes: usize = rest.parse().unwrap();
                    assert_eq!(bytes % 16, 0, "unaligned frame in: {src}");
                }
            }
        }
    }

    #[test]
    fn test_void_call_has_no_result_spill() {
        let asm = compile("fn free main()\n  quit(0);\nend");
        assert!(asm.contains("call quit\n"));
        assert!(!asm.contains("call quit\n    mov qword"));
    }
}
