//! System V AMD64 ABI: the register vocabulary of the emitter.

use crate::error::{CodeGenError, Result};

/// The registers the emitter touches. `rax`/`rbx`/`rcx`/`rdx` are scratch
/// and never held across instructions; the other six form the
/// argument-passing window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    Rax,
    Rbx,
    Rcx,
    Rdx,
    Rdi,
    Rsi,
    R8,
    R9,
}

impl Register {
    /// The 64-bit register name.
    pub fn name(self) -> &'static str {
        match self {
            Register::Rax => "rax",
            Register::Rbx => "rbx",
            Register::Rcx => "rcx",
            Register::Rdx => "rdx",
            Register::Rdi => "rdi",
            Register::Rsi => "rsi",
            Register::R8 => "r8",
            Register::R9 => "r9",
        }
    }

    /// The sub-register of the given byte width.
    pub fn sized_name(self, size: usize) -> Result<&'static str> {
        let names: [&'static str; 4] = match self {
            Register::Rax => ["rax", "eax", "ax", "al"],
            Register::Rbx => ["rbx", "ebx", "bx", "bl"],
            Register::Rcx => ["rcx", "ecx", "cx", "cl"],
            Register::Rdx => ["rdx", "edx", "dx", "dl"],
            Register::Rdi => ["rdi", "edi", "di", "dil"],
            Register::Rsi => ["rsi", "esi", "si", "sil"],
            Register::R8 => ["r8", "r8d", "r8w", "r8b"],
            Register::R9 => ["r9", "r9d", "r9w", "r9b"],
        };
        match size {
            8 => Ok(names[0]),
            4 => Ok(names[1]),
            2 => Ok(names[2]),
            1 => Ok(names[3]),
            other => Err(CodeGenError::InvalidSlotSize(other)),
        }
    }
}

/// System V AMD64 calling convention constants.
pub struct SystemVAbi;

impl SystemVAbi {
    /// Integer/pointer argument registers, in passing order.
    pub const ARG_REGS: [Register; 6] = [
        Register::Rdi,
        Register::Rsi,
        Register::Rdx,
        Register::Rcx,
        Register::R8,
        Register::R9,
    ];

    /// The register carrying argument `index`, or `None` past the window.
    pub fn arg_register(index: usize) -> Option<Register> {
        Self::ARG_REGS.get(index).copied()
    }

    /// `[rbp + offset]` of the stack-passed argument at `index` (0-based
    /// over all arguments), valid for `index >= 6`.
    pub fn stack_arg_offset(index: usize) -> usize {
        16 + 8 * (index - Self::ARG_REGS.len())
    }
}

/// The NASM size keyword for a slot width.
pub fn mem_ident_from_size(size: usize) -> Result<&'static str> {
    match size {
        8 => Ok("qword"),
        4 => Ok("dword"),
        2 => Ok("word"),
        1 => Ok("byte"),
        other => Err(CodeGenError::InvalidSlotSize(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_register_window() {
        assert_eq!(SystemVAbi::arg_register(0), Some(Register::Rdi));
        assert_eq!(SystemVAbi::arg_register(5), Some(Register::R9));
        assert_eq!(SystemVAbi::arg_register(6), None);
    }

    #[test]
    fn test_stack_argument_offsets() {
        assert_eq!(SystemVAbi::stack_arg_offset(6), 16);
        assert_eq!(SystemVAbi::stack_arg_offset(7), 24);
        assert_eq!(SystemVAbi::stack_arg_offset(9), 40);
    }

    #[test]
    fn test_sized_names() {
        assert_eq!(Register::Rdi.sized_name(8).unwrap(), "rdi");
        assert_eq!(Register::Rdi.sized_name(1).unwrap(), "dil");
        assert_eq!(Register::R8.sized_name(4).unwrap(), "r8d");
        assert_eq!(Register::Rax.sized_name(1).unwrap(), "al");
        assert!(Register::Rax.sized_name(3).is_err());
    }

    #[test]
    fn test_size_keywords() {
        assert_eq!(mem_ident_from_size(8).unwrap(), "qword");
        assert_eq!(mem_ident_from_size(1).unwrap(), "byte");
        assert!(mem_ident_from_size(5).is_err());
    }
}
