//! Error types for assembly emission.
//!
//! Most variants are safety nets for IR shapes a correct front-end cannot
//! produce; hitting one means a compiler bug, not a user error.

use thiserror::Error;

/// Error type for x86-64 code generation.
#[derive(Debug, Error)]
pub enum CodeGenError {
    /// A frame slot was allocated twice.
    #[error("cannot 'realloc', used on '{0}'")]
    DuplicateSlot(String),

    /// An operand referenced a name with no frame slot.
    #[error("variable not found in stack frame: {0}")]
    UnknownSlot(String),

    /// A slot size with no matching size keyword or sub-register.
    #[error("invalid operand size, {0}")]
    InvalidSlotSize(usize),

    /// An instruction was emitted outside any function.
    #[error("no active stack frame")]
    NoActiveFrame,

    /// Floating point values reached the emitter.
    #[error("float code generation is not implemented")]
    FloatUnsupported,

    /// An instruction arrived with the wrong operand shape.
    #[error("unexpected operands for '{op}' instruction")]
    BadOperands { op: &'static str },

    /// Catch-all for impossible states; indicates a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for emission.
pub type Result<T> = std::result::Result<T, CodeGenError>;
