//! wombatc-ir - Three-Address Intermediate Representation
//!
//! Sits between the decorated AST and the code generator. Lowering flattens
//! expressions into temporaries and control flow into labels and jumps; the
//! result is a flat, per-function instruction list the emitter can walk in
//! one pass.
//!
//! The textual dump (`IrProgram::dump`) is the debugging surface: the driver
//! prints it at debug verbosity and tests assert against it.

pub mod ir;
pub mod lower;

pub use ir::{Instruction, IrFunction, IrProgram, OpCode, Operand};
pub use lower::{lower_program, LowerError};
