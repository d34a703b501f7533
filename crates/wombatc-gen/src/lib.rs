//! wombatc-gen - x86-64 Code Generator
//!
//! Turns an [`IrProgram`] into NASM source for x86-64 Linux (ELF64,
//! System V AMD64 ABI). The emitted module opens with `global _start`,
//! declares the builtin externs, and gives every compiled function one
//! labeled block between a `push rbp` prologue and a `.end_<name>` epilogue.
//!
//! The generator owns the per-function stack frame allocator
//! ([`stack_frame`]) and the bookkeeping for the six-register argument
//! window ([`abi`]). Unexpected IR shapes are programmer errors and surface
//! as [`CodeGenError`] values; IR produced by a correct pipeline never
//! triggers them.
//!
//! [`IrProgram`]: wombatc_ir::IrProgram

#[cfg(feature = "float-codegen")]
compile_error!(
    "float-codegen is reserved: floating-point emission is not implemented yet"
);

pub mod abi;
pub mod codegen;
pub mod error;
pub mod stack_frame;

pub use abi::{Register, SystemVAbi};
pub use codegen::{assemble, CodeGen};
pub use error::CodeGenError;
pub use stack_frame::{AllocRegion, FrameStack, SlotInfo, StackFrame};
