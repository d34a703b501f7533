//! wombatc-drv - Compiler Driver
//!
//! Entry point and orchestrator for the whole pipeline:
//!
//! ```text
//! source path -> Lexer -> TokenStream -> Parser -> AST
//!             -> SemanticAnalyzer (in-place decoration)
//!             -> IR -> CodeGen -> .asm text -> nasm -> ld -> executable
//! ```
//!
//! The stages run strictly in order on the main thread; each consumes the
//! previous stage's output by move and halts the build on critical
//! diagnostics.

pub mod cli;
pub mod session;

pub use cli::{parse_args, BuildMode, CliRequest, Config, UsageError, Verbosity, USAGE, VERSION};
pub use session::Session;
