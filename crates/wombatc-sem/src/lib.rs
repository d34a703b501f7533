//! wombatc-sem - Semantic Analyzer
//!
//! Decorates the AST in place: after a successful pass every reachable
//! expression node carries a type. The pass owns a scoped symbol table,
//! pre-registers the linker-provided builtins and all top-level functions
//! (so mutually-recursive calls resolve), then checks each function body.
//!
//! Semantic errors are fatal; the pipeline stops before IR lowering.

pub mod analysis;
pub mod builtins;
pub mod scope;

pub use analysis::{SemaError, SemanticAnalyzer};
pub use builtins::{builtin_headers, Builtin, BUILTINS};
pub use scope::{Scope, SymbolInfo, SymbolTable};
