//! wombatc-util - Core Utilities and Foundation Types
//!
//! This crate provides the foundation types shared by every stage of the
//! Wombat compiler:
//!
//! - [`span`] - source locations, cited source regions, in-memory source files
//! - [`diagnostic`] - diagnostic data model, buffering handler, and renderer
//! - [`symbol`] - string interning for identifiers and labels
//!
//! The utilities here are deliberately free of compiler-phase logic so that
//! the dependency graph stays a straight line:
//! `util <- lex <- par <- sem <- ir <- gen <- drv`.

pub mod diagnostic;
pub mod span;
pub mod symbol;

pub use diagnostic::{ColorMode, Diagnostic, Handler, Label, Level, Renderer};
pub use span::{Location, Region, SourceFile};
pub use symbol::Symbol;
