//! Snippet interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: The [`Interpreter`](engine::Interpreter), calls, scopes, loads and stores
//! - [`errors`]: Runtime error types
//! - [`output`]: The capture buffer that stands in for stdout
//! - [`constants`]: Address-space layout and resource ceilings
//!
//! # Execution Model
//!
//! The interpreter walks the AST directly. Globals are zero-initialized and
//! their initializers run in order, then `main` is called. A run ends when
//! `main` returns, when `exit()` is called, or at the first runtime error.
//!
//! # Built-in Functions
//!
//! Built-in functions (`printf`, `malloc`, `free`, ...) are implemented in
//! `builtins.rs` rather than as C source.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod output;

mod builtins;
mod expressions;
mod loops;
mod ops;
mod statements;
mod type_system;

pub use engine::Interpreter;
pub use errors::RuntimeError;
pub use output::CaptureBuffer;
