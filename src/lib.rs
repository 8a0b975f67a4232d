//! # Introduction
//!
//! C Mastery Playground shows a fixed catalog of short C programs, each
//! illustrating one language concept, and runs any of them in-process on
//! request. Output is captured and shown beneath the snippet through a
//! terminal UI built with [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Catalog entry → dedent → Lexer → Parser → AST → Interpreter → CaptureBuffer → "<br>" markup → TUI
//! ```
//!
//! 1. [`catalog`]: the ordered `(title, source)` entries.
//! 2. [`runner`]: normalizes a snippet, runs it in a fresh interpreter and
//!    turns the result into display text. Never fails; errors become text.
//! 3. [`parser`]: tokenises the source and builds an AST.
//! 4. [`interpreter`]: walks the AST; all output goes to an explicit
//!    [`interpreter::CaptureBuffer`].
//! 5. [`memory`]: tagged [`memory::value::Value`] cells in checked blocks,
//!    so pointer misuse is an error instead of undefined behaviour.
//! 6. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Supported C subset
//!
//! Types: `int`, `char`, `void`, structs, pointers, fixed-size arrays,
//! function pointers and `typedef`s.
//! Control flow: `if/else`, `while`, `for`, `do-while`, `switch/case`,
//! `break`, `continue`, `return`.
//! Built-ins: `printf`, `puts`, `putchar`, `malloc`, `calloc`, `free`,
//! `strlen`, `strcpy`, `strcmp`, `abs`, `assert`, `exit`, `sizeof`.

pub mod catalog;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod runner;
pub mod ui;
