//! C source code parser
//!
//! This module transforms snippet source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: The [`Parser`](parse::Parser) and its error type
//! - [`ast`]: AST node and type definitions
//!
//! # Supported C Subset
//!
//! - Types: `int`, `char`, `void`, structs, pointers, arrays, function pointers
//! - `typedef` at file scope, including anonymous structs and function-pointer aliases
//! - Statements: declarations, control flow (`if`, `while`, `do`, `for`, `switch`)
//! - Expressions: arithmetic, logical, bitwise, ternary, calls, casts, `sizeof`
//! - Brace initializers for arrays and structs
//! - No preprocessor (directive lines are skipped), unions, enums or `goto`
//!
//! Hand-written recursive descent parser; no parser generator dependencies.

pub mod ast;
pub mod lexer;
pub mod parse;

mod declarations;
mod expressions;
mod statements;
