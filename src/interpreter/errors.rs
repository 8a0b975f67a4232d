//! Runtime error types for the snippet interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to parse errors).
//!
//! All runtime errors are fatal: they halt execution, and the runner reports
//! the error's message in place of the program's output.

use crate::memory::arena::MemoryError;
use crate::memory::LayoutError;
use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Attempted to read an uninitialized variable or memory cell
    #[error("Read from uninitialized {what} at line {}", .location.line)]
    UninitializedRead { what: String, location: SourceLocation },

    #[error("Null pointer dereference at line {}", .location.line)]
    NullDereference { location: SourceLocation },

    #[error("Attempted to modify const {what} at line {}", .location.line)]
    ConstModification { what: String, location: SourceLocation },

    #[error("Integer overflow in operation: {operation} at line {}", .location.line)]
    IntegerOverflow { operation: String, location: SourceLocation },

    /// Division or modulo by zero
    #[error("Division by zero in '{operation}' at line {}", .location.line)]
    DivisionByZero { operation: String, location: SourceLocation },

    #[error("Undefined variable '{name}' at line {}", .location.line)]
    UndefinedVariable { name: String, location: SourceLocation },

    #[error("Undefined function '{name}' at line {}", .location.line)]
    UndefinedFunction { name: String, location: SourceLocation },

    #[error("Type error at line {}: expected {expected}, got {got}", .location.line)]
    TypeError {
        expected: String,
        got: String,
        location: SourceLocation,
    },

    #[error("Invalid printf format at line {}: {message}", .location.line)]
    InvalidPrintfFormat { message: String, location: SourceLocation },

    #[error("No main function found")]
    NoMainFunction,

    #[error("Function '{function}' expects {expected} argument(s), got {got} at line {}", .location.line)]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
        location: SourceLocation,
    },

    #[error("Struct '{struct_name}' has no field '{field_name}' at line {}", .location.line)]
    MissingStructField {
        struct_name: String,
        field_name: String,
        location: SourceLocation,
    },

    /// Unknown struct, self-containing struct, or a type without a size
    #[error("Invalid type at line {}: {source}", .location.line)]
    InvalidType {
        source: LayoutError,
        location: SourceLocation,
    },

    #[error("Unsupported operation at line {}: {message}", .location.line)]
    UnsupportedOperation { message: String, location: SourceLocation },

    /// Bad memory access, with the underlying memory fault
    #[error("Memory error at line {}: {source}", .location.line)]
    Memory {
        source: MemoryError,
        location: SourceLocation,
    },

    #[error("Stack overflow: call depth exceeded {limit} in '{function}' at line {}", .location.line)]
    StackOverflow {
        function: String,
        limit: usize,
        location: SourceLocation,
    },

    /// `assert` failed; `message` is the assertion text
    #[error("Assertion failed: {message} at line {}", .location.line)]
    AssertionFailed { message: String, location: SourceLocation },

    #[error("Duplicate definition of '{name}' at line {}", .location.line)]
    DuplicateDefinition { name: String, location: SourceLocation },

    #[error("Duplicate case value {value} at line {}", .location.line)]
    DuplicateCase { value: i32, location: SourceLocation },

    /// Raised by `exit()` to unwind the call stack; the run itself succeeded
    #[error("Program exited with status {code}")]
    Exit { code: i32 },
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::NoMainFunction | RuntimeError::Exit { .. } => None,
            RuntimeError::UninitializedRead { location, .. }
            | RuntimeError::NullDereference { location }
            | RuntimeError::ConstModification { location, .. }
            | RuntimeError::IntegerOverflow { location, .. }
            | RuntimeError::DivisionByZero { location, .. }
            | RuntimeError::UndefinedVariable { location, .. }
            | RuntimeError::UndefinedFunction { location, .. }
            | RuntimeError::TypeError { location, .. }
            | RuntimeError::InvalidPrintfFormat { location, .. }
            | RuntimeError::ArgumentCountMismatch { location, .. }
            | RuntimeError::MissingStructField { location, .. }
            | RuntimeError::DuplicateCase { location, .. }
            | RuntimeError::InvalidType { location, .. }
            | RuntimeError::UnsupportedOperation { location, .. }
            | RuntimeError::Memory { location, .. }
            | RuntimeError::StackOverflow { location, .. }
            | RuntimeError::AssertionFailed { location, .. }
            | RuntimeError::DuplicateDefinition { location, .. } => Some(location),
        }
    }

    pub(crate) fn type_error(
        expected: impl Into<String>,
        got: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        RuntimeError::TypeError {
            expected: expected.into(),
            got: got.into(),
            location,
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::UnsupportedOperation {
            message: message.into(),
            location,
        }
    }
}

/// Attach a source location to lower-level failures
pub(crate) trait AtLocation<T> {
    fn at(self, location: SourceLocation) -> Result<T, RuntimeError>;
}

impl<T> AtLocation<T> for Result<T, MemoryError> {
    fn at(self, location: SourceLocation) -> Result<T, RuntimeError> {
        self.map_err(|source| RuntimeError::Memory { source, location })
    }
}

impl<T> AtLocation<T> for Result<T, LayoutError> {
    fn at(self, location: SourceLocation) -> Result<T, RuntimeError> {
        self.map_err(|source| RuntimeError::InvalidType { source, location })
    }
}
