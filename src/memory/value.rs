//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all runtime values
//! in the interpreter. Unlike C's raw memory model, values are tagged: a cell
//! holding a pointer can never be misread as an integer.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 32-bit signed integer
//! - [`Value::Char`]: 8-bit signed character
//! - [`Value::Pointer`]: an [`Address`] inside a live or dead memory block
//! - [`Value::Null`]: the null pointer
//! - [`Value::Function`]: a function pointer, by function name
//! - [`Value::Aggregate`]: the raw cells of a struct passed or returned by value
//! - [`Value::Uninitialized`]: marker for cells never written

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Index of a memory block
pub type BlockId = usize;

/// A location in interpreter memory: a block plus a byte offset.
///
/// The offset is signed so pointer arithmetic may step outside the block;
/// only dereferencing such a pointer is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub block: BlockId,
    pub offset: i64,
}

impl Address {
    pub fn new(block: BlockId, offset: i64) -> Self {
        Self { block, offset }
    }

    pub fn offset_by(self, bytes: i64) -> Self {
        Self {
            block: self.block,
            offset: self.offset.saturating_add(bytes),
        }
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.block, self.offset).cmp(&(other.block, other.offset))
    }
}

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Int(i32),
    Char(i8),
    Pointer(Address),
    Null,
    Function(Rc<str>),
    Aggregate(Vec<Value>),
    #[default]
    Uninitialized,
}

impl Value {
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Value::Uninitialized)
    }

    /// Integer view of `int` and `char` values
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Char(c) => Some(*c as i32),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Pointer(addr) => Some(*addr),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Value::Pointer(_) | Value::Null | Value::Function(_))
    }

    /// C truthiness; `None` for values that have no truth value
    pub fn truthy(&self) -> Option<bool> {
        match self {
            Value::Int(n) => Some(*n != 0),
            Value::Char(c) => Some(*c != 0),
            Value::Pointer(_) | Value::Function(_) => Some(true),
            Value::Null => Some(false),
            Value::Aggregate(_) | Value::Uninitialized => None,
        }
    }

    /// Short kind name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Char(_) => "char",
            Value::Pointer(_) => "pointer",
            Value::Null => "NULL",
            Value::Function(_) => "function pointer",
            Value::Aggregate(_) => "struct",
            Value::Uninitialized => "uninitialized value",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "'{}'", *c as u8 as char),
            Value::Pointer(addr) => write!(f, "<block {} + {}>", addr.block, addr.offset),
            Value::Null => write!(f, "NULL"),
            Value::Function(name) => write!(f, "&{}", name),
            Value::Aggregate(cells) => write!(f, "{{{} bytes}}", cells.len()),
            Value::Uninitialized => write!(f, "?"),
        }
    }
}
