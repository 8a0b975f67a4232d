//! Memory model for the snippet interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (Int, Char, Pointer, Function, Aggregate)
//! - [`arena`]: Tombstoned blocks for globals, locals, literals and the heap
//!
//! # Type Sizes
//!
//! Unlike real C, this interpreter uses fixed, platform-independent sizes:
//! - `int`: 4 bytes
//! - `char`: 1 byte
//! - pointer and function pointer: 8 bytes (regardless of pointee type)
//! - `struct`: sum of field sizes (no padding or alignment)
//!
//! # Pointer Arithmetic
//!
//! Pointer arithmetic is scaled by pointee size:
//! ```text
//! ptr + n  →  ptr + (n * sizeof(*ptr))
//! ```

pub mod arena;
pub mod value;

use crate::parser::ast::{BaseType, Field, Type};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Pointers of every kind occupy 8 bytes
pub const POINTER_SIZE: usize = 8;

/// Struct nesting deeper than this is treated as self-containing
const MAX_LAYOUT_DEPTH: usize = 32;

/// Largest object size; `sizeof` yields an `int`
pub const MAX_OBJECT_SIZE: usize = i32::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("struct '{0}' is not defined")]
    UnknownStruct(String),

    #[error("struct '{0}' contains itself")]
    Recursive(String),

    #[error("type '{0}' has no size")]
    Incomplete(String),

    #[error("type '{0}' is too large")]
    TooLarge(String),
}

/// Byte position of one struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    pub offset: usize,
    pub ty: Type,
}

/// Struct definitions known to the running program
#[derive(Debug, Clone, Default)]
pub struct StructTable {
    defs: FxHashMap<String, Vec<Field>>,
}

impl StructTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition; `false` if the name was already taken
    pub fn define(&mut self, name: &str, fields: Vec<Field>) -> bool {
        if self.defs.contains_key(name) {
            return false;
        }
        self.defs.insert(name.to_string(), fields);
        true
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Calculate the size of a type in bytes
    pub fn sizeof_type(&self, ty: &Type) -> Result<usize, LayoutError> {
        self.sizeof_at_depth(ty, 0)
    }

    fn sizeof_at_depth(&self, ty: &Type, depth: usize) -> Result<usize, LayoutError> {
        let too_large = || LayoutError::TooLarge(ty.to_string());
        let elements = ty
            .array_dims
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .filter(|&n| n <= MAX_OBJECT_SIZE)
            .ok_or_else(too_large)?;

        let scalar = if ty.pointer_depth > 0 {
            POINTER_SIZE
        } else {
            match &ty.base {
                BaseType::Int => 4,
                BaseType::Char => 1,
                BaseType::Void | BaseType::Function(_) => {
                    return Err(LayoutError::Incomplete(ty.to_string()));
                }
                BaseType::Struct(name) => {
                    if depth > MAX_LAYOUT_DEPTH {
                        return Err(LayoutError::Recursive(name.clone()));
                    }
                    let fields = self
                        .defs
                        .get(name)
                        .ok_or_else(|| LayoutError::UnknownStruct(name.clone()))?;
                    let mut total: usize = 0;
                    for field in fields {
                        let size = self.sizeof_at_depth(&field.field_type, depth + 1)?;
                        total = total
                            .checked_add(size)
                            .filter(|&n| n <= MAX_OBJECT_SIZE)
                            .ok_or_else(too_large)?;
                    }
                    total
                }
            }
        };

        scalar
            .checked_mul(elements)
            .filter(|&n| n <= MAX_OBJECT_SIZE)
            .ok_or_else(too_large)
    }

    /// Size used for pointer arithmetic on a pointer to `pointee`;
    /// `void *` steps one byte at a time
    pub fn stride(&self, pointee: &Type) -> Result<usize, LayoutError> {
        if pointee.is_void() {
            return Ok(1);
        }
        self.sizeof_type(pointee)
    }

    /// Look up a field of `struct name`; `Ok(None)` if the struct lacks it
    pub fn field(&self, name: &str, member: &str) -> Result<Option<FieldSlot>, LayoutError> {
        let fields = self
            .defs
            .get(name)
            .ok_or_else(|| LayoutError::UnknownStruct(name.to_string()))?;

        let mut offset = 0;
        for field in fields {
            if field.name == member {
                return Ok(Some(FieldSlot {
                    offset,
                    ty: field.field_type.clone(),
                }));
            }
            offset += self.sizeof_type(&field.field_type)?;
        }
        Ok(None)
    }

    /// All fields of `struct name` in declaration order, with offsets
    pub fn fields(&self, name: &str) -> Result<Vec<FieldSlot>, LayoutError> {
        let fields = self
            .defs
            .get(name)
            .ok_or_else(|| LayoutError::UnknownStruct(name.to_string()))?;

        let mut slots = Vec::with_capacity(fields.len());
        let mut offset = 0;
        for field in fields {
            slots.push(FieldSlot {
                offset,
                ty: field.field_type.clone(),
            });
            offset += self.sizeof_type(&field.field_type)?;
        }
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::FunctionSig;

    fn field(name: &str, field_type: Type) -> Field {
        Field {
            name: name.to_string(),
            field_type,
        }
    }

    #[test]
    fn test_scalar_sizes() {
        let table = StructTable::new();
        assert_eq!(table.sizeof_type(&Type::int()), Ok(4));
        assert_eq!(table.sizeof_type(&Type::char()), Ok(1));
        assert_eq!(table.sizeof_type(&Type::char().with_pointer()), Ok(8));
        assert_eq!(table.sizeof_type(&Type::int().with_array(2).with_array(3)), Ok(24));

        let mut fn_ptr = Type::new(BaseType::Function(Box::new(FunctionSig {
            return_type: Type::int(),
            params: vec![],
        })));
        fn_ptr.pointer_depth = 1;
        assert_eq!(table.sizeof_type(&fn_ptr), Ok(8));
        assert!(table.sizeof_type(&Type::void()).is_err());
    }

    #[test]
    fn test_struct_layout() {
        let mut table = StructTable::new();
        assert!(table.define(
            "Person",
            vec![
                field("name", Type::char().with_array(10)),
                field("age", Type::int()),
                field("next", Type::new(BaseType::Struct("Person".into())).with_pointer()),
            ],
        ));
        assert!(!table.define("Person", vec![]));

        let person = Type::new(BaseType::Struct("Person".into()));
        assert_eq!(table.sizeof_type(&person), Ok(22));
        assert_eq!(table.field("Person", "age").unwrap().map(|f| f.offset), Some(10));
        assert_eq!(table.field("Person", "next").unwrap().map(|f| f.offset), Some(14));
        assert_eq!(table.field("Person", "missing"), Ok(None));
    }

    #[test]
    fn test_self_containing_struct() {
        let mut table = StructTable::new();
        table.define("Loop", vec![field("inner", Type::new(BaseType::Struct("Loop".into())))]);
        let ty = Type::new(BaseType::Struct("Loop".into()));
        assert_eq!(table.sizeof_type(&ty), Err(LayoutError::Recursive("Loop".into())));
    }

    #[test]
    fn test_oversized_types_rejected() {
        let mut table = StructTable::new();
        let huge = Type::char().with_array(65536).with_array(65536).with_array(65536).with_array(65536);
        assert!(matches!(table.sizeof_type(&huge), Err(LayoutError::TooLarge(_))));

        let just_over = Type::int().with_array(MAX_OBJECT_SIZE / 4 + 1);
        assert!(matches!(table.sizeof_type(&just_over), Err(LayoutError::TooLarge(_))));

        table.define(
            "Pair",
            vec![
                field("a", Type::char().with_array(MAX_OBJECT_SIZE)),
                field("b", Type::char()),
            ],
        );
        let pair = Type::new(BaseType::Struct("Pair".into()));
        assert!(matches!(table.sizeof_type(&pair), Err(LayoutError::TooLarge(_))));
    }
}
