//! Lvalues: places in memory that can be read, written, or have their address taken

use crate::interpreter::engine::{struct_name, Interpreter, LValue, Typed};
use crate::interpreter::errors::{AtLocation, RuntimeError};
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter<'_> {
    /// Resolve an expression to the storage it designates
    pub(crate) fn eval_lvalue(&mut self, expr: &AstNode) -> Result<LValue, RuntimeError> {
        match expr {
            AstNode::Variable(name, location) => self
                .lookup(name)
                .map(|binding| LValue {
                    address: binding.address,
                    ty: binding.ty.clone(),
                })
                .ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: name.clone(),
                    location: *location,
                }),

            AstNode::UnaryOp {
                op: UnOp::Deref,
                operand,
                location,
            } => {
                let pointer = self.eval(operand)?;
                self.deref_lvalue(pointer, *location)
            }

            AstNode::ArrayAccess { array, index, location } => self.element_lvalue(array, index, *location),

            AstNode::MemberAccess { object, member, location } => {
                let base = self.object_lvalue(object)?;
                self.field_lvalue(base, member, *location)
            }

            AstNode::PointerMemberAccess { object, member, location } => {
                let pointer = self.eval(object)?;
                if !pointer.ty.is_pointer() || !pointer.ty.pointee().is_struct_value() {
                    return Err(RuntimeError::type_error(
                        "pointer to struct",
                        pointer.ty.to_string(),
                        *location,
                    ));
                }
                let base = self.deref_lvalue(pointer, *location)?;
                self.field_lvalue(base, member, *location)
            }

            AstNode::StringLiteral(text, location) => {
                let address = self.intern_literal(text, *location)?;
                Ok(LValue {
                    address,
                    ty: Type::char().with_array(text.len() + 1),
                })
            }

            other => Err(RuntimeError::unsupported(
                "expression is not assignable",
                other.location(),
            )),
        }
    }

    /// Like [`eval_lvalue`](Self::eval_lvalue), but struct rvalues such as a
    /// call result are copied into a temporary first
    fn object_lvalue(&mut self, object: &AstNode) -> Result<LValue, RuntimeError> {
        match object {
            AstNode::Variable(..)
            | AstNode::UnaryOp { op: UnOp::Deref, .. }
            | AstNode::ArrayAccess { .. }
            | AstNode::MemberAccess { .. }
            | AstNode::PointerMemberAccess { .. }
            | AstNode::StringLiteral(..) => self.eval_lvalue(object),
            _ => {
                let value = self.eval(object)?;
                self.materialize(value, object.location())
            }
        }
    }

    /// Read an lvalue; arrays decay to a pointer to their first element
    pub(crate) fn read_lvalue(&mut self, place: LValue, location: SourceLocation) -> Result<Typed, RuntimeError> {
        if place.ty.is_array() {
            return Ok(Typed::new(Value::Pointer(place.address), place.ty.decayed()));
        }
        let value = self.load(place.address, &place.ty, location)?;
        Ok(Typed::new(value, place.ty))
    }

    pub(crate) fn deref_lvalue(&self, pointer: Typed, location: SourceLocation) -> Result<LValue, RuntimeError> {
        match pointer.value {
            Value::Pointer(address) => {
                let ty = pointer.ty.pointee();
                if ty.is_void() {
                    return Err(RuntimeError::type_error(
                        "pointer to a complete type",
                        pointer.ty.to_string(),
                        location,
                    ));
                }
                Ok(LValue { address, ty })
            }
            Value::Null => Err(RuntimeError::NullDereference { location }),
            Value::Uninitialized => Err(RuntimeError::UninitializedRead {
                what: "pointer".to_string(),
                location,
            }),
            _ => Err(RuntimeError::type_error("pointer", pointer.ty.to_string(), location)),
        }
    }

    /// `array[index]`. Arrays are indexed in place so nested dimensions keep
    /// their shape; anything else must evaluate to a pointer.
    fn element_lvalue(&mut self, array: &AstNode, index: &AstNode, location: SourceLocation) -> Result<LValue, RuntimeError> {
        let base = if self.static_type(array)?.is_array() {
            let whole = self.object_lvalue(array)?;
            LValue {
                address: whole.address,
                ty: whole.ty.element_type(),
            }
        } else {
            let pointer = self.eval(array)?;
            self.deref_lvalue(pointer, location)?
        };

        let index = self.eval(index)?;
        let index = self.integer(index, location)?;
        let stride = self.structs.sizeof_type(&base.ty).at(location)? as i64;

        Ok(LValue {
            address: base.address.offset_by(index as i64 * stride),
            ty: base.ty,
        })
    }

    fn field_lvalue(&self, base: LValue, member: &str, location: SourceLocation) -> Result<LValue, RuntimeError> {
        let name = struct_name(&base.ty)
            .ok_or_else(|| RuntimeError::type_error("struct", base.ty.to_string(), location))?;

        let slot = self
            .structs
            .field(name, member)
            .at(location)?
            .ok_or_else(|| RuntimeError::MissingStructField {
                struct_name: name.to_string(),
                field_name: member.to_string(),
                location,
            })?;

        let mut ty = slot.ty;
        // Members of a const struct are const
        if base.ty.is_const {
            ty.is_const = true;
        }
        Ok(LValue {
            address: base.address.offset_by(slot.offset as i64),
            ty,
        })
    }
}
