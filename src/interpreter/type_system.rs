//! Static types of expressions
//!
//! `sizeof expr` needs the type of an expression without evaluating it, and
//! indexing needs to know whether the indexed expression is a real array
//! (indexed in place) or a pointer (dereferenced). Neither may run side
//! effects, so types are computed from the AST and the current bindings.
//!
//! # Type Rules
//!
//! - Literals have their natural type (`int` for numbers and character
//!   constants, `char[N]` for strings)
//! - Variables have their declared type, arrays undecayed
//! - Pointer `+`/`-` integer keeps the pointer type; pointer difference is `int`
//! - Dereference and indexing yield the pointee/element type
//! - Member access yields the field's type

use crate::interpreter::builtins::builtin_return_type;
use crate::interpreter::engine::{struct_name, Interpreter};
use crate::interpreter::errors::{AtLocation, RuntimeError};
use crate::parser::ast::*;

impl Interpreter<'_> {
    pub(crate) fn static_type(&self, expr: &AstNode) -> Result<Type, RuntimeError> {
        match expr {
            AstNode::IntLiteral(..)
            | AstNode::CharLiteral(..)
            | AstNode::SizeofType { .. }
            | AstNode::SizeofExpr { .. } => Ok(Type::int()),

            AstNode::StringLiteral(text, _) => Ok(Type::char().with_array(text.len() + 1)),

            AstNode::Null { .. } => Ok(Type::void().with_pointer()),

            AstNode::Variable(name, location) => {
                if let Some(binding) = self.lookup(name) {
                    return Ok(binding.ty.clone());
                }
                self.functions
                    .get(name)
                    .map(|def| def.designator_type())
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        location: *location,
                    })
            }

            AstNode::Assignment { lhs, .. } | AstNode::CompoundAssignment { lhs, .. } => self.static_type(lhs),

            AstNode::BinaryOp { op, left, right, .. } => match op {
                BinOp::Add | BinOp::Sub => {
                    let left = self.static_type(left)?.decayed();
                    let right = self.static_type(right)?.decayed();
                    Ok(match (left.is_pointer(), right.is_pointer()) {
                        (true, true) => Type::int(),
                        (true, false) => left,
                        (false, true) => right,
                        (false, false) => Type::int(),
                    })
                }
                _ => Ok(Type::int()),
            },

            AstNode::UnaryOp { op, operand, .. } => match op {
                UnOp::Deref => {
                    let ty = self.static_type(operand)?.decayed();
                    Ok(if ty.is_function_pointer() { ty } else { ty.pointee() })
                }
                UnOp::AddrOf => {
                    let ty = self.static_type(operand)?;
                    Ok(if ty.is_array() { ty.decayed() } else { ty.with_pointer() })
                }
                UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => self.static_type(operand),
                UnOp::Neg | UnOp::Not | UnOp::BitNot => Ok(Type::int()),
            },

            AstNode::TernaryOp { true_expr, .. } => Ok(self.static_type(true_expr)?.decayed()),

            AstNode::FunctionCall { callee, location, .. } => {
                if let AstNode::Variable(name, _) = callee.as_ref() {
                    if self.lookup(name).is_none() {
                        if let Some(def) = self.functions.get(name) {
                            return Ok(def.return_type.clone());
                        }
                        return builtin_return_type(name).ok_or_else(|| RuntimeError::UndefinedFunction {
                            name: name.clone(),
                            location: *location,
                        });
                    }
                }
                let callee_type = self.static_type(callee)?;
                callee_type
                    .signature()
                    .map(|sig| sig.return_type.clone())
                    .ok_or_else(|| RuntimeError::type_error("function pointer", callee_type.to_string(), *location))
            }

            AstNode::ArrayAccess { array, .. } => {
                let ty = self.static_type(array)?;
                Ok(if ty.is_array() { ty.element_type() } else { ty.pointee() })
            }

            AstNode::MemberAccess { object, member, location } => {
                let ty = self.static_type(object)?;
                self.field_type(&ty, member, *location)
            }

            AstNode::PointerMemberAccess { object, member, location } => {
                let ty = self.static_type(object)?.decayed().pointee();
                self.field_type(&ty, member, *location)
            }

            AstNode::Cast { target_type, .. } => Ok(target_type.clone()),

            other => Err(RuntimeError::unsupported(
                "expression has no type",
                other.location(),
            )),
        }
    }

    fn field_type(&self, ty: &Type, member: &str, location: SourceLocation) -> Result<Type, RuntimeError> {
        let name = struct_name(ty).ok_or_else(|| RuntimeError::type_error("struct", ty.to_string(), location))?;
        self.structs
            .field(name, member)
            .at(location)?
            .map(|slot| slot.ty)
            .ok_or_else(|| RuntimeError::MissingStructField {
                struct_name: name.to_string(),
                field_name: member.to_string(),
                location,
            })
    }
}
