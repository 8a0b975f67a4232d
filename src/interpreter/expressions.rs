//! Expression evaluation implementation
//!
//! This module dispatches every expression kind to its evaluator:
//!
//! - Literals (integers, characters, strings) and `NULL`
//! - Variables and function designators
//! - Operators, delegated to `ops::{binary, unary, assign}`
//! - Array subscripting and struct member access, via `ops::access`
//! - Function calls, direct, through function pointers, and built-ins
//! - Type casts and the sizeof operator
//!
//! Every result is a [`Typed`] value: arrays decay to a pointer to their first
//! element and function names to a function pointer, as in C.

use crate::interpreter::builtins::is_builtin;
use crate::interpreter::engine::{Interpreter, LValue, Typed};
use crate::interpreter::errors::{AtLocation, RuntimeError};
use crate::memory::value::Value;
use crate::parser::ast::*;
use std::rc::Rc;

impl Interpreter<'_> {
    /// Evaluate an expression and return its value
    pub(crate) fn eval(&mut self, expr: &AstNode) -> Result<Typed, RuntimeError> {
        match expr {
            AstNode::IntLiteral(n, _) => Ok(Typed::int(*n)),

            // Character constants have type int
            AstNode::CharLiteral(c, _) => Ok(Typed::int(*c as i32)),

            AstNode::StringLiteral(text, location) => {
                let address = self.intern_literal(text, *location)?;
                Ok(Typed::new(Value::Pointer(address), Type::char().with_pointer()))
            }

            AstNode::Null { .. } => Ok(Typed::new(Value::Null, Type::void().with_pointer())),

            AstNode::Variable(name, location) => self.eval_variable(name, *location),

            AstNode::Assignment { lhs, rhs, location } => self.eval_assignment(lhs, rhs, *location),

            AstNode::CompoundAssignment { lhs, op, rhs, location } => {
                self.eval_compound_assignment(lhs, *op, rhs, *location)
            }

            AstNode::BinaryOp {
                op,
                left,
                right,
                location,
            } => self.eval_binary(*op, left, right, *location),

            AstNode::UnaryOp { op, operand, location } => self.eval_unary(*op, operand, *location),

            AstNode::TernaryOp {
                condition,
                true_expr,
                false_expr,
                ..
            } => {
                if self.condition(condition)? {
                    self.eval(true_expr)
                } else {
                    self.eval(false_expr)
                }
            }

            AstNode::FunctionCall { callee, args, location } => self.eval_call(callee, args, *location),

            AstNode::ArrayAccess { location, .. }
            | AstNode::MemberAccess { location, .. }
            | AstNode::PointerMemberAccess { location, .. } => {
                let place = self.eval_lvalue(expr)?;
                self.read_lvalue(place, *location)
            }

            AstNode::Cast {
                target_type,
                expr: inner,
                location,
            } => self.eval_cast(target_type, inner, *location),

            AstNode::SizeofType { target_type, location } => {
                let size = self.structs.sizeof_type(target_type).at(*location)?;
                Ok(Typed::int(size as i32))
            }

            AstNode::SizeofExpr { expr: inner, location } => {
                let ty = self.static_type(inner)?;
                let size = self.structs.sizeof_type(&ty).at(*location)?;
                Ok(Typed::int(size as i32))
            }

            AstNode::InitList { location, .. } => Err(RuntimeError::unsupported(
                "brace initializer outside a declaration",
                *location,
            )),

            other => Err(RuntimeError::unsupported(
                "statement used as an expression",
                other.location(),
            )),
        }
    }

    fn eval_variable(&mut self, name: &str, location: SourceLocation) -> Result<Typed, RuntimeError> {
        if let Some(binding) = self.lookup(name).cloned() {
            let place = LValue {
                address: binding.address,
                ty: binding.ty,
            };
            return self.read_lvalue(place, location);
        }

        if let Some(def) = self.functions.get(name) {
            return Ok(Typed::new(
                Value::Function(Rc::from(name)),
                def.designator_type().with_pointer(),
            ));
        }

        Err(RuntimeError::UndefinedVariable {
            name: name.to_string(),
            location,
        })
    }

    pub(crate) fn eval_args(&mut self, args: &[AstNode]) -> Result<Vec<Typed>, RuntimeError> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    /// Call by name when the callee names a function, otherwise through
    /// whatever function pointer the callee expression yields
    fn eval_call(&mut self, callee: &AstNode, args: &[AstNode], location: SourceLocation) -> Result<Typed, RuntimeError> {
        if let AstNode::Variable(name, _) = callee {
            if self.lookup(name).is_none() {
                if self.functions.contains_key(name) {
                    let values = self.eval_args(args)?;
                    return self.call_function(name, values, location);
                }
                if is_builtin(name) {
                    return self.call_builtin(name, args, location);
                }
                return Err(RuntimeError::UndefinedFunction {
                    name: name.clone(),
                    location,
                });
            }
        }

        let target = self.eval(callee)?;
        match target.value {
            Value::Function(name) => {
                let values = self.eval_args(args)?;
                self.call_function(&name, values, location)
            }
            Value::Null => Err(RuntimeError::NullDereference { location }),
            _ => Err(RuntimeError::type_error(
                "function pointer",
                target.ty.to_string(),
                location,
            )),
        }
    }

    fn eval_cast(&mut self, target: &Type, inner: &AstNode, location: SourceLocation) -> Result<Typed, RuntimeError> {
        let value = self.eval(inner)?;
        if target.is_void() {
            return Ok(Typed::void());
        }
        let converted = self.convert(value, target, location)?;
        Ok(Typed::new(converted, target.clone()))
    }
}
