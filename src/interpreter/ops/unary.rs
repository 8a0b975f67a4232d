use crate::interpreter::engine::{Interpreter, Typed};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, SourceLocation, UnOp};

impl Interpreter<'_> {
    pub(crate) fn eval_unary(&mut self, op: UnOp, operand: &AstNode, location: SourceLocation) -> Result<Typed, RuntimeError> {
        match op {
            UnOp::Neg => {
                let value = self.eval(operand)?;
                let n = self.integer(value, location)?;
                n.checked_neg()
                    .map(Typed::int)
                    .ok_or_else(|| RuntimeError::IntegerOverflow {
                        operation: format!("-({})", n),
                        location,
                    })
            }

            UnOp::Not => {
                let truth = self.condition(operand)?;
                Ok(Typed::bool(!truth))
            }

            UnOp::BitNot => {
                let value = self.eval(operand)?;
                Ok(Typed::int(!self.integer(value, location)?))
            }

            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                self.eval_increment(op, operand, location)
            }

            UnOp::Deref => {
                let pointer = self.eval(operand)?;
                // `*fp` on a function pointer designates the same function
                if pointer.ty.is_function_pointer() {
                    return Ok(pointer);
                }
                let place = self.deref_lvalue(pointer, location)?;
                self.read_lvalue(place, location)
            }

            UnOp::AddrOf => {
                if let AstNode::Variable(name, _) = operand {
                    if self.lookup(name).is_none() && self.functions.contains_key(name) {
                        return self.eval(operand);
                    }
                }
                let place = self.eval_lvalue(operand)?;
                let ty = if place.ty.is_array() {
                    place.ty.decayed()
                } else {
                    place.ty.with_pointer()
                };
                Ok(Typed::new(Value::Pointer(place.address), ty))
            }
        }
    }

    /// `++x`, `--x`, `x++`, `x--` on integers and pointers
    fn eval_increment(&mut self, op: UnOp, operand: &AstNode, location: SourceLocation) -> Result<Typed, RuntimeError> {
        let target = self.eval_lvalue(operand)?;
        self.check_writable(&target, location)?;

        let old = self.read_lvalue(target.clone(), location)?;
        let delta = if matches!(op, UnOp::PreInc | UnOp::PostInc) { 1 } else { -1 };

        let new = match &old.value {
            Value::Pointer(address) => self.offset_pointer(*address, &target.ty, delta as i64, location)?,
            Value::Null => {
                return Err(RuntimeError::unsupported("arithmetic on a NULL pointer", location));
            }
            _ => {
                let n = self.integer(old.clone(), location)?;
                let result = n.checked_add(delta).ok_or_else(|| RuntimeError::IntegerOverflow {
                    operation: format!("{} {} 1", n, if delta > 0 { "+" } else { "-" }),
                    location,
                })?;
                Typed::int(result)
            }
        };

        let stored = self.convert(new, &target.ty, location)?;
        self.store(target.address, &target.ty, stored.clone(), location)?;

        Ok(match op {
            UnOp::PostInc | UnOp::PostDec => old,
            _ => Typed::new(stored, target.ty),
        })
    }
}
