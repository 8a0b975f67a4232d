use crate::interpreter::engine::{Interpreter, Typed};
use crate::interpreter::errors::{AtLocation, RuntimeError};
use crate::memory::value::{Address, Value};
use crate::parser::ast::{AstNode, BinOp, SourceLocation, Type};

impl Interpreter<'_> {
    pub(crate) fn eval_binary(
        &mut self,
        op: BinOp,
        left: &AstNode,
        right: &AstNode,
        location: SourceLocation,
    ) -> Result<Typed, RuntimeError> {
        // Short-circuit operators evaluate the right side only when needed
        match op {
            BinOp::And => {
                let result = self.condition(left)? && self.condition(right)?;
                return Ok(Typed::bool(result));
            }
            BinOp::Or => {
                let result = self.condition(left)? || self.condition(right)?;
                return Ok(Typed::bool(result));
            }
            _ => {}
        }

        let left = self.eval(left)?;
        let right = self.eval(right)?;
        self.binary_values(op, left, right, location)
    }

    /// Apply a binary operator to two evaluated operands
    pub(crate) fn binary_values(
        &self,
        op: BinOp,
        left: Typed,
        right: Typed,
        location: SourceLocation,
    ) -> Result<Typed, RuntimeError> {
        for operand in [&left, &right] {
            if !operand.value.is_initialized() {
                return Err(RuntimeError::UninitializedRead {
                    what: format!("value of type {}", operand.ty),
                    location,
                });
            }
        }

        if let (Some(a), Some(b)) = (left.value.as_int(), right.value.as_int()) {
            return integer_op(op, a, b, location).map(Typed::int);
        }
        self.pointer_op(op, left, right, location)
    }

    fn pointer_op(&self, op: BinOp, left: Typed, right: Typed, location: SourceLocation) -> Result<Typed, RuntimeError> {
        let mismatch = || RuntimeError::TypeError {
            expected: format!("operands valid for '{}'", op.symbol()),
            got: format!("{} and {}", left.ty, right.ty),
            location,
        };

        match op {
            BinOp::Add | BinOp::Sub => {
                if let (Value::Pointer(address), Some(n)) = (&left.value, right.value.as_int()) {
                    let n = if op == BinOp::Sub { -(n as i64) } else { n as i64 };
                    return self.offset_pointer(*address, &left.ty, n, location);
                }
                if let (Some(n), Value::Pointer(address), BinOp::Add) = (left.value.as_int(), &right.value, op) {
                    return self.offset_pointer(*address, &right.ty, n as i64, location);
                }
                if let (Value::Pointer(a), Value::Pointer(b), BinOp::Sub) = (&left.value, &right.value, op) {
                    if a.block != b.block {
                        return Err(RuntimeError::unsupported(
                            "subtracting pointers into different objects",
                            location,
                        ));
                    }
                    let stride = self.structs.stride(&left.ty.pointee()).at(location)?.max(1) as i64;
                    return Ok(Typed::int(((a.offset - b.offset) / stride) as i32));
                }
                if left.value.is_null() || right.value.is_null() {
                    return Err(RuntimeError::unsupported("arithmetic on a NULL pointer", location));
                }
                Err(mismatch())
            }

            BinOp::Eq | BinOp::Ne => {
                let (a, b) = (null_constant(&left.value), null_constant(&right.value));
                if !a.is_pointer() || !b.is_pointer() {
                    return Err(mismatch());
                }
                Ok(Typed::bool((a == b) == (op == BinOp::Eq)))
            }

            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => match (&left.value, &right.value) {
                (Value::Pointer(a), Value::Pointer(b)) if a.block == b.block => Ok(Typed::bool(match op {
                    BinOp::Lt => a.offset < b.offset,
                    BinOp::Le => a.offset <= b.offset,
                    BinOp::Gt => a.offset > b.offset,
                    _ => a.offset >= b.offset,
                })),
                (Value::Pointer(_), Value::Pointer(_)) => Err(RuntimeError::unsupported(
                    "comparing pointers into different objects",
                    location,
                )),
                _ => Err(mismatch()),
            },

            BinOp::And | BinOp::Or => {
                let a = self.truth(&left, location)?;
                let b = self.truth(&right, location)?;
                Ok(Typed::bool(if op == BinOp::And { a && b } else { a || b }))
            }

            _ => Err(mismatch()),
        }
    }

    /// `pointer + n`, scaled by the size of the pointee
    pub(crate) fn offset_pointer(
        &self,
        address: Address,
        pointer_type: &Type,
        n: i64,
        location: SourceLocation,
    ) -> Result<Typed, RuntimeError> {
        let stride = self.structs.stride(&pointer_type.pointee()).at(location)? as i64;
        Ok(Typed::new(
            Value::Pointer(address.offset_by(n * stride)),
            pointer_type.clone(),
        ))
    }
}

/// The integer constant 0 used as a pointer is NULL
fn null_constant(value: &Value) -> Value {
    if value.as_int() == Some(0) {
        Value::Null
    } else {
        value.clone()
    }
}

/// 32-bit signed arithmetic; overflow and division by zero are errors
pub(crate) fn integer_op(op: BinOp, a: i32, b: i32, location: SourceLocation) -> Result<i32, RuntimeError> {
    let operation = || format!("{} {} {}", a, op.symbol(), b);
    let overflow = || RuntimeError::IntegerOverflow {
        operation: operation(),
        location,
    };

    Ok(match op {
        BinOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinOp::Div | BinOp::Mod => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero {
                    operation: operation(),
                    location,
                });
            }
            if op == BinOp::Div {
                a.checked_div(b).ok_or_else(overflow)?
            } else {
                a.checked_rem(b).ok_or_else(overflow)?
            }
        }
        BinOp::Eq => (a == b) as i32,
        BinOp::Ne => (a != b) as i32,
        BinOp::Lt => (a < b) as i32,
        BinOp::Le => (a <= b) as i32,
        BinOp::Gt => (a > b) as i32,
        BinOp::Ge => (a >= b) as i32,
        BinOp::And => (a != 0 && b != 0) as i32,
        BinOp::Or => (a != 0 || b != 0) as i32,
        BinOp::BitAnd => a & b,
        BinOp::BitOr => a | b,
        BinOp::BitXor => a ^ b,
        BinOp::BitShl | BinOp::BitShr => {
            if !(0..32).contains(&b) {
                return Err(overflow());
            }
            if op == BinOp::BitShl {
                a.wrapping_shl(b as u32)
            } else {
                a >> b
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(integer_op(BinOp::Add, 2, 3, loc()), Ok(5));
        assert_eq!(integer_op(BinOp::Div, -7, 2, loc()), Ok(-3));
        assert_eq!(integer_op(BinOp::Mod, -7, 2, loc()), Ok(-1));
        assert_eq!(integer_op(BinOp::Lt, 1, 2, loc()), Ok(1));
        assert_eq!(integer_op(BinOp::BitShl, 1, 4, loc()), Ok(16));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let err = integer_op(BinOp::Add, i32::MAX, 1, loc()).unwrap_err();
        assert!(matches!(err, RuntimeError::IntegerOverflow { .. }));
        assert!(integer_op(BinOp::Div, i32::MIN, -1, loc()).is_err());
        assert!(integer_op(BinOp::BitShr, 1, 40, loc()).is_err());
    }

    #[test]
    fn test_division_by_zero_message() {
        let err = integer_op(BinOp::Mod, 10, 0, loc()).unwrap_err();
        assert_eq!(err.to_string(), "Division by zero in '10 % 0' at line 1");
    }
}
