use crate::interpreter::engine::{Interpreter, LValue, Typed};
use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::{AstNode, BinOp, SourceLocation};

impl Interpreter<'_> {
    pub(crate) fn eval_assignment(&mut self, lhs: &AstNode, rhs: &AstNode, location: SourceLocation) -> Result<Typed, RuntimeError> {
        let target = self.eval_lvalue(lhs)?;
        self.check_writable(&target, location)?;

        let value = self.eval(rhs)?;
        let value = self.convert(value, &target.ty, location)?;
        self.store(target.address, &target.ty, value.clone(), location)?;
        Ok(Typed::new(value, target.ty))
    }

    /// `lhs op= rhs`; the target is evaluated once
    pub(crate) fn eval_compound_assignment(
        &mut self,
        lhs: &AstNode,
        op: BinOp,
        rhs: &AstNode,
        location: SourceLocation,
    ) -> Result<Typed, RuntimeError> {
        let target = self.eval_lvalue(lhs)?;
        self.check_writable(&target, location)?;

        let current = self.read_lvalue(target.clone(), location)?;
        let operand = self.eval(rhs)?;
        let result = self.binary_values(op, current, operand, location)?;
        let value = self.convert(result, &target.ty, location)?;
        self.store(target.address, &target.ty, value.clone(), location)?;
        Ok(Typed::new(value, target.ty))
    }

    /// Reject writes to arrays and to const objects
    pub(crate) fn check_writable(&self, target: &LValue, location: SourceLocation) -> Result<(), RuntimeError> {
        if target.ty.is_array() {
            return Err(RuntimeError::unsupported(
                format!("cannot assign to array of type {}", target.ty),
                location,
            ));
        }
        // `const T *p` makes the pointee const, not `p` itself
        if target.ty.is_const && target.ty.pointer_depth == 0 {
            return Err(RuntimeError::ConstModification {
                what: self.describe(target.address),
                location,
            });
        }
        Ok(())
    }
}
