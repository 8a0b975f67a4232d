//! Loop statement execution (`while`, `do-while`, `for`).
//!
//! Adds `impl Interpreter` methods for the three loop forms supported by the
//! C subset. `break` and `continue` are consumed by the loop that owns them
//! and reported through [`LoopBodyResult`]; a `return` inside the body ends
//! the loop and stays pending in `control_flow` for the enclosing call.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::AstNode;

/// How one pass over a loop body ended
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`; the loop should iterate again.
    Continue,
    /// `break` was encountered; the loop should exit cleanly.
    Break,
    /// `return` was triggered; the loop unwinds and the caller sees `control_flow`.
    Exit,
}

impl Interpreter<'_> {
    /// Executes all statements in `body` inside a fresh scope.
    pub(crate) fn execute_loop_body(&mut self, body: &[AstNode]) -> Result<LoopBodyResult, RuntimeError> {
        self.execute_block(body)?;

        Ok(match self.control_flow {
            ControlFlow::Normal => LoopBodyResult::Continue,
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::Normal;
                LoopBodyResult::Continue
            }
            ControlFlow::Break => {
                self.control_flow = ControlFlow::Normal;
                LoopBodyResult::Break
            }
            ControlFlow::Return(_) => LoopBodyResult::Exit,
        })
    }

    pub(crate) fn execute_while(&mut self, condition: &AstNode, body: &[AstNode]) -> Result<(), RuntimeError> {
        while self.condition(condition)? {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
        }
        Ok(())
    }

    pub(crate) fn execute_do_while(&mut self, body: &[AstNode], condition: &AstNode) -> Result<(), RuntimeError> {
        loop {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
            if !self.condition(condition)? {
                break;
            }
        }
        Ok(())
    }

    /// `for` gets its own scope so a variable declared in `init` ends with the loop
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
    ) -> Result<(), RuntimeError> {
        self.push_scope();
        let result = self.run_for(init, condition, increment, body);
        self.pop_scope();
        result
    }

    fn run_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
    ) -> Result<(), RuntimeError> {
        match init {
            Some(decl @ (AstNode::VarDecl { .. } | AstNode::DeclList { .. })) => self.execute(decl)?,
            Some(expr) => {
                self.eval(expr)?;
            }
            None => {}
        }

        loop {
            if let Some(condition) = condition {
                if !self.condition(condition)? {
                    break;
                }
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }

            if let Some(increment) = increment {
                self.eval(increment)?;
            }
        }
        Ok(())
    }
}
