//! Statement execution
//!
//! Declarations, blocks, `if`, `switch` and the jump statements. Loops live
//! in `loops.rs`. A jump does not unwind the Rust stack: it sets
//! `control_flow`, and every statement list stops as soon as the flow is no
//! longer normal.

use crate::interpreter::engine::{struct_name, ControlFlow, Interpreter, Typed};
use crate::interpreter::errors::{AtLocation, RuntimeError};
use crate::memory::value::{Address, Value};
use crate::parser::ast::*;
use rustc_hash::FxHashSet;

impl Interpreter<'_> {
    pub(crate) fn execute(&mut self, stmt: &AstNode) -> Result<(), RuntimeError> {
        match stmt {
            AstNode::VarDecl {
                name,
                var_type,
                init,
                is_static,
                location,
            } => self.execute_var_decl(name, var_type, init.as_deref(), *is_static, *location),

            AstNode::DeclList { decls, .. } => {
                for decl in decls {
                    self.execute(decl)?;
                }
                Ok(())
            }

            AstNode::Block { statements, .. } => self.execute_block(statements),

            AstNode::Return { expr, .. } => {
                let value = match expr {
                    Some(expr) => Some(self.eval(expr)?),
                    None => None,
                };
                self.control_flow = ControlFlow::Return(value);
                Ok(())
            }

            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.condition(condition)? {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(())
                }
            }

            AstNode::While { condition, body, .. } => self.execute_while(condition, body),

            AstNode::DoWhile { body, condition, .. } => self.execute_do_while(body, condition),

            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => self.execute_for(init.as_deref(), condition.as_deref(), increment.as_deref(), body),

            AstNode::Switch { expr, cases, location } => self.execute_switch(expr, cases, *location),

            AstNode::Break { .. } => {
                self.control_flow = ControlFlow::Break;
                Ok(())
            }

            AstNode::Continue { .. } => {
                self.control_flow = ControlFlow::Continue;
                Ok(())
            }

            AstNode::ExpressionStatement { expr, .. } => self.eval(expr).map(|_| ()),

            AstNode::Empty { .. } => Ok(()),

            other => Err(RuntimeError::unsupported(
                "declaration is only allowed at file scope",
                other.location(),
            )),
        }
    }

    /// Execute statements in a fresh scope; locals die when it ends
    pub(crate) fn execute_block(&mut self, statements: &[AstNode]) -> Result<(), RuntimeError> {
        self.push_scope();
        let result = self.execute_sequence(statements);
        self.pop_scope();
        result
    }

    fn execute_sequence(&mut self, statements: &[AstNode]) -> Result<(), RuntimeError> {
        for stmt in statements {
            self.execute(stmt)?;
            if !self.flowing() {
                break;
            }
        }
        Ok(())
    }

    fn execute_var_decl(
        &mut self,
        name: &str,
        ty: &Type,
        init: Option<&AstNode>,
        is_static: bool,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if is_static {
            // Storage and initializer run once, on the first pass over the declaration
            let binding = match self.statics.get(&location) {
                Some(binding) => binding.clone(),
                None => {
                    let binding = self.allocate_static(name, ty, location)?;
                    self.statics.insert(location, binding.clone());
                    if let Some(init) = init {
                        self.initialize(binding.address, ty, init, location)?;
                    }
                    binding
                }
            };
            return self.bind(name, binding, location);
        }

        let address = self.declare_local(name, ty, location)?;
        if let Some(init) = init {
            self.initialize(address, ty, init, location)?;
        }
        Ok(())
    }

    /// Run an initializer for the object at `address`; const objects may be initialized
    pub(crate) fn initialize(
        &mut self,
        address: Address,
        ty: &Type,
        init: &AstNode,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match init {
            AstNode::InitList { elements, .. } => self.initialize_list(address, ty, elements, location),

            AstNode::StringLiteral(text, _) if ty.is_array() && ty.element_type().base == BaseType::Char => {
                let capacity = ty.array_dims[0];
                if text.len() > capacity {
                    return Err(RuntimeError::unsupported(
                        format!("string \"{}\" does not fit in {}", text, ty),
                        location,
                    ));
                }
                let mut cells = vec![Value::Char(0); capacity];
                for (cell, byte) in cells.iter_mut().zip(text.bytes()) {
                    *cell = Value::Char(byte as i8);
                }
                self.memory.write_range(address, cells).at(location)
            }

            expr => {
                if ty.is_array() {
                    return Err(RuntimeError::unsupported(
                        "arrays must be initialized with a brace list",
                        location,
                    ));
                }
                let value = self.eval(expr)?;
                let value = self.convert(value, ty, location)?;
                self.store(address, ty, value, location)
            }
        }
    }

    /// `{a, b, c}`: missing elements are zero
    fn initialize_list(
        &mut self,
        address: Address,
        ty: &Type,
        elements: &[AstNode],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let zeros = self.zero_cells(ty, location)?;
        self.memory.write_range(address, zeros).at(location)?;

        if ty.is_array() {
            if elements.len() > ty.array_dims[0] {
                return Err(RuntimeError::unsupported(
                    format!("too many initializers for {}", ty),
                    location,
                ));
            }
            let element_type = ty.element_type();
            let stride = self.structs.sizeof_type(&element_type).at(location)? as i64;
            for (i, element) in elements.iter().enumerate() {
                self.initialize(address.offset_by(i as i64 * stride), &element_type, element, location)?;
            }
            return Ok(());
        }

        if let Some(name) = struct_name(ty) {
            let slots = self.structs.fields(name).at(location)?;
            if elements.len() > slots.len() {
                return Err(RuntimeError::unsupported(
                    format!("too many initializers for {}", ty),
                    location,
                ));
            }
            for (slot, element) in slots.iter().zip(elements) {
                self.initialize(address.offset_by(slot.offset as i64), &slot.ty, element, location)?;
            }
            return Ok(());
        }

        match elements {
            [single] => self.initialize(address, ty, single, location),
            _ => Err(RuntimeError::unsupported(
                format!("a {} needs exactly one initializer", ty),
                location,
            )),
        }
    }

    fn execute_switch(
        &mut self,
        expr: &AstNode,
        cases: &[CaseNode],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let value = self.eval(expr)?;
        let selector = self.integer(value, location)?;

        // Every label is evaluated so that duplicates are caught even after a match
        let mut start = None;
        let mut labels = FxHashSet::default();
        for (i, case) in cases.iter().enumerate() {
            if let CaseNode::Case { value, location, .. } = case {
                let label = self.eval(value)?;
                let label = self.integer(label, *location)?;
                if !labels.insert(label) {
                    return Err(RuntimeError::DuplicateCase {
                        value: label,
                        location: *location,
                    });
                }
                if label == selector && start.is_none() {
                    start = Some(i);
                }
            }
        }
        let start = start.or_else(|| cases.iter().position(|c| matches!(c, CaseNode::Default { .. })));
        let Some(start) = start else {
            return Ok(());
        };

        // Fall through from the matching label to the end or the first `break`
        self.push_scope();
        let result = cases[start..].iter().try_for_each(|case| {
            let statements = match case {
                CaseNode::Case { statements, .. } | CaseNode::Default { statements, .. } => statements,
            };
            if self.flowing() {
                self.execute_sequence(statements)
            } else {
                Ok(())
            }
        });
        self.pop_scope();
        result?;

        if self.control_flow == ControlFlow::Break {
            self.control_flow = ControlFlow::Normal;
        }
        Ok(())
    }

    /// Evaluate a controlling expression to its truth value
    pub(crate) fn condition(&mut self, expr: &AstNode) -> Result<bool, RuntimeError> {
        let value = self.eval(expr)?;
        self.truth(&value, expr.location())
    }

    pub(crate) fn truth(&self, value: &Typed, location: SourceLocation) -> Result<bool, RuntimeError> {
        if !value.value.is_initialized() {
            return Err(RuntimeError::UninitializedRead {
                what: format!("value of type {}", value.ty),
                location,
            });
        }
        value
            .value
            .truthy()
            .ok_or_else(|| RuntimeError::type_error("scalar", value.ty.to_string(), location))
    }

    /// The integer value of an `int` or `char` operand
    pub(crate) fn integer(&self, value: Typed, location: SourceLocation) -> Result<i32, RuntimeError> {
        if !value.value.is_initialized() {
            return Err(RuntimeError::UninitializedRead {
                what: format!("value of type {}", value.ty),
                location,
            });
        }
        value
            .value
            .as_int()
            .ok_or_else(|| RuntimeError::type_error("integer", value.ty.to_string(), location))
    }
}
