// Execution engine for the snippet interpreter

use crate::interpreter::constants::{MAX_CALL_DEPTH, MEMORY_LIMIT};
use crate::interpreter::errors::{AtLocation, RuntimeError};
use crate::interpreter::output::CaptureBuffer;
use crate::memory::arena::{Memory, Region};
use crate::memory::value::{Address, BlockId, Value};
use crate::memory::StructTable;
use crate::parser::ast::*;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::trace;

/// A value together with the static type it was produced at
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Typed {
    pub value: Value,
    pub ty: Type,
}

impl Typed {
    pub fn new(value: Value, ty: Type) -> Self {
        Typed { value, ty }
    }

    pub fn int(n: i32) -> Self {
        Typed::new(Value::Int(n), Type::int())
    }

    pub fn bool(b: bool) -> Self {
        Typed::int(b as i32)
    }

    pub fn void() -> Self {
        Typed::new(Value::Uninitialized, Type::void())
    }
}

/// A storage location and the type of the object stored there
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LValue {
    pub address: Address,
    pub ty: Type,
}

/// A name bound to storage
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub address: Address,
    pub ty: Type,
}

/// Variables declared in one `{ ... }` block, and the blocks to release on exit
#[derive(Debug, Default)]
pub(crate) struct Scope {
    vars: FxHashMap<String, Binding>,
    blocks: Vec<BlockId>,
}

/// One active function call
#[derive(Debug)]
pub(crate) struct Frame {
    scopes: Vec<Scope>,
}

/// Non-local control flow raised by `break`, `continue` and `return`
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return(Option<Typed>),
}

/// Name of the struct a value type holds, if it is a struct value
pub(crate) fn struct_name(ty: &Type) -> Option<&str> {
    match &ty.base {
        BaseType::Struct(name) if ty.is_struct_value() => Some(name),
        _ => None,
    }
}

/// The interpreter that executes one parsed program.
///
/// Everything the program prints goes to the borrowed [`CaptureBuffer`];
/// the interpreter never touches the process's stdout.
pub struct Interpreter<'out> {
    /// Function definitions (name -> FunctionDef)
    pub(crate) functions: FxHashMap<String, Rc<FunctionDef>>,

    pub(crate) structs: StructTable,

    /// Global declarations, initialized in order when `run` starts
    global_decls: Vec<AstNode>,

    pub(crate) globals: FxHashMap<String, Binding>,

    /// Local `static` variables, keyed by their declaration site
    pub(crate) statics: FxHashMap<SourceLocation, Binding>,

    /// Interned string literals
    literals: FxHashMap<String, Address>,

    pub(crate) memory: Memory,

    /// Call stack
    pub(crate) frames: Vec<Frame>,

    pub(crate) control_flow: ControlFlow,

    pub(crate) out: &'out mut CaptureBuffer,
}

impl<'out> Interpreter<'out> {
    /// Index the program's structs and functions. Execution starts with [`run`](Self::run).
    pub fn new(program: Program, out: &'out mut CaptureBuffer) -> Result<Self, RuntimeError> {
        let mut structs = StructTable::new();
        let mut functions = FxHashMap::default();
        let mut global_decls = Vec::new();

        for node in program.nodes {
            match node {
                AstNode::StructDef { name, fields, location } => {
                    if !structs.define(&name, fields) {
                        return Err(RuntimeError::DuplicateDefinition { name, location });
                    }
                }
                AstNode::FunctionDef(def) => {
                    let name = def.name.clone();
                    let location = def.location;
                    if functions.insert(name.clone(), Rc::new(def)).is_some() {
                        return Err(RuntimeError::DuplicateDefinition { name, location });
                    }
                }
                decl @ AstNode::VarDecl { .. } => global_decls.push(decl),
                other => {
                    return Err(RuntimeError::unsupported(
                        "unexpected top-level statement",
                        other.location(),
                    ));
                }
            }
        }

        Ok(Interpreter {
            functions,
            structs,
            global_decls,
            globals: FxHashMap::default(),
            statics: FxHashMap::default(),
            literals: FxHashMap::default(),
            memory: Memory::new(MEMORY_LIMIT),
            frames: Vec::new(),
            control_flow: ControlFlow::Normal,
            out,
        })
    }

    /// Run the program from start to finish.
    ///
    /// Returns the exit status: the argument of `exit()` if it was called,
    /// otherwise the value `main` returned (0 when it returned nothing).
    pub fn run(&mut self) -> Result<i32, RuntimeError> {
        match self.run_main() {
            Err(RuntimeError::Exit { code }) => Ok(code),
            other => other,
        }
    }

    fn run_main(&mut self) -> Result<i32, RuntimeError> {
        self.initialize_globals()?;

        let main = self
            .functions
            .get("main")
            .cloned()
            .ok_or(RuntimeError::NoMainFunction)?;
        if !main.params.is_empty() {
            return Err(RuntimeError::unsupported(
                "main must be declared as int main(void)",
                main.location,
            ));
        }

        let result = self.call_function("main", Vec::new(), main.location)?;
        Ok(result.value.as_int().unwrap_or(0))
    }

    /// Heap blocks still allocated; leaks are not errors but are worth logging
    pub fn live_heap_blocks(&self) -> usize {
        self.memory.live_heap_blocks()
    }

    fn initialize_globals(&mut self) -> Result<(), RuntimeError> {
        for decl in std::mem::take(&mut self.global_decls) {
            if let AstNode::VarDecl {
                name,
                var_type,
                init,
                location,
                ..
            } = decl
            {
                if self.globals.contains_key(&name) || self.functions.contains_key(&name) {
                    return Err(RuntimeError::DuplicateDefinition { name, location });
                }
                let binding = self.allocate_static(&name, &var_type, location)?;
                self.globals.insert(name, binding.clone());
                if let Some(init) = init {
                    self.initialize(binding.address, &var_type, &init, location)?;
                }
            }
        }
        Ok(())
    }

    // ===== Calls and frames =====

    pub(crate) fn call_function(
        &mut self,
        name: &str,
        args: Vec<Typed>,
        location: SourceLocation,
    ) -> Result<Typed, RuntimeError> {
        let def = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            })?;

        if args.len() != def.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: name.to_string(),
                expected: def.params.len(),
                got: args.len(),
                location,
            });
        }
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow {
                function: name.to_string(),
                limit: MAX_CALL_DEPTH,
                location,
            });
        }

        // Arguments are converted in the caller's frame
        let mut values = Vec::with_capacity(args.len());
        for (arg, param) in args.into_iter().zip(&def.params) {
            values.push(self.convert(arg, &param.param_type, location)?);
        }

        trace!(function = name, depth = self.frames.len() + 1, "call");
        self.frames.push(Frame {
            scopes: vec![Scope::default()],
        });
        let result = self.run_body(&def, values);
        self.pop_frame();
        let flow = std::mem::replace(&mut self.control_flow, ControlFlow::Normal);
        result?;

        match flow {
            ControlFlow::Return(Some(value)) => {
                if def.return_type.is_void() {
                    return Err(RuntimeError::type_error("no return value", value.ty.to_string(), location));
                }
                let value = self.convert(value, &def.return_type, location)?;
                Ok(Typed::new(value, def.return_type.clone()))
            }
            _ => Ok(Typed::new(Value::Uninitialized, def.return_type.clone())),
        }
    }

    fn run_body(&mut self, def: &FunctionDef, values: Vec<Value>) -> Result<(), RuntimeError> {
        for (param, value) in def.params.iter().zip(values) {
            let address = self.declare_local(&param.name, &param.param_type, def.location)?;
            self.store(address, &param.param_type, value, def.location)?;
        }

        for stmt in &def.body {
            self.execute(stmt)?;
            if !self.flowing() {
                break;
            }
        }
        Ok(())
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            for scope in frame.scopes {
                for id in scope.blocks {
                    self.memory.release(id);
                }
            }
        }
    }

    pub(crate) fn push_scope(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.scopes.push(Scope::default());
        }
    }

    pub(crate) fn pop_scope(&mut self) {
        let scope = self.frames.last_mut().and_then(|frame| frame.scopes.pop());
        if let Some(scope) = scope {
            for id in scope.blocks {
                self.memory.release(id);
            }
        }
    }

    /// No `break`, `continue` or `return` is pending
    pub(crate) fn flowing(&self) -> bool {
        self.control_flow == ControlFlow::Normal
    }

    // ===== Variables =====

    /// Innermost visible binding: current function's scopes, then globals
    pub(crate) fn lookup(&self, name: &str) -> Option<&Binding> {
        self.frames
            .last()
            .and_then(|frame| frame.scopes.iter().rev().find_map(|scope| scope.vars.get(name)))
            .or_else(|| self.globals.get(name))
    }

    /// Bind an existing object in the innermost scope
    pub(crate) fn bind(&mut self, name: &str, binding: Binding, location: SourceLocation) -> Result<(), RuntimeError> {
        let scope = self
            .frames
            .last_mut()
            .and_then(|frame| frame.scopes.last_mut())
            .ok_or_else(|| RuntimeError::unsupported("declaration outside a function", location))?;

        if scope.vars.contains_key(name) {
            return Err(RuntimeError::DuplicateDefinition {
                name: name.to_string(),
                location,
            });
        }
        scope.vars.insert(name.to_string(), binding);
        Ok(())
    }

    /// Allocate an uninitialized stack object and bind it in the innermost scope
    pub(crate) fn declare_local(&mut self, name: &str, ty: &Type, location: SourceLocation) -> Result<Address, RuntimeError> {
        let size = self.structs.sizeof_type(ty).at(location)?;
        let id = self.memory.allocate(size, Region::Stack, name).at(location)?;
        let address = Address::new(id, 0);
        self.bind(
            name,
            Binding {
                address,
                ty: ty.clone(),
            },
            location,
        )?;
        self.own_block(id);
        Ok(address)
    }

    /// Allocate a zero-filled object with static storage duration
    pub(crate) fn allocate_static(&mut self, name: &str, ty: &Type, location: SourceLocation) -> Result<Binding, RuntimeError> {
        let size = self.structs.sizeof_type(ty).at(location)?;
        let id = self.memory.allocate(size, Region::Global, name).at(location)?;
        let address = Address::new(id, 0);
        let zeros = self.zero_cells(ty, location)?;
        self.memory.write_range(address, zeros).at(location)?;
        Ok(Binding {
            address,
            ty: ty.clone(),
        })
    }

    /// Copy an rvalue into a temporary object so it can be addressed
    pub(crate) fn materialize(&mut self, value: Typed, location: SourceLocation) -> Result<LValue, RuntimeError> {
        let size = self.structs.sizeof_type(&value.ty).at(location)?;
        let id = self.memory.allocate(size, Region::Stack, "temporary").at(location)?;
        self.own_block(id);
        let address = Address::new(id, 0);
        self.store(address, &value.ty, value.value, location)?;
        Ok(LValue { address, ty: value.ty })
    }

    fn own_block(&mut self, id: BlockId) {
        if let Some(scope) = self.frames.last_mut().and_then(|frame| frame.scopes.last_mut()) {
            scope.blocks.push(id);
        }
    }

    pub(crate) fn intern_literal(&mut self, text: &str, location: SourceLocation) -> Result<Address, RuntimeError> {
        if let Some(address) = self.literals.get(text) {
            return Ok(*address);
        }

        let id = self
            .memory
            .allocate(text.len() + 1, Region::Literal, "string literal")
            .at(location)?;
        let address = Address::new(id, 0);
        let cells = text
            .bytes()
            .map(|b| Value::Char(b as i8))
            .chain(std::iter::once(Value::Char(0)))
            .collect();
        self.memory.write_range(address, cells).at(location)?;
        self.memory.set_read_only(id);
        self.literals.insert(text.to_string(), address);
        Ok(address)
    }

    // ===== Loads, stores and conversions =====

    /// Cells of a zero-initialized object of type `ty`
    pub(crate) fn zero_cells(&self, ty: &Type, location: SourceLocation) -> Result<Vec<Value>, RuntimeError> {
        if ty.is_array() {
            let element = self.zero_cells(&ty.element_type(), location)?;
            let count = ty.array_dims[0];
            let mut cells = Vec::with_capacity(element.len() * count);
            for _ in 0..count {
                cells.extend(element.iter().cloned());
            }
            return Ok(cells);
        }

        if let Some(name) = struct_name(ty) {
            let mut cells = Vec::new();
            for slot in self.structs.fields(name).at(location)? {
                cells.extend(self.zero_cells(&slot.ty, location)?);
            }
            return Ok(cells);
        }

        let size = self.structs.sizeof_type(ty).at(location)?;
        let mut cells = vec![Value::Uninitialized; size];
        if let Some(head) = cells.first_mut() {
            *head = if ty.pointer_depth > 0 {
                Value::Null
            } else if ty.base == BaseType::Char {
                Value::Char(0)
            } else {
                Value::Int(0)
            };
        }
        Ok(cells)
    }

    /// Read the object of type `ty` stored at `address`
    pub(crate) fn load(&self, address: Address, ty: &Type, location: SourceLocation) -> Result<Value, RuntimeError> {
        let size = self.structs.sizeof_type(ty).at(location)?;
        if ty.is_struct_value() {
            return Ok(Value::Aggregate(self.memory.read_range(address, size).at(location)?));
        }

        let value = self.memory.read(address, size).at(location)?.clone();
        if !value.is_initialized() {
            return Err(RuntimeError::UninitializedRead {
                what: self.describe(address),
                location,
            });
        }

        // Bytes written through another type (e.g. calloc) read back at the declared type
        if let (true, Some(n)) = (ty.is_integer(), value.as_int()) {
            return Ok(if ty.base == BaseType::Char {
                Value::Char(n as i8)
            } else {
                Value::Int(n)
            });
        }
        if ty.pointer_depth > 0 && value.as_int() == Some(0) {
            return Ok(Value::Null);
        }
        Ok(value)
    }

    /// Write `value` (already converted to `ty`) at `address`
    pub(crate) fn store(&mut self, address: Address, ty: &Type, value: Value, location: SourceLocation) -> Result<(), RuntimeError> {
        match value {
            Value::Aggregate(cells) => self.memory.write_range(address, cells).at(location),
            scalar => {
                let size = self.structs.sizeof_type(ty).at(location)?;
                self.memory.write(address, size, scalar).at(location)
            }
        }
    }

    /// Implicit conversion for assignment, argument passing and `return`
    pub(crate) fn convert(&self, from: Typed, to: &Type, location: SourceLocation) -> Result<Value, RuntimeError> {
        let Typed { value, ty } = from;

        if !value.is_initialized() {
            return Err(RuntimeError::UninitializedRead {
                what: format!("value of type {}", ty),
                location,
            });
        }

        if to.is_integer() {
            let n = value
                .as_int()
                .ok_or_else(|| RuntimeError::type_error(to.to_string(), ty.to_string(), location))?;
            return Ok(if to.base == BaseType::Char {
                Value::Char(n as i8)
            } else {
                Value::Int(n)
            });
        }

        if to.is_pointer() {
            return match value {
                Value::Pointer(_) | Value::Null | Value::Function(_) => Ok(value),
                Value::Int(0) | Value::Char(0) => Ok(Value::Null),
                _ => Err(RuntimeError::type_error(to.to_string(), ty.to_string(), location)),
            };
        }

        if to.is_struct_value() && ty.is_struct_value() && to.base == ty.base {
            if let Value::Aggregate(_) = value {
                return Ok(value);
            }
        }

        Err(RuntimeError::type_error(to.to_string(), ty.to_string(), location))
    }

    /// Human-readable name of the object at `address`, for error messages
    pub(crate) fn describe(&self, address: Address) -> String {
        match self.memory.block(address.block) {
            Some(block) if matches!(block.region, Region::Stack | Region::Global) => {
                if address.offset == 0 {
                    format!("variable '{}'", block.label)
                } else {
                    format!("memory in '{}' at byte {}", block.label, address.offset)
                }
            }
            Some(block) => format!("memory in {} at byte {}", block.label, address.offset),
            None => "memory".to_string(),
        }
    }
}
