// AST definitions for the snippet interpreter

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Base types supported by the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Char,
    Void,
    Struct(String),
    /// A function designator; behind one level of pointer it is a function pointer
    Function(Box<FunctionSig>),
}

/// Signature carried by function and function-pointer types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSig {
    pub return_type: Type,
    pub params: Vec<Type>,
}

/// Type representation with const qualifier, pointers, and arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub base: BaseType,
    pub is_const: bool,
    pub pointer_depth: usize,
    /// Outermost dimension first: `int m[2][3]` is `[2, 3]`
    pub array_dims: Vec<usize>,
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Type {
            base,
            is_const: false,
            pointer_depth: 0,
            array_dims: Vec::new(),
        }
    }

    pub fn int() -> Self {
        Type::new(BaseType::Int)
    }

    pub fn char() -> Self {
        Type::new(BaseType::Char)
    }

    pub fn void() -> Self {
        Type::new(BaseType::Void)
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn with_array(mut self, size: usize) -> Self {
        self.array_dims.push(size);
        self
    }

    pub fn is_array(&self) -> bool {
        !self.array_dims.is_empty()
    }

    pub fn is_pointer(&self) -> bool {
        self.array_dims.is_empty() && self.pointer_depth > 0
    }

    pub fn is_function(&self) -> bool {
        self.array_dims.is_empty()
            && self.pointer_depth == 0
            && matches!(self.base, BaseType::Function(_))
    }

    pub fn is_function_pointer(&self) -> bool {
        self.array_dims.is_empty()
            && self.pointer_depth == 1
            && matches!(self.base, BaseType::Function(_))
    }

    pub fn is_struct_value(&self) -> bool {
        self.array_dims.is_empty()
            && self.pointer_depth == 0
            && matches!(self.base, BaseType::Struct(_))
    }

    pub fn is_void(&self) -> bool {
        self.array_dims.is_empty() && self.pointer_depth == 0 && self.base == BaseType::Void
    }

    /// `int` or `char` scalar
    pub fn is_integer(&self) -> bool {
        self.array_dims.is_empty()
            && self.pointer_depth == 0
            && matches!(self.base, BaseType::Int | BaseType::Char)
    }

    /// Type of the element an array holds
    pub fn element_type(&self) -> Type {
        let mut elem = self.clone();
        if !elem.array_dims.is_empty() {
            elem.array_dims.remove(0);
        }
        elem
    }

    /// Type a pointer (or decayed array) points at
    pub fn pointee(&self) -> Type {
        if self.is_array() {
            return self.element_type();
        }
        let mut inner = self.clone();
        inner.pointer_depth = inner.pointer_depth.saturating_sub(1);
        inner
    }

    /// Array-to-pointer and function-to-pointer decay
    pub fn decayed(&self) -> Type {
        if self.is_array() {
            self.element_type().with_pointer()
        } else if self.is_function() {
            self.clone().with_pointer()
        } else {
            self.clone()
        }
    }

    /// The function signature behind a function or function-pointer type
    pub fn signature(&self) -> Option<&FunctionSig> {
        match &self.base {
            BaseType::Function(sig) if self.pointer_depth <= 1 && self.array_dims.is_empty() => {
                Some(sig)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        match &self.base {
            BaseType::Int => write!(f, "int")?,
            BaseType::Char => write!(f, "char")?,
            BaseType::Void => write!(f, "void")?,
            BaseType::Struct(name) => write!(f, "struct {}", name)?,
            BaseType::Function(sig) => {
                write!(f, "{} (", sig.return_type)?;
                for _ in 0..self.pointer_depth {
                    write!(f, "*")?;
                }
                write!(f, ")(")?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                return write!(f, ")");
            }
        }
        for _ in 0..self.pointer_depth {
            write!(f, "*")?;
        }
        for dim in &self.array_dims {
            write!(f, "[{}]", dim)?;
        }
        Ok(())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitShl,
    BitShr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitShl => "<<",
            BinOp::BitShr => ">>",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Not,     // !x
    BitNot,  // ~x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
    Deref,   // *x
    AddrOf,  // &x
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub param_type: Type,
}

/// Struct field
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: Type,
}

/// Struct definition
#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<Field>,
}

/// Function definition, indexed by name before execution starts
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<AstNode>,
    pub return_type: Type,
    pub location: SourceLocation,
}

impl FunctionDef {
    /// Type of the function designator `name`
    pub fn designator_type(&self) -> Type {
        Type::new(BaseType::Function(Box::new(FunctionSig {
            return_type: self.return_type.clone(),
            params: self.params.iter().map(|p| p.param_type.clone()).collect(),
        })))
    }
}

/// Switch case
#[derive(Debug, Clone)]
pub enum CaseNode {
    Case {
        value: Box<AstNode>,
        statements: Vec<AstNode>,
        location: SourceLocation,
    },
    Default {
        statements: Vec<AstNode>,
        location: SourceLocation,
    },
}

/// AST nodes representing declarations, statements and expressions
#[derive(Debug, Clone)]
pub enum AstNode {
    // Top-level declarations
    FunctionDef(FunctionDef),
    StructDef {
        name: String,
        fields: Vec<Field>,
        location: SourceLocation,
    },

    // Statements
    VarDecl {
        name: String,
        var_type: Type,
        init: Option<Box<AstNode>>,
        is_static: bool,
        location: SourceLocation,
    },
    /// `int a = 1, b = 2;` declares into the enclosing scope
    DeclList {
        decls: Vec<AstNode>,
        location: SourceLocation,
    },
    Block {
        statements: Vec<AstNode>,
        location: SourceLocation,
    },
    Return {
        expr: Option<Box<AstNode>>,
        location: SourceLocation,
    },
    If {
        condition: Box<AstNode>,
        then_branch: Vec<AstNode>,
        else_branch: Option<Vec<AstNode>>,
        location: SourceLocation,
    },
    While {
        condition: Box<AstNode>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    DoWhile {
        body: Vec<AstNode>,
        condition: Box<AstNode>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<AstNode>>,
        condition: Option<Box<AstNode>>,
        increment: Option<Box<AstNode>>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    Switch {
        expr: Box<AstNode>,
        cases: Vec<CaseNode>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    ExpressionStatement {
        expr: Box<AstNode>,
        location: SourceLocation,
    },
    Empty {
        location: SourceLocation,
    },

    // Expressions
    IntLiteral(i32, SourceLocation),
    CharLiteral(i8, SourceLocation),
    StringLiteral(String, SourceLocation),
    Null {
        location: SourceLocation,
    },
    Variable(String, SourceLocation),
    Assignment {
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    CompoundAssignment {
        lhs: Box<AstNode>,
        op: BinOp,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<AstNode>,
        location: SourceLocation,
    },
    TernaryOp {
        condition: Box<AstNode>,
        true_expr: Box<AstNode>,
        false_expr: Box<AstNode>,
        location: SourceLocation,
    },
    FunctionCall {
        callee: Box<AstNode>,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
    ArrayAccess {
        array: Box<AstNode>,
        index: Box<AstNode>,
        location: SourceLocation,
    },
    MemberAccess {
        object: Box<AstNode>,
        member: String,
        location: SourceLocation,
    },
    PointerMemberAccess {
        object: Box<AstNode>,
        member: String,
        location: SourceLocation,
    },
    Cast {
        target_type: Type,
        expr: Box<AstNode>,
        location: SourceLocation,
    },
    SizeofType {
        target_type: Type,
        location: SourceLocation,
    },
    SizeofExpr {
        expr: Box<AstNode>,
        location: SourceLocation,
    },
    /// Brace initializer `{1, 2, 3}`
    InitList {
        elements: Vec<AstNode>,
        location: SourceLocation,
    },
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            AstNode::FunctionDef(def) => def.location,
            AstNode::IntLiteral(_, loc)
            | AstNode::CharLiteral(_, loc)
            | AstNode::StringLiteral(_, loc)
            | AstNode::Variable(_, loc) => *loc,
            AstNode::StructDef { location, .. }
            | AstNode::VarDecl { location, .. }
            | AstNode::DeclList { location, .. }
            | AstNode::Block { location, .. }
            | AstNode::Return { location, .. }
            | AstNode::If { location, .. }
            | AstNode::While { location, .. }
            | AstNode::DoWhile { location, .. }
            | AstNode::For { location, .. }
            | AstNode::Switch { location, .. }
            | AstNode::Break { location }
            | AstNode::Continue { location }
            | AstNode::ExpressionStatement { location, .. }
            | AstNode::Empty { location }
            | AstNode::Null { location }
            | AstNode::Assignment { location, .. }
            | AstNode::CompoundAssignment { location, .. }
            | AstNode::BinaryOp { location, .. }
            | AstNode::UnaryOp { location, .. }
            | AstNode::TernaryOp { location, .. }
            | AstNode::FunctionCall { location, .. }
            | AstNode::ArrayAccess { location, .. }
            | AstNode::MemberAccess { location, .. }
            | AstNode::PointerMemberAccess { location, .. }
            | AstNode::Cast { location, .. }
            | AstNode::SizeofType { location, .. }
            | AstNode::SizeofExpr { location, .. }
            | AstNode::InitList { location, .. } => *location,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// Function definitions, struct definitions and global variable declarations
    pub nodes: Vec<AstNode>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
