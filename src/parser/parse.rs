//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, token helpers, and the program entry point.
//!
//! Parser methods are split across multiple files using `impl Parser` blocks:
//! - `declarations`: types, declarators, structs, typedefs, functions, globals
//! - `statements`: statements and blocks
//! - `expressions`: expressions with one method per precedence level

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Deepest nesting of expressions, statements, initializers and function
/// pointer parameter lists the parser accepts
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// `typedef` aliases seen so far
    pub(crate) typedefs: FxHashMap<String, Type>,
    /// Struct definitions met inside type specifiers, flushed before the
    /// declaration that contained them
    pub(crate) pending_structs: Vec<AstNode>,
    /// Current nesting level, bounded by [`MAX_NESTING_DEPTH`]
    pub(crate) depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            typedefs: FxHashMap::default(),
            pending_structs: Vec::new(),
            depth: 0,
        })
    }

    /// Parse the entire program (top-level declarations)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let decls = self.parse_top_level_declaration()?;
            program.nodes.append(&mut self.pending_structs);
            program.nodes.extend(decls);
        }

        Ok(program)
    }

    // ===== Helper methods =====

    /// Whether the current token can begin a declaration
    pub(crate) fn is_type_start(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Int
            | TokenKind::Char
            | TokenKind::Void
            | TokenKind::Struct
            | TokenKind::Const
            | TokenKind::Static => true,
            TokenKind::Ident(name) => self.typedefs.contains_key(name),
            _ => false,
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn check_ahead(&self, n: usize, kind: &TokenKind) -> bool {
        self.peek_ahead(n)
            .is_some_and(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind, message: &str) -> Result<(), ParseError> {
        if self.match_token(kind) {
            Ok(())
        } else {
            Err(self.error_here(message))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_here("Expected identifier"))
        }
    }

    /// Error that names the offending token
    /// Enter one nesting level. The caller restores `depth` when it is done.
    pub(crate) fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::new("Expression nested too deeply", self.current_location()));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `parse` one nesting level deeper
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.descend()?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn error_here(&self, message: &str) -> ParseError {
        ParseError::new(
            format!("{}, found {}", message, self.peek().kind),
            self.current_location(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new(source)?.parse_program()
    }

    #[test]
    fn test_function_and_struct() {
        let program = parse(
            "struct Point { int x; int y; };\nint main(void) { struct Point p; p.x = 1; return p.x; }",
        )
        .unwrap();
        assert_eq!(program.nodes.len(), 2);
        assert!(matches!(&program.nodes[0], AstNode::StructDef { name, fields, .. } if name == "Point" && fields.len() == 2));
        assert!(matches!(&program.nodes[1], AstNode::FunctionDef(def) if def.name == "main" && def.body.len() == 3));
    }

    #[test]
    fn test_typedef_struct_is_flushed_before_use() {
        let program = parse("typedef struct { int id; } Item;\nItem make(void);\nint main(void) { Item it; it.id = 3; return 0; }").unwrap();
        assert!(matches!(&program.nodes[0], AstNode::StructDef { name, .. } if name == "Item"));
        // The prototype produces no node
        assert_eq!(program.nodes.len(), 2);
    }

    #[test]
    fn test_function_pointer_declarators() {
        let program = parse(
            "typedef int (*BinaryOp)(int, int);\nstruct Shape { int (*area)(struct Shape *self); };\nint main(void) { BinaryOp op; int (*f)(int, int) = op; return 0; }",
        )
        .unwrap();
        let AstNode::StructDef { fields, .. } = &program.nodes[0] else {
            panic!("expected struct definition");
        };
        assert!(fields[0].field_type.is_function_pointer());

        let AstNode::FunctionDef(main) = &program.nodes[1] else {
            panic!("expected main");
        };
        let AstNode::VarDecl { var_type, .. } = &main.body[1] else {
            panic!("expected declaration");
        };
        assert!(var_type.is_function_pointer());
        assert_eq!(var_type.signature().map(|s| s.params.len()), Some(2));
    }

    #[test]
    fn test_unsized_array_takes_initializer_length() {
        let program = parse("int main(void) { int xs[] = {1, 2, 3}; char s[] = \"hi\"; return 0; }").unwrap();
        let AstNode::FunctionDef(main) = &program.nodes[0] else {
            panic!("expected main");
        };
        let dims: Vec<Vec<usize>> = main
            .body
            .iter()
            .filter_map(|n| match n {
                AstNode::VarDecl { var_type, .. } => Some(var_type.array_dims.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(dims, vec![vec![3], vec![3]]);
    }

    #[test]
    fn test_cast_and_sizeof() {
        let program = parse(
            "struct Node { int v; };\nint main(void) { struct Node *n = (struct Node *)malloc(sizeof(struct Node)); int k = sizeof n; return 0; }",
        );
        assert!(program.is_ok(), "{:?}", program.err());
    }

    #[test]
    fn test_missing_semicolon_reports_location() {
        let err = parse("int main(void) {\n  int x = 1\n  return x;\n}").unwrap_err();
        assert_eq!(err.location.line, 3);
        assert!(err.to_string().starts_with("Parse error at line 3"));
        assert!(err.message.contains("Expected ';'"));
    }

    #[test]
    fn test_duplicate_literal_case_rejected() {
        let err = parse("int main(void) {\n  switch (1) {\n    case 1: break;\n    case 1: break;\n  }\n  return 0;\n}")
            .unwrap_err();
        assert_eq!(err.message, "Duplicate case value 1");
        assert_eq!(err.location.line, 4);

        let err = parse("int main(void) { switch (65) { case 'A': break; case 65: break; } return 0; }").unwrap_err();
        assert_eq!(err.message, "Duplicate case value 65");
    }

    #[test]
    fn test_nesting_limit() {
        let source = format!("int main(void) {{ return {}1; }}", "!".repeat(MAX_NESTING_DEPTH + 10));
        let err = parse(&source).unwrap_err();
        assert_eq!(err.message, "Expression nested too deeply");

        let source = format!("int main(void) {{ return {}1; }}", "!".repeat(100));
        assert!(parse(&source).is_ok());
    }

    #[test]
    fn test_sibling_nodes_do_not_accumulate_depth() {
        let body = "x = x + 1 + 2 + 3; ".repeat(MAX_NESTING_DEPTH * 2);
        let source = format!("int main(void) {{ int x = 0; {} return x; }}", body);
        let mut parser = Parser::new(&source).unwrap();
        assert!(parser.parse_program().is_ok());
        assert_eq!(parser.depth, 0);
    }
}
