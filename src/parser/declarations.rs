//! Declaration parsing
//!
//! Types are parsed in two halves, following C's grammar: a *specifier*
//! (`const int`, `struct Node`, a typedef name) and a *declarator* that adds
//! pointers, the declared name, array dimensions, or a function-pointer shape:
//!
//! ```text
//! int *xs[4];                 pointer depth 1, dims [4]
//! int (*op)(int, int);        function pointer
//! typedef int (*Op)(int, int);
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

/// Result of parsing one declarator
pub(crate) struct Declarator {
    pub name: Option<String>,
    pub ty: Type,
    /// `[]` was written for the outermost dimension
    pub unsized_array: bool,
    pub location: SourceLocation,
}

impl Parser {
    /// Parse a top-level declaration: function definition or prototype,
    /// struct definition, typedef, or global variable(s)
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<Vec<AstNode>, ParseError> {
        if self.match_token(&TokenKind::Typedef) {
            self.parse_typedef()?;
            return Ok(Vec::new());
        }

        let is_static = self.match_token(&TokenKind::Static);
        let base = self.parse_type_specifier()?;

        // Bare struct definition: `struct Name { ... };`
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(Vec::new());
        }

        let first = self.parse_declarator(&base)?;
        let name = first
            .name
            .clone()
            .ok_or_else(|| ParseError::new("Expected a name in declaration", first.location))?;

        if self.check(&TokenKind::LParen) && !first.ty.is_function_pointer() {
            return self.parse_function_rest(name, first.ty, first.location);
        }

        let mut decls = vec![self.finish_var_decl(first, is_static)?];
        while self.match_token(&TokenKind::Comma) {
            let next = self.parse_declarator(&base)?;
            decls.push(self.finish_var_decl(next, is_static)?);
        }
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after declaration")?;
        Ok(decls)
    }

    /// After `type name` when a `(` follows: parameters, then a body or `;`
    fn parse_function_rest(
        &mut self,
        name: String,
        return_type: Type,
        location: SourceLocation,
    ) -> Result<Vec<AstNode>, ParseError> {
        self.expect_token(&TokenKind::LParen, "Expected '(' after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_token(&TokenKind::RParen, "Expected ')' after parameters")?;

        // Prototype: nothing to execute
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(Vec::new());
        }

        self.expect_token(&TokenKind::LBrace, "Expected '{' before function body")?;
        let body = self.parse_block_statements()?;
        self.expect_token(&TokenKind::RBrace, "Expected '}' after function body")?;

        let params = params
            .into_iter()
            .map(|(param_name, param_type)| {
                param_name
                    .map(|name| Param { name, param_type })
                    .ok_or_else(|| ParseError::new(format!("Parameter of '{}' needs a name", name), location))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(vec![AstNode::FunctionDef(FunctionDef {
            name,
            params,
            body,
            return_type,
            location,
        })])
    }

    /// Parse parameter list contents (between the parentheses).
    /// Names are optional so the same code serves prototypes and
    /// function-pointer signatures.
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<(Option<String>, Type)>, ParseError> {
        let mut params = Vec::new();

        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }

        // `(void)` means no parameters
        if self.check(&TokenKind::Void) && self.check_ahead(1, &TokenKind::RParen) {
            self.advance();
            return Ok(params);
        }

        loop {
            let base = self.parse_type_specifier()?;
            let decl = self.parse_declarator(&base)?;
            // Array parameters decay to pointers
            let ty = if decl.ty.is_array() || decl.unsized_array {
                let mut elem = decl.ty.element_type();
                if decl.unsized_array {
                    elem = decl.ty.clone();
                }
                elem.with_pointer()
            } else {
                decl.ty
            };
            params.push((decl.name, ty));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse `[const] base [const]` where base is a keyword type, a struct
    /// (possibly defined inline), or a typedef name
    pub(crate) fn parse_type_specifier(&mut self) -> Result<Type, ParseError> {
        let mut is_const = self.match_token(&TokenKind::Const);
        // `static` on locals is handled by the statement parser; tolerate it here
        self.match_token(&TokenKind::Static);
        is_const |= self.match_token(&TokenKind::Const);

        let mut ty = if self.match_token(&TokenKind::Int) {
            Type::int()
        } else if self.match_token(&TokenKind::Char) {
            Type::char()
        } else if self.match_token(&TokenKind::Void) {
            Type::void()
        } else if self.match_token(&TokenKind::Struct) {
            Type::new(BaseType::Struct(self.parse_struct_specifier(None)?))
        } else if let TokenKind::Ident(name) = &self.peek().kind {
            match self.typedefs.get(name) {
                Some(aliased) => {
                    let aliased = aliased.clone();
                    self.advance();
                    aliased
                }
                None => return Err(self.error_here("Expected type")),
            }
        } else {
            return Err(self.error_here("Expected type"));
        };

        if self.match_token(&TokenKind::Const) {
            is_const = true;
        }
        if is_const {
            ty = ty.with_const();
        }
        Ok(ty)
    }

    /// After `struct`: a name, an inline body, or both. Anonymous structs take
    /// `fallback_name` (the typedef alias) when one is available.
    fn parse_struct_specifier(&mut self, fallback_name: Option<&str>) -> Result<String, ParseError> {
        let loc = self.previous_location();
        let name = if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Some(name)
        } else {
            None
        };

        if !self.check(&TokenKind::LBrace) {
            return name.ok_or_else(|| self.error_here("Expected struct name"));
        }

        let name = name
            .or_else(|| fallback_name.map(str::to_string))
            .ok_or_else(|| ParseError::new("Anonymous structs are only supported in typedefs", loc))?;

        self.advance(); // '{'
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let base = self.parse_type_specifier()?;
            loop {
                let decl = self.parse_declarator(&base)?;
                let field_name = decl
                    .name
                    .ok_or_else(|| ParseError::new("Expected field name", decl.location))?;
                if fields.iter().any(|f: &Field| f.name == field_name) {
                    return Err(ParseError::new(
                        format!("Duplicate field '{}' in struct '{}'", field_name, name),
                        decl.location,
                    ));
                }
                fields.push(Field {
                    name: field_name,
                    field_type: decl.ty,
                });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect_token(&TokenKind::Semicolon, "Expected ';' after struct field")?;
        }
        self.expect_token(&TokenKind::RBrace, "Expected '}' after struct fields")?;

        self.pending_structs.push(AstNode::StructDef {
            name: name.clone(),
            fields,
            location: loc,
        });
        Ok(name)
    }

    /// Parse pointers, the (optional) name, array dimensions and
    /// function-pointer shape on top of an already parsed specifier
    pub(crate) fn parse_declarator(&mut self, base: &Type) -> Result<Declarator, ParseError> {
        let mut ty = base.clone();
        while self.match_token(&TokenKind::Star) {
            ty = ty.with_pointer();
            self.match_token(&TokenKind::Const);
        }

        let location = self.current_location();

        // Function pointer: `(*name)(params)`
        if self.check(&TokenKind::LParen) && self.check_ahead(1, &TokenKind::Star) {
            self.advance(); // '('
            let mut depth = 0;
            while self.match_token(&TokenKind::Star) {
                depth += 1;
            }
            let name = self.optional_identifier();
            self.expect_token(&TokenKind::RParen, "Expected ')' in function pointer declarator")?;
            self.expect_token(&TokenKind::LParen, "Expected '(' for function pointer parameters")?;
            let params = self.nested(Self::parse_parameter_list)?;
            self.expect_token(&TokenKind::RParen, "Expected ')' after function pointer parameters")?;

            let mut fn_type = Type::new(BaseType::Function(Box::new(FunctionSig {
                return_type: ty,
                params: params.into_iter().map(|(_, t)| t).collect(),
            })));
            fn_type.pointer_depth = depth;
            return Ok(Declarator {
                name,
                ty: fn_type,
                unsized_array: false,
                location,
            });
        }

        let name = self.optional_identifier();

        let mut unsized_array = false;
        while self.match_token(&TokenKind::LBracket) {
            if self.match_token(&TokenKind::RBracket) {
                if !ty.array_dims.is_empty() || unsized_array {
                    return Err(ParseError::new(
                        "Only the first array dimension may be left unsized",
                        self.previous_location(),
                    ));
                }
                unsized_array = true;
                continue;
            }
            let size = match self.peek().kind {
                TokenKind::IntLiteral(n) if n > 0 => n as usize,
                _ => return Err(self.error_here("Array size must be a positive integer constant")),
            };
            self.advance();
            self.expect_token(&TokenKind::RBracket, "Expected ']' after array size")?;
            ty = ty.with_array(size);
        }

        Ok(Declarator {
            name,
            ty,
            unsized_array,
            location,
        })
    }

    fn optional_identifier(&mut self) -> Option<String> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Some(name)
        } else {
            None
        }
    }

    /// `typedef <specifier> <declarator>;` — the struct may be anonymous
    fn parse_typedef(&mut self) -> Result<(), ParseError> {
        let base = if self.check(&TokenKind::Struct) && self.anonymous_struct_ahead() {
            self.advance(); // 'struct'
            let alias = self.typedef_alias_after_body()?;
            Type::new(BaseType::Struct(self.parse_struct_specifier(Some(&alias))?))
        } else {
            self.parse_type_specifier()?
        };

        let decl = self.parse_declarator(&base)?;
        let alias = decl
            .name
            .ok_or_else(|| ParseError::new("Expected typedef name", decl.location))?;
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after typedef")?;
        self.typedefs.insert(alias, decl.ty);
        Ok(())
    }

    fn anonymous_struct_ahead(&self) -> bool {
        self.check_ahead(1, &TokenKind::LBrace)
    }

    /// Scan past a `{ ... }` body to find the alias that names an anonymous struct
    fn typedef_alias_after_body(&self) -> Result<String, ParseError> {
        let mut depth = 0usize;
        let mut index = self.position;
        while let Some(token) = self.tokens.get(index) {
            match &token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return match self.tokens.get(index + 1).map(|t| &t.kind) {
                            Some(TokenKind::Ident(name)) => Ok(name.clone()),
                            _ => Err(ParseError::new("Expected typedef name after struct body", token.location)),
                        };
                    }
                }
                TokenKind::Eof => break,
                _ => {}
            }
            index += 1;
        }
        Err(self.error_here("Unterminated struct body"))
    }

    /// Parse an optional initializer and build the declaration node
    pub(crate) fn finish_var_decl(&mut self, decl: Declarator, is_static: bool) -> Result<AstNode, ParseError> {
        let name = decl
            .name
            .ok_or_else(|| ParseError::new("Expected variable name", decl.location))?;
        let mut var_type = decl.ty;

        let init = if self.match_token(&TokenKind::Eq) {
            Some(Box::new(self.parse_initializer()?))
        } else {
            None
        };

        if decl.unsized_array {
            let len = match init.as_deref() {
                Some(AstNode::InitList { elements, .. }) => elements.len(),
                Some(AstNode::StringLiteral(s, _)) => s.len() + 1,
                _ => {
                    return Err(ParseError::new(
                        format!("Array '{}' needs a size or an initializer", name),
                        decl.location,
                    ));
                }
            };
            var_type.array_dims.insert(0, len);
        }

        if var_type.is_void() {
            return Err(ParseError::new(format!("Variable '{}' declared void", name), decl.location));
        }

        Ok(AstNode::VarDecl {
            name,
            var_type,
            init,
            is_static,
            location: decl.location,
        })
    }

    /// An expression or a (possibly nested) brace list
    pub(crate) fn parse_initializer(&mut self) -> Result<AstNode, ParseError> {
        if !self.match_token(&TokenKind::LBrace) {
            return self.parse_assignment_expr();
        }
        let location = self.previous_location();
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            elements.push(self.nested(Self::parse_initializer)?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(&TokenKind::RBrace, "Expected '}' after initializer list")?;
        Ok(AstNode::InitList { elements, location })
    }
}
