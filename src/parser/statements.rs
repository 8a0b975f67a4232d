//! Statement parsing implementation
//!
//! Covers declarations inside function bodies, blocks, `if`/`else`, the three
//! loop forms, `switch` with `case`/`default` groups, and the jump statements
//! `break`, `continue` and `return`.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use rustc_hash::FxHashSet;

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_single_statement)
    }

    fn parse_single_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek().kind {
            TokenKind::Return => {
                self.advance();
                self.parse_return_statement()
            }
            TokenKind::If => {
                self.advance();
                self.parse_if_statement()
            }
            TokenKind::While => {
                self.advance();
                self.parse_while_statement()
            }
            TokenKind::Do => {
                self.advance();
                self.parse_do_while_statement()
            }
            TokenKind::For => {
                self.advance();
                self.parse_for_statement()
            }
            TokenKind::Switch => {
                self.advance();
                self.parse_switch_statement()
            }
            TokenKind::Break => {
                self.advance();
                self.expect_token(&TokenKind::Semicolon, "Expected ';' after 'break'")?;
                Ok(AstNode::Break { location: loc })
            }
            TokenKind::Continue => {
                self.advance();
                self.expect_token(&TokenKind::Semicolon, "Expected ';' after 'continue'")?;
                Ok(AstNode::Continue { location: loc })
            }
            TokenKind::LBrace => {
                self.advance();
                let statements = self.parse_block_statements()?;
                self.expect_token(&TokenKind::RBrace, "Expected '}' after block")?;
                Ok(AstNode::Block {
                    statements,
                    location: loc,
                })
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(AstNode::Empty { location: loc })
            }
            TokenKind::Typedef => Err(ParseError::new("typedef is only supported at file scope", loc)),
            _ if self.is_type_start() => self.parse_variable_declaration(),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_token(&TokenKind::Semicolon, "Expected ';' after expression")?;
                Ok(AstNode::ExpressionStatement {
                    expr: Box::new(expr),
                    location: loc,
                })
            }
        }
    }

    /// Parse a local declaration, including the trailing semicolon.
    /// Several declarators produce a [`AstNode::DeclList`].
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();
        let is_static = self.check(&TokenKind::Static)
            || (self.check(&TokenKind::Const) && self.check_ahead(1, &TokenKind::Static));
        let base = self.parse_type_specifier()?;

        let mut decls = Vec::new();
        loop {
            let decl = self.parse_declarator(&base)?;
            decls.push(self.finish_var_decl(decl, is_static)?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after variable declaration")?;

        if !self.pending_structs.is_empty() {
            return Err(ParseError::new("Struct definitions are only supported at file scope", loc));
        }

        if decls.len() == 1 {
            Ok(decls.remove(0))
        } else {
            Ok(AstNode::DeclList { decls, location: loc })
        }
    }

    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let expr = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_token(&TokenKind::Semicolon, "Expected ';' after return")?;

        Ok(AstNode::Return { expr, location: loc })
    }

    fn parse_condition(&mut self, keyword: &str) -> Result<Box<AstNode>, ParseError> {
        self.expect_token(&TokenKind::LParen, &format!("Expected '(' after '{}'", keyword))?;
        let condition = self.parse_expression()?;
        self.expect_token(&TokenKind::RParen, &format!("Expected ')' after {} condition", keyword))?;
        Ok(Box::new(condition))
    }

    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();
        let condition = self.parse_condition("if")?;
        let then_branch = self.parse_statement_or_block()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(self.parse_statement_or_block()?)
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();
        let condition = self.parse_condition("while")?;
        let body = self.parse_statement_or_block()?;

        Ok(AstNode::While {
            condition,
            body,
            location: loc,
        })
    }

    fn parse_do_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();
        let body = self.parse_statement_or_block()?;

        self.expect_token(&TokenKind::While, "Expected 'while' after do body")?;
        let condition = self.parse_condition("do-while")?;
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after do-while")?;

        Ok(AstNode::DoWhile {
            body,
            condition,
            location: loc,
        })
    }

    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&TokenKind::LParen, "Expected '(' after 'for'")?;

        let init = if self.match_token(&TokenKind::Semicolon) {
            None
        } else if self.is_type_start() {
            // The declaration consumes its own semicolon
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let expr = self.parse_expression()?;
            self.expect_token(&TokenKind::Semicolon, "Expected ';' after for init")?;
            Some(Box::new(expr))
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after for condition")?;

        let increment = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(&TokenKind::RParen, "Expected ')' after for clauses")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::For {
            init,
            condition,
            increment,
            body,
            location: loc,
        })
    }

    fn parse_switch_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();
        let expr = self.parse_condition("switch")?;
        self.expect_token(&TokenKind::LBrace, "Expected '{' before switch body")?;

        let mut cases = Vec::new();
        let mut seen_default = false;
        let mut literal_labels = FxHashSet::default();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let case_loc = self.current_location();
            if self.match_token(&TokenKind::Case) {
                let value = self.parse_expression()?;
                let literal = match &value {
                    AstNode::IntLiteral(n, _) => Some(*n),
                    AstNode::CharLiteral(c, _) => Some(*c as i32),
                    _ => None,
                };
                if let Some(n) = literal {
                    if !literal_labels.insert(n) {
                        return Err(ParseError::new(format!("Duplicate case value {}", n), case_loc));
                    }
                }
                self.expect_token(&TokenKind::Colon, "Expected ':' after case value")?;
                cases.push(CaseNode::Case {
                    value: Box::new(value),
                    statements: self.parse_case_body()?,
                    location: case_loc,
                });
            } else if self.match_token(&TokenKind::Default) {
                if seen_default {
                    return Err(ParseError::new("Multiple 'default' labels in switch", case_loc));
                }
                seen_default = true;
                self.expect_token(&TokenKind::Colon, "Expected ':' after 'default'")?;
                cases.push(CaseNode::Default {
                    statements: self.parse_case_body()?,
                    location: case_loc,
                });
            } else {
                return Err(self.error_here("Expected 'case' or 'default' in switch body"));
            }
        }

        self.expect_token(&TokenKind::RBrace, "Expected '}' after switch body")?;

        Ok(AstNode::Switch {
            expr,
            cases,
            location: loc,
        })
    }

    fn parse_case_body(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(&TokenKind::Case)
            && !self.check(&TokenKind::Default)
            && !self.check(&TokenKind::RBrace)
            && !self.is_at_end()
        {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    /// Parse statement or block (for if/while/for bodies)
    fn parse_statement_or_block(&mut self) -> Result<Vec<AstNode>, ParseError> {
        if self.match_token(&TokenKind::LBrace) {
            let statements = self.parse_block_statements()?;
            self.expect_token(&TokenKind::RBrace, "Expected '}' after block")?;
            Ok(statements)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }
}
