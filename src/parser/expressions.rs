//! Expression parsing implementation
//!
//! One method per C precedence level, lowest first:
//!
//! ```text
//! assignment  = ternary ( ("=" | "+=" | ...) assignment )?
//! ternary     = logical_or ( "?" expression ":" ternary )?
//! binary      = || && | ^ & (== !=) (< <= > >=) (<< >>) (+ -) (* / %)
//! unary       = ("-" | "!" | "~" | "*" | "&" | "++" | "--") unary | cast | sizeof | postfix
//! postfix     = primary ( "[" e "]" | "(" args ")" | "." id | "->" id | "++" | "--" )*
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

/// Binary precedence table, loosest binding first
const BINARY_LEVELS: &[&[(TokenKind, BinOp)]] = &[
    &[(TokenKind::OrOr, BinOp::Or)],
    &[(TokenKind::AndAnd, BinOp::And)],
    &[(TokenKind::Pipe, BinOp::BitOr)],
    &[(TokenKind::Caret, BinOp::BitXor)],
    &[(TokenKind::Amp, BinOp::BitAnd)],
    &[(TokenKind::EqEq, BinOp::Eq), (TokenKind::NotEq, BinOp::Ne)],
    &[
        (TokenKind::Lt, BinOp::Lt),
        (TokenKind::Le, BinOp::Le),
        (TokenKind::Gt, BinOp::Gt),
        (TokenKind::Ge, BinOp::Ge),
    ],
    &[(TokenKind::LtLt, BinOp::BitShl), (TokenKind::GtGt, BinOp::BitShr)],
    &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
    &[
        (TokenKind::Star, BinOp::Mul),
        (TokenKind::Slash, BinOp::Div),
        (TokenKind::Percent, BinOp::Mod),
    ],
];

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment_expr()
    }

    /// Assignment is right-associative
    pub(crate) fn parse_assignment_expr(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_assignment_level)
    }

    fn parse_assignment_level(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_ternary()?;
        let loc = self.current_location();

        if self.match_token(&TokenKind::Eq) {
            let rhs = Box::new(self.parse_assignment_expr()?);
            return Ok(AstNode::Assignment {
                lhs: Box::new(expr),
                rhs,
                location: loc,
            });
        }

        let compound_op = match self.peek().kind {
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            TokenKind::PercentEq => Some(BinOp::Mod),
            _ => None,
        };

        if let Some(op) = compound_op {
            self.advance();
            let rhs = Box::new(self.parse_assignment_expr()?);
            return Ok(AstNode::CompoundAssignment {
                lhs: Box::new(expr),
                op,
                rhs,
                location: loc,
            });
        }

        Ok(expr)
    }

    fn parse_ternary(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_binary(0)?;

        if self.match_token(&TokenKind::Question) {
            let loc = self.previous_location();
            let true_expr = Box::new(self.parse_expression()?);
            self.expect_token(&TokenKind::Colon, "Expected ':' in ternary expression")?;
            let false_expr = Box::new(self.nested(Self::parse_ternary)?);

            return Ok(AstNode::TernaryOp {
                condition: Box::new(expr),
                true_expr,
                false_expr,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Left-associative binary operators at `BINARY_LEVELS[level]` and tighter
    fn parse_binary(&mut self, level: usize) -> Result<AstNode, ParseError> {
        let Some(operators) = BINARY_LEVELS.get(level) else {
            return self.parse_unary();
        };

        let mut left = self.parse_binary(level + 1)?;
        let entry_depth = self.depth;

        'scan: loop {
            for (token, op) in operators.iter() {
                if self.match_token(token) {
                    let location = self.previous_location();
                    // Each fold nests `left` one node deeper
                    self.descend()?;
                    let right = self.parse_binary(level + 1)?;
                    left = AstNode::BinaryOp {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                        location,
                    };
                    continue 'scan;
                }
            }
            break;
        }

        self.depth = entry_depth;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::Tilde => Some(UnOp::BitNot),
            TokenKind::Star => Some(UnOp::Deref),
            TokenKind::Amp => Some(UnOp::AddrOf),
            TokenKind::PlusPlus => Some(UnOp::PreInc),
            TokenKind::MinusMinus => Some(UnOp::PreDec),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = self.nested(Self::parse_unary)?;
            // Fold negative literals
            if let (UnOp::Neg, AstNode::IntLiteral(n, _)) = (op, &operand) {
                if let Some(negated) = n.checked_neg() {
                    return Ok(AstNode::IntLiteral(negated, loc));
                }
            }
            return Ok(AstNode::UnaryOp {
                op,
                operand: Box::new(operand),
                location: loc,
            });
        }

        // Unary plus is a no-op
        if self.match_token(&TokenKind::Plus) {
            return self.nested(Self::parse_unary);
        }

        if self.match_token(&TokenKind::Sizeof) {
            if self.check(&TokenKind::LParen) && self.type_starts_at(1) {
                self.advance(); // '('
                let target_type = self.parse_type_name()?;
                self.expect_token(&TokenKind::RParen, "Expected ')' after sizeof type")?;
                return Ok(AstNode::SizeofType {
                    target_type,
                    location: loc,
                });
            }
            let expr = self.nested(Self::parse_unary)?;
            return Ok(AstNode::SizeofExpr {
                expr: Box::new(expr),
                location: loc,
            });
        }

        // Cast: `(type) expr`
        if self.check(&TokenKind::LParen) && self.type_starts_at(1) {
            self.advance(); // '('
            let target_type = self.parse_type_name()?;
            self.expect_token(&TokenKind::RParen, "Expected ')' after cast type")?;
            let expr = self.nested(Self::parse_unary)?;
            return Ok(AstNode::Cast {
                target_type,
                expr: Box::new(expr),
                location: loc,
            });
        }

        self.parse_postfix()
    }

    /// Whether the token `n` positions ahead begins a type name
    fn type_starts_at(&self, n: usize) -> bool {
        match self.peek_ahead(n).map(|t| &t.kind) {
            Some(
                TokenKind::Int | TokenKind::Char | TokenKind::Void | TokenKind::Struct | TokenKind::Const,
            ) => true,
            Some(TokenKind::Ident(name)) => self.typedefs.contains_key(name),
            _ => false,
        }
    }

    /// A type with an abstract declarator, as in casts and `sizeof`
    fn parse_type_name(&mut self) -> Result<Type, ParseError> {
        let base = self.parse_type_specifier()?;
        let decl = self.parse_declarator(&base)?;
        if let Some(name) = decl.name {
            return Err(ParseError::new(
                format!("Unexpected name '{}' in type name", name),
                decl.location,
            ));
        }
        Ok(decl.ty)
    }

    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;
        let entry_depth = self.depth;

        loop {
            let loc = self.current_location();
            if self.check_postfix_start() {
                self.descend()?;
            }
            if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "Expected ']' after array index")?;
                expr = AstNode::ArrayAccess {
                    array: Box::new(expr),
                    index: Box::new(index),
                    location: loc,
                };
            } else if self.match_token(&TokenKind::LParen) {
                let args = self.parse_arguments()?;
                expr = AstNode::FunctionCall {
                    callee: Box::new(expr),
                    args,
                    location: loc,
                };
            } else if self.match_token(&TokenKind::Dot) {
                let member = self.expect_identifier()?;
                expr = AstNode::MemberAccess {
                    object: Box::new(expr),
                    member,
                    location: loc,
                };
            } else if self.match_token(&TokenKind::Arrow) {
                let member = self.expect_identifier()?;
                expr = AstNode::PointerMemberAccess {
                    object: Box::new(expr),
                    member,
                    location: loc,
                };
            } else if self.match_token(&TokenKind::PlusPlus) {
                expr = AstNode::UnaryOp {
                    op: UnOp::PostInc,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&TokenKind::MinusMinus) {
                expr = AstNode::UnaryOp {
                    op: UnOp::PostDec,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else {
                break;
            }
        }

        self.depth = entry_depth;
        Ok(expr)
    }

    fn check_postfix_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Dot
                | TokenKind::Arrow
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        )
    }

    /// Arguments after an already consumed `(`, through the closing `)`
    fn parse_arguments(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_assignment_expr()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_token(&TokenKind::RParen, "Expected ')' after function arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let node = match &self.peek().kind {
            TokenKind::IntLiteral(n) => AstNode::IntLiteral(*n, loc),
            TokenKind::CharLiteral(c) => AstNode::CharLiteral(*c, loc),
            TokenKind::StringLiteral(s) => {
                // Adjacent literals concatenate
                let mut text = s.clone();
                self.advance();
                while let TokenKind::StringLiteral(next) = &self.peek().kind {
                    text.push_str(next);
                    self.advance();
                }
                return Ok(AstNode::StringLiteral(text, loc));
            }
            TokenKind::Null => AstNode::Null { location: loc },
            TokenKind::Ident(name) => AstNode::Variable(name.clone(), loc),
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(&TokenKind::RParen, "Expected ')' after expression")?;
                return Ok(expr);
            }
            _ => return Err(self.error_here("Expected expression")),
        };

        self.advance();
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> AstNode {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_expression().unwrap()
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let AstNode::BinaryOp { op, right, .. } = expr("1 + 2 * 3") else {
            panic!("expected binary op");
        };
        assert_eq!(op, BinOp::Add);
        assert!(matches!(*right, AstNode::BinaryOp { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_left_associativity() {
        // 10 - 4 - 3 parses as (10 - 4) - 3
        let AstNode::BinaryOp { left, right, .. } = expr("10 - 4 - 3") else {
            panic!("expected binary op");
        };
        assert!(matches!(*left, AstNode::BinaryOp { op: BinOp::Sub, .. }));
        assert!(matches!(*right, AstNode::IntLiteral(3, _)));
    }

    #[test]
    fn test_postfix_chain() {
        let node = expr("shapes[1]->area(shapes[1])");
        let AstNode::FunctionCall { callee, args, .. } = node else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1);
        assert!(matches!(*callee, AstNode::PointerMemberAccess { ref member, .. } if member == "area"));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let AstNode::Assignment { rhs, .. } = expr("a = b = 3") else {
            panic!("expected assignment");
        };
        assert!(matches!(*rhs, AstNode::Assignment { .. }));
    }

    #[test]
    fn test_negative_literal_folds() {
        assert!(matches!(expr("-5"), AstNode::IntLiteral(-5, _)));
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        assert!(matches!(expr("\"ab\" \"cd\""), AstNode::StringLiteral(ref s, _) if s == "abcd"));
    }
}
