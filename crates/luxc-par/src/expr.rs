//! Expression parsing by precedence climbing.
//!
//! One recursive routine parses a unary expression as the left-hand side
//! and then loops: if the next token is a binary operator that binds
//! tighter than the running priority, it consumes the operator and recurses
//! with the new priority as the floor. Equal priority does not recurse, so
//! every operator is left-associative.

use luxc_lex::TokenKind;
use luxc_util::CompileResult;

use crate::ast::{binary_precedence, BinaryOp, Expr, ExprKind, Primary, UnaryOp};
use crate::Parser;

/// The priority every initial call to [`Parser::parse_expression`] uses.
pub(crate) const EXPRESSION_INIT_PRIORITY: i8 = -1;

impl<'a> Parser<'a> {
    /// Parses an expression whose operators bind tighter than `priority`.
    pub(crate) fn parse_expression(&mut self, priority: i8) -> CompileResult<Expr> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let token = self.lexer.current();
            let new_priority = binary_precedence(token.kind);

            // The zero check ends the climb when the expression ends.
            if new_priority == 0 || new_priority <= priority {
                return Ok(left);
            }

            let op = BinaryOp::from_token(token.kind).expect("precedence implies an operator");
            let operator = self.lexer.consume()?;
            let right = self.parse_expression(new_priority)?;

            // The new binary node becomes the left-hand side.
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                operator,
            );
        }
    }

    /// Parses a unary expression: a prefix operator, a parenthesised
    /// sub-expression, or a primary with its suffix chain.
    fn parse_unary_expression(&mut self) -> CompileResult<Expr> {
        let token = self.lexer.consume()?;

        match token.kind {
            TokenKind::LParen => {
                let expression = self.parse_expression(EXPRESSION_INIT_PRIORITY)?;
                self.lexer.skip(TokenKind::RParen)?;
                self.parse_suffix_expression(expression)
            },
            TokenKind::Star => {
                let operand = self.parse_unary_expression()?;
                Ok(Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::AddressOf,
                        operand: Box::new(operand),
                    },
                    token,
                ))
            },
            TokenKind::At => {
                let operand = self.parse_unary_expression()?;
                Ok(Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Deref,
                        operand: Box::new(operand),
                    },
                    token,
                ))
            },
            _ => {
                self.lexer.undo();
                let primary = self.parse_primary_expression()?;
                self.parse_suffix_expression(primary)
            },
        }
    }

    /// Parses the suffix chain after a left-hand side: calls, index
    /// expressions and member accesses.
    fn parse_suffix_expression(&mut self, previous: Expr) -> CompileResult<Expr> {
        let token = self.lexer.consume()?;

        match token.kind {
            TokenKind::LParen => {
                let mut arguments = Vec::new();

                loop {
                    let current = self.lexer.current();
                    if current.kind == TokenKind::RParen || current.kind == TokenKind::Eof {
                        break;
                    }

                    arguments.push(self.parse_expression(EXPRESSION_INIT_PRIORITY)?);

                    if self.lexer.current().kind == TokenKind::RParen {
                        break;
                    }
                    self.lexer.skip(TokenKind::Comma)?;
                }

                self.lexer.skip(TokenKind::RParen)?;

                let call = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(previous),
                        arguments,
                    },
                    token,
                );
                self.parse_suffix_expression(call)
            },
            TokenKind::LBracket => {
                // a[i] is rewritten to @(a + i); the typer scales the index.
                let index = self.parse_expression(EXPRESSION_INIT_PRIORITY)?;
                self.lexer.skip(TokenKind::RBracket)?;

                let plus = Expr::new(
                    ExprKind::Binary {
                        op: BinaryOp::Add,
                        left: Box::new(previous),
                        right: Box::new(index),
                    },
                    token,
                );
                let deref = Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Deref,
                        operand: Box::new(plus),
                    },
                    token,
                );
                self.parse_suffix_expression(deref)
            },
            TokenKind::Dot => {
                let member = self.lexer.current();
                if member.kind != TokenKind::Ident {
                    return Err(self.handler.fatal(
                        format!(
                            "expecting an identifier but got {}",
                            member.kind.describe()
                        ),
                        member.span,
                    ));
                }
                self.lexer.next()?;

                let dot = Expr::new(
                    ExprKind::Dot {
                        base: Box::new(previous),
                        member,
                        offset: 0,
                    },
                    token,
                );
                self.parse_suffix_expression(dot)
            },
            _ => {
                self.lexer.undo();
                Ok(previous)
            },
        }
    }

    /// Parses a primary expression: a number, a string, or an identifier.
    fn parse_primary_expression(&mut self) -> CompileResult<Expr> {
        let token = self.lexer.consume()?;

        let primary = match token.kind {
            TokenKind::Number => Primary::Number(token.value),
            TokenKind::Ident => Primary::Ident {
                name: token.text,
                decl: None,
            },
            TokenKind::Str => Primary::Str(token.text),
            _ => {
                return Err(self
                    .handler
                    .fatal("not a primary expression", token.span));
            },
        };

        Ok(Expr::new(ExprKind::Primary(primary), token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxc_lex::Lexer;
    use luxc_util::{Handler, Symbol};

    fn parse_expr(source: &str) -> Expr {
        let handler = Handler::new();
        let lexer = Lexer::new(source, Symbol::intern("t"), &handler);
        let mut parser = Parser::new(lexer, &handler).unwrap();
        parser
            .parse_expression(EXPRESSION_INIT_PRIORITY)
            .expect("expression should parse")
    }

    fn as_binary(expr: &Expr) -> (BinaryOp, &Expr, &Expr) {
        match &expr.kind {
            ExprKind::Binary { op, left, right } => (*op, left, right),
            kind => panic!("expected a binary expression, found {:?}", kind),
        }
    }

    fn number_of(expr: &Expr) -> u64 {
        match &expr.kind {
            ExprKind::Primary(Primary::Number(value)) => *value,
            kind => panic!("expected a number, found {:?}", kind),
        }
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let expr = parse_expr("1 + 2 * 3");
        let (op, left, right) = as_binary(&expr);
        assert_eq!(op, BinaryOp::Add);
        assert_eq!(number_of(left), 1);

        let (op, left, right) = as_binary(right);
        assert_eq!(op, BinaryOp::Mul);
        assert_eq!(number_of(left), 2);
        assert_eq!(number_of(right), 3);
    }

    #[test]
    fn test_left_associativity() {
        let expr = parse_expr("10 - 4 - 3");
        let (op, left, right) = as_binary(&expr);
        assert_eq!(op, BinaryOp::Sub);
        assert_eq!(number_of(right), 3);

        let (op, left, right) = as_binary(left);
        assert_eq!(op, BinaryOp::Sub);
        assert_eq!(number_of(left), 10);
        assert_eq!(number_of(right), 4);
    }

    #[test]
    fn test_assignment_binds_loosest() {
        let expr = parse_expr("a = 1 + 2");
        let (op, _, right) = as_binary(&expr);
        assert_eq!(op, BinaryOp::Assign);
        let (op, _, _) = as_binary(right);
        assert_eq!(op, BinaryOp::Add);
    }

    #[test]
    fn test_comparison_above_equality() {
        let expr = parse_expr("1 < 2 == 3 < 4");
        let (op, left, right) = as_binary(&expr);
        assert_eq!(op, BinaryOp::Eq);
        assert_eq!(as_binary(left).0, BinaryOp::Lt);
        assert_eq!(as_binary(right).0, BinaryOp::Lt);
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse_expr("(1 + 2) * 3");
        let (op, left, _) = as_binary(&expr);
        assert_eq!(op, BinaryOp::Mul);
        assert_eq!(as_binary(left).0, BinaryOp::Add);
    }

    #[test]
    fn test_unary_prefixes() {
        let expr = parse_expr("@p");
        assert!(matches!(
            expr.kind,
            ExprKind::Unary {
                op: UnaryOp::Deref,
                ..
            }
        ));

        let expr = parse_expr("*p");
        assert!(matches!(
            expr.kind,
            ExprKind::Unary {
                op: UnaryOp::AddressOf,
                ..
            }
        ));
    }

    #[test]
    fn test_call_with_arguments() {
        let expr = parse_expr("f(1, 2, 3)");
        match &expr.kind {
            ExprKind::Call { callee, arguments } => {
                assert!(matches!(
                    &callee.kind,
                    ExprKind::Primary(Primary::Ident { .. })
                ));
                assert_eq!(arguments.len(), 3);
            },
            kind => panic!("expected a call, found {:?}", kind),
        }
    }

    #[test]
    fn test_call_with_trailing_expression_without_comma() {
        let expr = parse_expr("f(1, 2)");
        match &expr.kind {
            ExprKind::Call { arguments, .. } => assert_eq!(arguments.len(), 2),
            kind => panic!("expected a call, found {:?}", kind),
        }
    }

    #[test]
    fn test_index_desugars_to_deref_of_plus() {
        let expr = parse_expr("a[4]");
        match &expr.kind {
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => {
                let (op, _, right) = as_binary(operand);
                assert_eq!(op, BinaryOp::Add);
                assert_eq!(number_of(right), 4);
            },
            kind => panic!("expected a deref, found {:?}", kind),
        }
    }

    #[test]
    fn test_dot_member() {
        let expr = parse_expr("p.x");
        match &expr.kind {
            ExprKind::Dot { member, offset, .. } => {
                assert_eq!(member.text.as_str(), "x");
                assert_eq!(*offset, 0);
            },
            kind => panic!("expected a member access, found {:?}", kind),
        }
    }

    #[test]
    fn test_chained_suffixes() {
        let expr = parse_expr("f(1).x");
        match &expr.kind {
            ExprKind::Dot { base, .. } => {
                assert!(matches!(&base.kind, ExprKind::Call { .. }));
            },
            kind => panic!("expected a member access, found {:?}", kind),
        }
    }

    #[test]
    fn test_non_primary_is_fatal() {
        let handler = Handler::new();
        let lexer = Lexer::new("; 1", Symbol::intern("t"), &handler);
        let mut parser = Parser::new(lexer, &handler).unwrap();
        assert!(parser.parse_expression(EXPRESSION_INIT_PRIORITY).is_err());
        assert!(handler.has_errors());
    }
}
