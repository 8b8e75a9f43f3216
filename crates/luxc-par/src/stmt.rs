//! Statement parsing.
//!
//! Statements either start with a keyword (`return`, `if`, `while`, `for`),
//! a brace (nested compound), a comment token, or fall through to an
//! expression statement. The `for` range loop is desugared here so the
//! typer and the emitter only ever see the plain `Loop` shape.

use luxc_lex::{Keyword, Token, TokenKind};
use luxc_util::CompileResult;

use crate::ast::{BinaryOp, ConditionalStmt, Expr, ExprKind, LoopStmt, Primary, Stmt};
use crate::expr::EXPRESSION_INIT_PRIORITY;
use crate::scope::{DeclKind, Declaration};
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses a single statement.
    pub(crate) fn parse_statement(&mut self) -> CompileResult<Stmt> {
        let token = self.lexer.current();

        if token.kind == TokenKind::Comment {
            self.lexer.skip(TokenKind::Comment)?;
            return Ok(Stmt::Comment(token));
        }
        if token.kind == TokenKind::LBrace {
            return self.parse_compound();
        }
        if token.is_keyword(Keyword::Return) {
            return self.parse_return_statement();
        }
        if token.is_keyword(Keyword::For) {
            return self.parse_for_statement();
        }
        if token.is_keyword(Keyword::While) {
            return self.parse_while_statement();
        }
        if token.is_keyword(Keyword::If) {
            return self.parse_if_statement();
        }

        self.parse_expression_statement()
    }

    fn parse_expression_statement(&mut self) -> CompileResult<Stmt> {
        let expression = self.parse_expression(EXPRESSION_INIT_PRIORITY)?;
        self.lexer.skip(TokenKind::Semicolon)?;
        Ok(Stmt::Expression(expression))
    }

    fn parse_return_statement(&mut self) -> CompileResult<Stmt> {
        self.lexer.next()?;

        let value = if self.lexer.current().kind == TokenKind::Semicolon {
            None
        } else {
            Some(self.parse_expression(EXPRESSION_INIT_PRIORITY)?)
        };

        self.lexer.skip(TokenKind::Semicolon)?;
        Ok(Stmt::Return(value))
    }

    fn parse_if_statement(&mut self) -> CompileResult<Stmt> {
        self.lexer.next()?;

        let condition = self.parse_expression(EXPRESSION_INIT_PRIORITY)?;
        let true_body = self.parse_compound()?;

        let token = self.lexer.current();
        let false_body = if token.is_keyword(Keyword::Else) {
            let token = self.lexer.next()?;
            let body = if token.is_keyword(Keyword::If) {
                self.parse_if_statement()?
            } else {
                self.parse_compound()?
            };
            Some(Box::new(body))
        } else {
            None
        };

        Ok(Stmt::Conditional(ConditionalStmt {
            condition,
            true_body: Box::new(true_body),
            false_body,
        }))
    }

    fn parse_while_statement(&mut self) -> CompileResult<Stmt> {
        self.lexer.next()?;

        let condition = self.parse_expression(EXPRESSION_INIT_PRIORITY)?;
        let body = self.parse_compound()?;

        Ok(Stmt::Loop(LoopStmt {
            init: None,
            condition,
            post: None,
            body: Box::new(body),
        }))
    }

    /// Parses `for name in start..end { body }`.
    ///
    /// Desugars to a loop with init `name = start`, condition
    /// `name <= end`, post `name = name + 1`, and pushes a fresh inferred
    /// declaration of `name` into the body scope. The upper bound is
    /// inclusive.
    fn parse_for_statement(&mut self) -> CompileResult<Stmt> {
        let name_token = self.lexer.expect(TokenKind::Ident)?;

        let decl = self.scopes.alloc_decl(Declaration {
            name: name_token.text,
            token: name_token,
            ty: self.types.inferred(),
            kind: DeclKind::Variable {
                offset: 0,
                is_global: false,
            },
        });

        self.lexer.next()?;
        self.lexer.skip_keyword(Keyword::In)?;

        let name_expr = || {
            Expr::new(
                ExprKind::Primary(Primary::Ident {
                    name: name_token.text,
                    decl: Some(decl),
                }),
                name_token,
            )
        };

        let start = self.parse_expression(EXPRESSION_INIT_PRIORITY)?;
        let init = Stmt::Expression(assign(name_expr(), start, name_token));

        self.lexer.skip(TokenKind::DotDot)?;

        let end = self.parse_expression(EXPRESSION_INIT_PRIORITY)?;
        let condition = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Le,
                left: Box::new(name_expr()),
                right: Box::new(end),
            },
            name_token,
        );

        let one = Expr::new(ExprKind::Primary(Primary::Number(1)), name_token);
        let step = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(name_expr()),
                right: Box::new(one),
            },
            name_token,
        );
        let post = Stmt::Expression(assign(name_expr(), step, name_token));

        let body = self.parse_compound()?;
        let body_scope = match &body {
            Stmt::Compound(block) => block.scope,
            _ => unreachable!("loop body is a compound statement"),
        };
        self.scopes.attach_decl(body_scope, decl, self.handler)?;

        Ok(Stmt::Loop(LoopStmt {
            init: Some(Box::new(init)),
            condition,
            post: Some(Box::new(post)),
            body: Box::new(body),
        }))
    }
}

/// Builds a `left = right` expression statement node.
fn assign(left: Expr, right: Expr, token: Token) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op: BinaryOp::Assign,
            left: Box::new(left),
            right: Box::new(right),
        },
        token,
    )
}
