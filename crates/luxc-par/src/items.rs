//! Declaration parsing.
//!
//! A declaration is recognised by two tokens of lookahead: an identifier
//! followed by `:` (variable or function) or `::` (typedef). Everything
//! else is a statement. Pure declarations produce no statement; an init
//! expression is turned into a synthetic `name = expr` assignment statement
//! for the enclosing block.

use luxc_lex::{Keyword, Token, TokenKind};
use luxc_util::CompileResult;

use crate::ast::{BinaryOp, Expr, ExprKind, Primary, Stmt};
use crate::expr::EXPRESSION_INIT_PRIORITY;
use crate::scope::{DeclKind, Declaration, FnBody, FunctionDecl};
use crate::Parser;

impl<'a> Parser<'a> {
    /// Tries to parse a declaration at the current position.
    ///
    /// Returns `None` when the lookahead does not start a declaration.
    /// Returns `Some(None)` for a pure declaration and `Some(Some(stmt))`
    /// when the declaration carried an init expression.
    pub(crate) fn try_parse_declaration(&mut self) -> CompileResult<Option<Option<Stmt>>> {
        let name_token = self.lexer.current();
        if name_token.kind != TokenKind::Ident {
            return Ok(None);
        }

        let next = self.lexer.peek(1)?;
        if next.kind != TokenKind::Colon && next.kind != TokenKind::ColonColon {
            return Ok(None);
        }
        let is_typedef = next.kind == TokenKind::ColonColon;

        self.lexer.next()?; // Skip the declaration name.
        let token = self.lexer.next()?; // Skip the : or ::

        if token.is_keyword(Keyword::Func) && !is_typedef {
            self.parse_function(name_token, false)?;
            return Ok(Some(None));
        }
        if token.is_keyword(Keyword::Asm) && !is_typedef {
            self.parse_function(name_token, true)?;
            return Ok(Some(None));
        }

        let declaration = if token.kind == TokenKind::Assign && !is_typedef {
            // name : = expr, the type comes from the init expression.
            Declaration {
                name: name_token.text,
                token: name_token,
                ty: self.types.inferred(),
                kind: DeclKind::Variable {
                    offset: 0,
                    is_global: false,
                },
            }
        } else {
            let ty = self.parse_type()?;
            Declaration {
                name: name_token.text,
                token: name_token,
                ty,
                kind: if is_typedef {
                    DeclKind::Type
                } else {
                    DeclKind::Variable {
                        offset: 0,
                        is_global: false,
                    }
                },
            }
        };

        self.scopes
            .declare(self.current_scope(), declaration, self.handler)?;

        // An init expression becomes an ordinary assignment statement.
        let init = if self.lexer.current().kind == TokenKind::Assign {
            Some(self.parse_init_statement(name_token)?)
        } else {
            None
        };

        self.lexer.skip(TokenKind::Semicolon)?;
        Ok(Some(init))
    }

    fn parse_init_statement(&mut self, name_token: Token) -> CompileResult<Stmt> {
        let operator = self.lexer.consume()?;

        let primary = Expr::new(
            ExprKind::Primary(Primary::Ident {
                name: name_token.text,
                decl: None,
            }),
            name_token,
        );
        let right = self.parse_expression(EXPRESSION_INIT_PRIORITY)?;

        Ok(Stmt::Expression(Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Assign,
                left: Box::new(primary),
                right: Box::new(right),
            },
            operator,
        )))
    }

    /// Parses a function or assembly-function definition after its name.
    ///
    /// Each function owns two scopes: the outer one opened here holds only
    /// the argument declarations, and the body compound opens a second one
    /// nested inside it, so arguments and top-of-body locals cannot collide.
    fn parse_function(&mut self, name_token: Token, is_assembly: bool) -> CompileResult<()> {
        let scope = self.enter_scope();

        self.lexer.next()?; // Skip the func/asm keyword.
        let mut token = self.lexer.skip(TokenKind::LParen)?;

        while token.kind != TokenKind::Eof && token.kind != TokenKind::RParen {
            self.parse_function_argument()?;

            token = self.lexer.current();
            if token.kind != TokenKind::Comma {
                break;
            }
            token = self.lexer.skip(TokenKind::Comma)?;
        }

        let token = self.lexer.skip(TokenKind::RParen)?;

        let return_type = if token.kind == TokenKind::Arrow {
            self.lexer.skip(TokenKind::Arrow)?;
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if is_assembly {
            FnBody::Assembly(self.lexer.assembly_body()?)
        } else {
            match self.parse_compound()? {
                Stmt::Compound(block) => FnBody::Block(block),
                _ => unreachable!("parse_compound returns a compound statement"),
            }
        };

        self.exit_scope();

        self.scopes.declare(
            self.current_scope(),
            Declaration {
                name: name_token.text,
                token: name_token,
                ty: self.types.void_type(),
                kind: DeclKind::Function(FunctionDecl {
                    return_type,
                    body,
                    scope,
                }),
            },
            self.handler,
        )?;

        Ok(())
    }

    /// Parses one `name : type` function argument into the argument scope.
    fn parse_function_argument(&mut self) -> CompileResult<()> {
        let name_token = self.lexer.consume()?;
        if name_token.kind != TokenKind::Ident {
            return Err(self.handler.fatal(
                format!(
                    "expecting an identifier but got {}",
                    name_token.kind.describe()
                ),
                name_token.span,
            ));
        }

        self.lexer.skip(TokenKind::Colon)?;
        let ty = self.parse_type()?;

        self.scopes.declare(
            self.current_scope(),
            Declaration {
                name: name_token.text,
                token: name_token,
                ty,
                kind: DeclKind::Variable {
                    offset: 0,
                    is_global: false,
                },
            },
            self.handler,
        )?;

        Ok(())
    }
}
