//! luxc-par - Syntactic analysis for the Lux language.
//!
//! The parser is a single-threaded recursive-descent pass that builds the
//! AST and the scope graph together. It owns the lexer cursor plus two
//! "current position" pointers: the innermost lexical scope and, while
//! inside a tagged aggregate, the innermost struct scope.
//!
//! Declarations and statements are separated: declarations carry no code by
//! themselves and are pushed onto the current scope, while their optional
//! init expressions become ordinary assignment statements in the enclosing
//! block.

pub mod ast;
pub mod scope;
pub mod ty;

mod expr;
mod items;
mod stmt;
mod types;

#[cfg(test)]
mod edge_cases;

use luxc_lex::{Lexer, TokenKind};
use luxc_util::{CompileResult, Handler};

use crate::ast::{Block, CodeUnit, Program, Stmt};
use crate::scope::{DeclKind, ScopeId, ScopeTree};
use crate::ty::{StructScopeId, TypeTable};

/// The parser state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    handler: &'a Handler,

    scopes: ScopeTree,
    types: TypeTable,

    current_scope: Option<ScopeId>,
    current_struct_scope: Option<StructScopeId>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over a lexer and primes the token window.
    pub fn new(lexer: Lexer<'a>, handler: &'a Handler) -> CompileResult<Self> {
        let mut parser = Self {
            lexer,
            handler,
            scopes: ScopeTree::new(),
            types: TypeTable::new(),
            current_scope: None,
            current_struct_scope: None,
        };
        parser.lexer.next()?;
        Ok(parser)
    }

    /// Parses the whole translation unit into a program.
    pub fn parse_program(mut self) -> CompileResult<Program> {
        let unit = self.parse_code_unit()?;
        Ok(Program {
            code_units: vec![unit],
            scopes: self.scopes,
            types: self.types,
        })
    }

    /// Parses one code unit: the top-level block of the current lexer.
    fn parse_code_unit(&mut self) -> CompileResult<CodeUnit> {
        let body = self.parse_block()?;
        let global_scope = body.scope;

        // Everything declared at the top level is global.
        let globals: Vec<_> = self.scopes.scopes[global_scope]
            .variables
            .values()
            .copied()
            .collect();
        for decl in globals {
            if let DeclKind::Variable { is_global, .. } = &mut self.scopes.decls[decl].kind {
                *is_global = true;
            }
        }

        Ok(CodeUnit {
            file_name: self.lexer.file_name(),
            global_scope,
            body,
        })
    }

    /// Opens a new scope nested in the current one and makes it current.
    fn enter_scope(&mut self) -> ScopeId {
        let scope = self.scopes.new_scope(self.current_scope);
        self.current_scope = Some(scope);
        scope
    }

    /// Restores the parent of the current scope.
    fn exit_scope(&mut self) {
        let current = self.current_scope.expect("no scope to exit");
        self.current_scope = self.scopes.scopes[current].parent;
    }

    /// The scope declarations are currently pushed onto.
    fn current_scope(&self) -> ScopeId {
        self.current_scope.expect("no current scope")
    }

    /// Parses statements and declarations until `}` or end of file.
    ///
    /// An empty block yields a compound with zero statements and a fresh
    /// scope.
    fn parse_block(&mut self) -> CompileResult<Block> {
        let scope = self.enter_scope();
        let mut stmts = Vec::new();

        loop {
            let token = self.lexer.current();
            if token.kind == TokenKind::Eof || token.kind == TokenKind::RBrace {
                break;
            }

            if let Some(init) = self.try_parse_declaration()? {
                if let Some(stmt) = init {
                    stmts.push(stmt);
                }
            } else {
                let stmt = self.parse_statement()?;
                stmts.push(stmt);
            }
        }

        self.exit_scope();
        Ok(Block { stmts, scope })
    }

    /// Parses `{ block }`.
    fn parse_compound(&mut self) -> CompileResult<Stmt> {
        self.lexer.skip(TokenKind::LBrace)?;
        let block = self.parse_block()?;
        self.lexer.skip(TokenKind::RBrace)?;
        Ok(Stmt::Compound(block))
    }
}
