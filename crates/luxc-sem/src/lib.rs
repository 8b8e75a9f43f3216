//! luxc-sem - Semantic typing for the Lux language.
//!
//! The typer runs a fixed point over the whole program: forward references
//! (a variable whose init mentions a later function, a typedef chain, a
//! struct reaching a typedef through a pointer) mean a single pass cannot
//! finish, so passes repeat while they both make progress and leave work
//! behind. Two flags drive this: `type_resolved` records that at least one
//! new type was assigned this pass, `unresolved_types` that at least one
//! node still lacks one. A pass with no progress but unresolved nodes is a
//! fatal diagnosis.
//!
//! Per scope the order is fixed: typedefs first, then variables, then
//! functions, so struct layout and inference see declaration types as early
//! as possible.

mod infer;
mod types;

#[cfg(test)]
mod edge_cases;

use luxc_lex::Token;
use luxc_par::ast::{Block, Program};
use luxc_par::scope::{DeclId, DeclKind, FnBody, ScopeId};
use luxc_util::{CompileResult, Handler, Span};

/// Types a parsed program in place.
///
/// After success every expression reachable from a function body carries a
/// concrete type, every unknown type has been replaced by its typedef
/// target, and every tagged aggregate has a size, alignment and per-member
/// offsets.
pub fn type_program(program: &mut Program, handler: &Handler) -> CompileResult<()> {
    Typer::new(handler).run(program)
}

/// The typing pass state.
pub struct Typer<'a> {
    handler: &'a Handler,
    current_scope: Option<ScopeId>,

    /// At least one new type was assigned during the current pass.
    type_resolved: bool,
    /// At least one node still lacks a type after the current pass.
    unresolved_types: bool,
    /// The most recent token left unresolved, for the convergence report.
    last_unresolved: Option<Token>,
}

impl<'a> Typer<'a> {
    fn new(handler: &'a Handler) -> Self {
        Self {
            handler,
            current_scope: None,
            type_resolved: false,
            unresolved_types: false,
            last_unresolved: None,
        }
    }

    /// Runs typing passes until the fixed point is reached.
    fn run(&mut self, program: &mut Program) -> CompileResult<()> {
        for index in 0..program.code_units.len() {
            let global_scope = program.code_units[index].global_scope;

            self.unresolved_types = true;
            self.type_resolved = true;

            while self.unresolved_types && self.type_resolved {
                self.type_resolved = false;
                self.unresolved_types = false;
                self.type_scope(global_scope, program)?;
            }

            if self.unresolved_types {
                let span = self
                    .last_unresolved
                    .map(|token| token.span)
                    .unwrap_or(Span::DUMMY);
                return Err(self
                    .handler
                    .fatal("type checking did not converge", span));
            }
        }
        Ok(())
    }

    /// Records a node that could not be typed this pass.
    fn mark_unresolved(&mut self, token: Token) {
        self.unresolved_types = true;
        self.last_unresolved = Some(token);
    }

    /// Types the declarations of one scope, then its functions.
    fn type_scope(&mut self, scope: ScopeId, program: &mut Program) -> CompileResult<()> {
        let saved = self.current_scope;
        self.current_scope = Some(scope);

        let type_decls: Vec<DeclId> = program.scopes.scopes[scope].types.values().copied().collect();
        for decl in type_decls {
            self.resolve_declaration_type(decl, program)?;
        }

        let variables: Vec<DeclId> = program.scopes.scopes[scope]
            .variables
            .values()
            .copied()
            .collect();
        for decl in variables {
            self.resolve_declaration_type(decl, program)?;
        }

        let functions: Vec<DeclId> = program.scopes.scopes[scope]
            .functions
            .values()
            .copied()
            .collect();

        // A function without a declared return type returns void; fill that
        // in before any body is typed so calls can resolve against it. A
        // declared return type may still be a typedef placeholder and is
        // resolved here for the same reason.
        for &decl in &functions {
            let return_type = match &program.scopes.decls[decl].kind {
                DeclKind::Function(function) => function.return_type,
                _ => unreachable!("function list holds only function declarations"),
            };

            let filled = match return_type {
                None => {
                    self.type_resolved = true;
                    Some(program.types.void_type())
                },
                Some(ty) => {
                    let resolved = self.resolve_type(ty, program)?;
                    (resolved != ty).then_some(resolved)
                },
            };

            if let Some(ty) = filled {
                if let DeclKind::Function(function) = &mut program.scopes.decls[decl].kind {
                    function.return_type = Some(ty);
                }
            }
        }

        for decl in functions {
            self.type_function(decl, program)?;
        }

        self.current_scope = saved;
        Ok(())
    }

    /// Types one function: its argument scope, then its body.
    fn type_function(&mut self, decl: DeclId, program: &mut Program) -> CompileResult<()> {
        let arg_scope = match &program.scopes.decls[decl].kind {
            DeclKind::Function(function) => function.scope,
            _ => unreachable!("function list holds only function declarations"),
        };

        self.type_scope(arg_scope, program)?;

        // Detach the body so statements can be typed while the declaration
        // arena stays borrowable; assembly bodies have nothing to type.
        let mut body = match &mut program.scopes.decls[decl].kind {
            DeclKind::Function(function) => match &mut function.body {
                FnBody::Block(block) => {
                    let placeholder = Block {
                        stmts: Vec::new(),
                        scope: block.scope,
                    };
                    Some(std::mem::replace(block, placeholder))
                },
                FnBody::Assembly(_) => None,
            },
            _ => unreachable!(),
        };

        let saved = self.current_scope;
        self.current_scope = Some(arg_scope);
        let result = match body.as_mut() {
            Some(block) => self.type_compound(block, program),
            None => Ok(()),
        };
        self.current_scope = saved;

        if let Some(block) = body {
            match &mut program.scopes.decls[decl].kind {
                DeclKind::Function(function) => function.body = FnBody::Block(block),
                _ => unreachable!(),
            }
        }

        result
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use luxc_lex::Lexer;
    use luxc_par::Parser;
    use luxc_util::Symbol;

    /// Parses and types a source string, panicking on errors.
    pub(crate) fn typecheck(source: &str) -> Program {
        let handler = Handler::new();
        typecheck_with(source, &handler).unwrap_or_else(|_| {
            let rendered: Vec<String> = handler
                .diagnostics()
                .iter()
                .map(|d| d.render(source))
                .collect();
            panic!("typing failed:\n{}", rendered.join("\n"));
        })
    }

    /// Parses and types a source string against the given handler.
    pub(crate) fn typecheck_with(source: &str, handler: &Handler) -> CompileResult<Program> {
        let lexer = Lexer::new(source, Symbol::intern("test.lux"), handler);
        let mut program = Parser::new(lexer, handler)?.parse_program()?;
        type_program(&mut program, handler)?;
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::{typecheck, typecheck_with};
    use super::*;
    use luxc_par::scope::Namespace;
    use luxc_par::ty::TypeKind;
    use luxc_util::Symbol;

    fn function_return(program: &Program, name: &str) -> luxc_par::ty::TypeId {
        let unit = &program.code_units[0];
        let decl = program
            .scopes
            .lookup(unit.global_scope, Symbol::intern(name), Namespace::Function)
            .expect("function is declared");
        match &program.scopes.decls[decl].kind {
            DeclKind::Function(function) => function.return_type.expect("return type filled"),
            _ => panic!("expected a function"),
        }
    }

    #[test]
    fn test_void_return_is_filled() {
        let program = typecheck("f : func () { }");
        let ret = function_return(&program, "f");
        assert!(matches!(program.types[ret].kind, TypeKind::Void));
    }

    #[test]
    fn test_declared_return_is_kept() {
        let program = typecheck("f : func () -> u32 { return 0; }");
        assert_eq!(function_return(&program, "f"), program.types.basic(4, false));
    }

    #[test]
    fn test_forward_typedef_chain_converges() {
        let program = typecheck("first :: second; second :: u32;");
        let unit = &program.code_units[0];
        let first = program
            .scopes
            .lookup(unit.global_scope, Symbol::intern("first"), Namespace::Type)
            .unwrap();
        assert_eq!(
            program.scopes.decls[first].ty,
            program.types.basic(4, false)
        );
    }

    #[test]
    fn test_undeclared_typedef_is_fatal() {
        let handler = Handler::new();
        assert!(typecheck_with("x : missing;", &handler).is_err());
        assert!(handler.has_errors());
    }

    #[test]
    fn test_retyping_is_a_fixed_point() {
        let source = "
            point :: struct { x: u32; y: u32; };
            p : point;
            main : func () -> u32 { q : = p.x + 1; return q; }
        ";
        let handler = Handler::new();
        let mut program = typecheck_with(source, &handler).expect("first run succeeds");

        // The second run may not change anything or report progress.
        let mut typer = Typer::new(&handler);
        typer.unresolved_types = false;
        typer.type_resolved = false;
        let global = program.code_units[0].global_scope;
        typer.type_scope(global, &mut program).expect("second run succeeds");

        assert!(!typer.type_resolved);
        assert!(!typer.unresolved_types);
    }
}
