//! Lexical scopes and declarations.
//!
//! Scopes form a tree: each scope keeps three name-keyed collections (one
//! per declaration kind), a link to its parent and the ordered list of its
//! nested scopes. Declarations live in their own arena and are referenced by
//! [`DeclId`] everywhere else, expression back-references included, so the
//! typer can mutate them without aliasing the tree.

use indexmap::IndexMap;
use luxc_lex::Token;
use luxc_util::{define_idx, CompileResult, Handler, IndexVec, Symbol};

use crate::ast::Block;
use crate::ty::TypeId;

define_idx!(
    /// Handle to a [`Scope`] in the [`ScopeTree`].
    ScopeId
);

define_idx!(
    /// Handle to a [`Declaration`] in the [`ScopeTree`].
    DeclId
);

/// The three declaration namespaces of a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Namespace {
    Variable,
    Function,
    Type,
}

/// A single declaration.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: Symbol,
    /// The name token, for diagnostics.
    pub token: Token,
    pub ty: TypeId,
    pub kind: DeclKind,
}

/// Kind-specific declaration payload.
#[derive(Clone, Debug)]
pub enum DeclKind {
    /// A variable; the stack offset is assigned by the emitter.
    Variable { offset: i32, is_global: bool },
    /// A function definition.
    Function(FunctionDecl),
    /// A typedef; the target type is the declaration's `ty`.
    Type,
}

/// The function-specific part of a declaration.
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    /// `None` until the typer fills in `void` for undeclared returns.
    pub return_type: Option<TypeId>,
    pub body: FnBody,
    /// The outer scope holding only the argument declarations; the body
    /// opens a second scope nested inside it.
    pub scope: ScopeId,
}

/// A function body: either statements or raw assembly text.
#[derive(Clone, Debug)]
pub enum FnBody {
    Block(Block),
    Assembly(Symbol),
}

impl Declaration {
    /// The namespace this declaration belongs to.
    pub fn namespace(&self) -> Namespace {
        match self.kind {
            DeclKind::Variable { .. } => Namespace::Variable,
            DeclKind::Function(_) => Namespace::Function,
            DeclKind::Type => Namespace::Type,
        }
    }
}

/// One lexical scope.
#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// Nested scopes in the order they were opened.
    pub children: Vec<ScopeId>,

    pub variables: IndexMap<Symbol, DeclId>,
    pub functions: IndexMap<Symbol, DeclId>,
    pub types: IndexMap<Symbol, DeclId>,
}

impl Scope {
    /// The keyed collection for a namespace.
    pub fn namespace(&self, ns: Namespace) -> &IndexMap<Symbol, DeclId> {
        match ns {
            Namespace::Variable => &self.variables,
            Namespace::Function => &self.functions,
            Namespace::Type => &self.types,
        }
    }

    fn namespace_mut(&mut self, ns: Namespace) -> &mut IndexMap<Symbol, DeclId> {
        match ns {
            Namespace::Variable => &mut self.variables,
            Namespace::Function => &mut self.functions,
            Namespace::Type => &mut self.types,
        }
    }
}

/// The scope graph of a program, plus the declaration arena.
#[derive(Debug, Default)]
pub struct ScopeTree {
    pub scopes: IndexVec<ScopeId, Scope>,
    pub decls: IndexVec<DeclId, Declaration>,
}

impl ScopeTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new scope under `parent`.
    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let scope = self.scopes.push(Scope {
            parent,
            ..Scope::default()
        });
        if let Some(parent) = parent {
            self.scopes[parent].children.push(scope);
        }
        scope
    }

    /// Looks up a name in a namespace, walking parent scopes.
    pub fn lookup(&self, from: ScopeId, name: Symbol, ns: Namespace) -> Option<DeclId> {
        let mut scope = Some(from);
        while let Some(id) = scope {
            if let Some(&decl) = self.scopes[id].namespace(ns).get(&name) {
                return Some(decl);
            }
            scope = self.scopes[id].parent;
        }
        None
    }

    /// Allocates a declaration without attaching it to any scope.
    ///
    /// Used by the for-loop desugaring, which references the loop variable
    /// before its declaration lands in the body scope.
    pub fn alloc_decl(&mut self, decl: Declaration) -> DeclId {
        self.decls.push(decl)
    }

    /// Attaches an allocated declaration to a scope.
    ///
    /// Fails if a declaration of the same kind and name already exists in
    /// the scope or any of its parents.
    pub fn attach_decl(
        &mut self,
        scope: ScopeId,
        decl: DeclId,
        handler: &Handler,
    ) -> CompileResult<()> {
        let (name, ns, span) = {
            let decl = &self.decls[decl];
            (decl.name, decl.namespace(), decl.token.span)
        };

        if self.lookup(scope, name, ns).is_some() {
            return Err(handler.fatal("declaration is existing", span));
        }

        self.scopes[scope].namespace_mut(ns).insert(name, decl);
        Ok(())
    }

    /// Allocates a declaration and attaches it to a scope.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        decl: Declaration,
        handler: &Handler,
    ) -> CompileResult<DeclId> {
        let id = self.alloc_decl(decl);
        self.attach_decl(scope, id, handler)?;
        Ok(id)
    }
}
