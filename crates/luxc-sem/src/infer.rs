//! Expression and statement typing.
//!
//! Expressions are typed bottom-up. A node that cannot be typed yet leaves
//! the unresolved flag set and is revisited on the next pass; a node that
//! already has a type is never touched again, which also guarantees the
//! pointer-arithmetic rewrite happens exactly once.

use luxc_par::ast::{BinaryOp, Block, Expr, ExprKind, Primary, Program, Stmt, UnaryOp};
use luxc_par::scope::Namespace;
use luxc_par::ty::{TypeId, TypeKind};
use luxc_util::CompileResult;

use crate::Typer;

impl<'a> Typer<'a> {
    /// Types the statements of a block after resolving its scope.
    pub(crate) fn type_compound(
        &mut self,
        block: &mut Block,
        program: &mut Program,
    ) -> CompileResult<()> {
        self.type_scope(block.scope, program)?;

        let saved = self.current_scope;
        self.current_scope = Some(block.scope);
        for stmt in &mut block.stmts {
            self.type_statement(stmt, program)?;
        }
        self.current_scope = saved;
        Ok(())
    }

    /// Types one statement.
    pub(crate) fn type_statement(
        &mut self,
        stmt: &mut Stmt,
        program: &mut Program,
    ) -> CompileResult<()> {
        match stmt {
            Stmt::Compound(block) => self.type_compound(block, program),
            Stmt::Expression(expr) => self.type_expression(expr, program),
            Stmt::Return(value) => match value {
                Some(expr) => self.type_expression(expr, program),
                None => Ok(()),
            },
            Stmt::Comment(_) => Ok(()),
            Stmt::Conditional(cond) => {
                self.type_expression(&mut cond.condition, program)?;
                self.type_statement(&mut cond.true_body, program)?;
                if let Some(false_body) = &mut cond.false_body {
                    self.type_statement(false_body, program)?;
                }
                Ok(())
            },
            Stmt::Loop(looped) => {
                // The loop variable lives in the body scope, so the header
                // expressions are typed against it.
                let body_scope = match looped.body.as_ref() {
                    Stmt::Compound(block) => block.scope,
                    _ => unreachable!("loop body is a compound statement"),
                };

                let saved = self.current_scope;
                self.current_scope = Some(body_scope);
                if let Some(init) = &mut looped.init {
                    self.type_statement(init, program)?;
                }
                self.type_expression(&mut looped.condition, program)?;
                if let Some(post) = &mut looped.post {
                    self.type_statement(post, program)?;
                }
                self.current_scope = saved;

                self.type_statement(&mut looped.body, program)
            },
        }
    }

    /// Types one expression tree.
    pub(crate) fn type_expression(
        &mut self,
        expr: &mut Expr,
        program: &mut Program,
    ) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Primary(_) => self.type_primary_expression(expr, program),
            ExprKind::Unary { .. } => self.type_unary_expression(expr, program),
            ExprKind::Binary { .. } => self.type_binary_expression(expr, program),
            ExprKind::Call { .. } => self.type_call_expression(expr, program),
            ExprKind::Dot { .. } => self.type_dot_expression(expr, program),
        }
    }

    fn assign_type(&mut self, expr: &mut Expr, ty: TypeId) {
        expr.ty = Some(ty);
        self.type_resolved = true;
    }

    fn type_primary_expression(
        &mut self,
        expr: &mut Expr,
        program: &mut Program,
    ) -> CompileResult<()> {
        if expr.ty.is_some() {
            return Ok(());
        }

        let token = expr.token;
        let ExprKind::Primary(primary) = &mut expr.kind else {
            unreachable!();
        };

        match primary {
            Primary::Number(_) => {
                let ty = program.types.u64_type();
                self.assign_type(expr, ty);
            },
            Primary::Str(_) => {
                let char_type = program.types.char_type();
                let ty = program.types.pointer_to(char_type);
                self.assign_type(expr, ty);
            },
            Primary::Ident { name, decl } => {
                if decl.is_none() {
                    let scope = self.current_scope.expect("typing happens inside a scope");
                    match program.scopes.lookup(scope, *name, Namespace::Variable) {
                        Some(found) => *decl = Some(found),
                        None => {
                            return Err(self
                                .handler
                                .fatal("variable is not declared", token.span));
                        },
                    }
                }

                let decl = decl.expect("back-reference was just resolved");
                let decl_ty = program.scopes.decls[decl].ty;
                if program.types.is_concrete(decl_ty) {
                    self.assign_type(expr, decl_ty);
                } else {
                    self.mark_unresolved(token);
                }
            },
        }
        Ok(())
    }

    fn type_unary_expression(
        &mut self,
        expr: &mut Expr,
        program: &mut Program,
    ) -> CompileResult<()> {
        if expr.ty.is_some() {
            return Ok(());
        }

        let token = expr.token;
        let ExprKind::Unary { op, operand } = &mut expr.kind else {
            unreachable!();
        };
        let op = *op;

        self.type_expression(operand, program)?;
        let Some(operand_ty) = operand.ty else {
            self.mark_unresolved(token);
            return Ok(());
        };

        match op {
            UnaryOp::AddressOf => {
                let ty = program.types.pointer_to(operand_ty);
                self.assign_type(expr, ty);
            },
            UnaryOp::Deref => match program.types[operand_ty].kind {
                TypeKind::Pointer { pointee, .. } => {
                    self.assign_type(expr, pointee);
                },
                _ => {
                    return Err(self
                        .handler
                        .fatal("cannot dereference a non-pointer", token.span));
                },
            },
        }
        Ok(())
    }

    fn type_call_expression(
        &mut self,
        expr: &mut Expr,
        program: &mut Program,
    ) -> CompileResult<()> {
        if expr.ty.is_some() {
            return Ok(());
        }

        let token = expr.token;
        let ExprKind::Call { callee, arguments } = &mut expr.kind else {
            unreachable!();
        };

        for argument in arguments.iter_mut() {
            self.type_expression(argument, program)?;
        }

        let name = match &callee.kind {
            ExprKind::Primary(Primary::Ident { name, .. }) => *name,
            _ => {
                return Err(self
                    .handler
                    .fatal("only named functions can be called", token.span));
            },
        };

        let scope = self.current_scope.expect("typing happens inside a scope");
        let Some(decl) = program.scopes.lookup(scope, name, Namespace::Function) else {
            return Err(self
                .handler
                .fatal("function is not declared", callee.token.span));
        };

        let return_type = match &program.scopes.decls[decl].kind {
            luxc_par::scope::DeclKind::Function(function) => function.return_type,
            _ => unreachable!("function namespace holds only functions"),
        };

        match return_type {
            Some(ty) if program.types.is_concrete(ty) => self.assign_type(expr, ty),
            // The callee's return type has not been filled in or resolved
            // yet; retry on the next pass.
            _ => self.mark_unresolved(token),
        }
        Ok(())
    }

    fn type_binary_expression(
        &mut self,
        expr: &mut Expr,
        program: &mut Program,
    ) -> CompileResult<()> {
        if expr.ty.is_some() {
            return Ok(());
        }

        let token = expr.token;
        let ExprKind::Binary { op, left, right } = &mut expr.kind else {
            unreachable!();
        };
        let op = *op;

        self.type_expression(right, program)?;
        self.type_expression(left, program)?;

        let Some(right_ty) = right.ty else {
            self.mark_unresolved(token);
            return Ok(());
        };

        // Assignment into an inferred declaration back-fills the
        // declaration's type from the right-hand side.
        if let ExprKind::Primary(Primary::Ident {
            decl: Some(decl), ..
        }) = left.kind
        {
            if matches!(
                program.types[program.scopes.decls[decl].ty].kind,
                TypeKind::Inferred
            ) {
                program.scopes.decls[decl].ty = right_ty;
                left.ty = Some(right_ty);
                self.type_resolved = true;
            }
        }

        let Some(left_ty) = left.ty else {
            self.mark_unresolved(token);
            return Ok(());
        };

        if op == BinaryOp::Add {
            let left_is_pointer = program.types.is_pointer(left_ty);
            let right_is_pointer = program.types.is_pointer(right_ty);

            if left_is_pointer || right_is_pointer {
                if left_is_pointer && right_is_pointer {
                    return Err(self
                        .handler
                        .fatal("cannot use this operator on two pointers", token.span));
                }

                // Normalise to pointer + integer.
                if right_is_pointer {
                    std::mem::swap(left, right);
                }

                let pointee = match program.types[left.ty.expect("pointer side is typed")].kind {
                    TypeKind::Pointer { pointee, .. } => pointee,
                    _ => unreachable!("the pointer side was just checked"),
                };

                // The pointee may be resolved but not yet laid out; the
                // fixed point retries once its size is known.
                let element_size = program.types[pointee].size;
                if element_size == 0 {
                    self.mark_unresolved(token);
                    return Ok(());
                }

                // Rewrite `p + n` into `p + n * sizeof(*p)`.
                let index = std::mem::replace(
                    right.as_mut(),
                    Expr::new(ExprKind::Primary(Primary::Number(0)), token),
                );
                let scale = Expr::new(
                    ExprKind::Primary(Primary::Number(element_size as u64)),
                    token,
                );
                **right = Expr::new(
                    ExprKind::Binary {
                        op: BinaryOp::Mul,
                        left: Box::new(index),
                        right: Box::new(scale),
                    },
                    token,
                );
                self.type_expression(right, program)?;

                let pointer_ty = left.ty.expect("pointer side is typed");
                self.assign_type(expr, pointer_ty);
                return Ok(());
            }
        }

        self.assign_type(expr, left_ty);
        Ok(())
    }

    fn type_dot_expression(
        &mut self,
        expr: &mut Expr,
        program: &mut Program,
    ) -> CompileResult<()> {
        if expr.ty.is_some() {
            return Ok(());
        }

        let token = expr.token;
        let ExprKind::Dot { base, member, offset } = &mut expr.kind else {
            unreachable!();
        };
        let member = *member;

        self.type_expression(base, program)?;
        let Some(mut base_ty) = base.ty else {
            return Ok(());
        };

        // A member of a pointer is a member of what it points at; wrap the
        // base in derefs until a struct appears.
        while let TypeKind::Pointer { pointee, .. } = program.types[base_ty].kind {
            let inner = std::mem::replace(
                base.as_mut(),
                Expr::new(ExprKind::Primary(Primary::Number(0)), token),
            );
            **base = Expr {
                kind: ExprKind::Unary {
                    op: UnaryOp::Deref,
                    operand: Box::new(inner),
                },
                ty: Some(pointee),
                token,
            };
            base_ty = pointee;
        }

        let scope = match &program.types[base_ty].kind {
            TypeKind::Struct(data) => match data.scope {
                Some(scope) => scope,
                None => {
                    return Err(self
                        .handler
                        .fatal("invalid struct member", member.span));
                },
            },
            _ => {
                return Err(self
                    .handler
                    .fatal("only structs have members", member.span));
            },
        };

        // Offsets are only final after layout; retry until then.
        if !program.types.struct_scopes[scope].typing_complete {
            self.mark_unresolved(member);
            return Ok(());
        }

        let Some(entry) = program.types.struct_scopes[scope].find(member.text).copied() else {
            return Err(self.handler.fatal("invalid struct member", member.span));
        };

        let resolved = &program.types.as_struct(entry.owner).members[entry.member];
        *offset = resolved.offset;
        let member_ty = resolved.ty;
        self.assign_type(expr, member_ty);
        Ok(())
    }
}
