//! Type resolution and aggregate layout.
//!
//! Resolution replaces `Unknown` placeholders with their typedef targets,
//! recurses through pointers, and walks struct members via the tagged
//! scope. Once every member of a tagged aggregate is concrete the scope is
//! marked complete and the aggregate is laid out: offsets for structs, all
//! zero for unions, and a fix-up pass that turns the members of anonymous
//! nested aggregates into absolute offsets from the outermost type.

use luxc_par::ast::Program;
use luxc_par::scope::{DeclId, Namespace};
use luxc_par::ty::{TypeId, TypeKind, TypeTable};
use luxc_util::CompileResult;

use crate::Typer;

/// Rounds `number` up to the next multiple of `alignment`.
pub(crate) fn align(number: u32, alignment: u32) -> u32 {
    let offset = number % alignment;
    if offset != 0 {
        number - offset + alignment
    } else {
        number
    }
}

impl<'a> Typer<'a> {
    /// Resolves one declaration's type, laying out aggregates when they
    /// become complete.
    pub(crate) fn resolve_declaration_type(
        &mut self,
        decl: DeclId,
        program: &mut Program,
    ) -> CompileResult<()> {
        let ty = program.scopes.decls[decl].ty;

        // A struct that has already been laid out has nothing left to do.
        if let TypeKind::Struct(data) = &program.types[ty].kind {
            if let Some(scope) = data.scope {
                if program.types.struct_scopes[scope].typing_complete {
                    return Ok(());
                }
            }
        }

        // The unresolved flag is shared by the whole pass; isolate it so we
        // can tell whether this particular declaration is still incomplete.
        let saved_unresolved = self.unresolved_types;
        self.unresolved_types = false;

        let resolved = self.resolve_type(ty, program)?;
        if resolved != ty {
            program.scopes.decls[decl].ty = resolved;
            self.type_resolved = true;
        }

        if let TypeKind::Struct(data) = &program.types[resolved].kind {
            if let Some(scope) = data.scope {
                // Several declarations can reach the same struct through
                // typedefs; layout must wait until every member is truly
                // concrete and sized, not just until this declaration's own
                // resolution went through.
                let complete = !self.unresolved_types && struct_scope_ready(program, scope);
                program.types.struct_scopes[scope].typing_complete = complete;
                if complete {
                    compute_struct_offsets(&mut program.types, resolved);
                    fix_struct_offsets(&mut program.types, resolved, 0);
                    self.type_resolved = true;
                }
            }
        }

        self.unresolved_types = self.unresolved_types || saved_unresolved;
        Ok(())
    }

    /// Resolves a type, returning the (possibly replaced) id.
    pub(crate) fn resolve_type(
        &mut self,
        ty: TypeId,
        program: &mut Program,
    ) -> CompileResult<TypeId> {
        match program.types[ty].kind.clone() {
            TypeKind::Basic { .. } | TypeKind::Void | TypeKind::Inferred => Ok(ty),
            TypeKind::Pointer { pointee, count } => {
                let resolved = self.resolve_type(pointee, program)?;
                if resolved != pointee {
                    if let TypeKind::Pointer { pointee, .. } = &mut program.types[ty].kind {
                        *pointee = resolved;
                    }
                }

                // A fixed-size array only knows its size once the element
                // type does.
                if count != 0 {
                    let element_size = program.types[resolved].size;
                    if element_size != 0 {
                        program.types[ty].size = count * element_size;
                    }
                }
                Ok(ty)
            },
            TypeKind::Unknown { token } => {
                let scope = self.current_scope.expect("resolution happens inside a scope");
                match program
                    .scopes
                    .lookup(scope, token.text, Namespace::Type)
                {
                    Some(decl) => {
                        let target = program.scopes.decls[decl].ty;
                        if program.types.is_concrete(target) {
                            self.type_resolved = true;
                            Ok(target)
                        } else {
                            self.mark_unresolved(token);
                            Ok(ty)
                        }
                    },
                    None => Err(self.handler.fatal(
                        format!("unknown type '{}'", token.text),
                        token.span,
                    )),
                }
            },
            TypeKind::Struct(data) => {
                // Resolve through the tagged scope: it holds every named
                // member, including those hoisted out of anonymous nested
                // aggregates.
                let Some(scope) = data.scope else {
                    return Ok(ty);
                };
                if program.types.struct_scopes[scope].typing_complete {
                    return Ok(ty);
                }

                let entries = program.types.struct_scopes[scope].entries.clone();
                for entry in entries {
                    let member_ty =
                        program.types.as_struct(entry.owner).members[entry.member].ty;
                    let resolved = self.resolve_type(member_ty, program)?;
                    if resolved != member_ty {
                        program.types.as_struct_mut(entry.owner).members[entry.member].ty =
                            resolved;
                    }
                    // A member is only usable once its own layout is known;
                    // a concrete struct of size zero has not been laid out
                    // yet.
                    if !program.types.is_concrete(resolved) || program.types[resolved].size == 0 {
                        self.mark_unresolved(entry.token);
                    }
                }
                Ok(ty)
            },
        }
    }
}

/// Returns true once every named member of a tagged scope has a concrete,
/// sized type.
fn struct_scope_ready(program: &Program, scope: luxc_par::ty::StructScopeId) -> bool {
    program.types.struct_scopes[scope]
        .entries
        .iter()
        .all(|entry| {
            let ty = program.types.as_struct(entry.owner).members[entry.member].ty;
            program.types.is_concrete(ty) && program.types[ty].size != 0
        })
}

/// Computes sizes, alignments and member offsets for an aggregate.
///
/// Struct members advance a running offset aligned up to each member's
/// size; union members all sit at offset zero. The aggregate's alignment is
/// the maximum member alignment and its size is the running total aligned
/// up to it.
pub(crate) fn compute_struct_offsets(types: &mut TypeTable, ty: TypeId) {
    let member_count = types.as_struct(ty).members.len();
    let is_struct = types.as_struct(ty).is_struct;

    let mut offset = 0u32;
    let mut size = 0u32;
    let mut alignment = 0u32;

    for index in 0..member_count {
        let member_ty = types.as_struct(ty).members[index].ty;

        // Nested aggregates are laid out first so their size is known.
        if matches!(types[member_ty].kind, TypeKind::Struct(_)) {
            compute_struct_offsets(types, member_ty);
        }

        let member_size = types[member_ty].size;
        let member_alignment = types[member_ty].alignment;
        assert!(member_size != 0, "member layout ran before resolution");

        if is_struct {
            offset = align(offset, member_size);
            types.as_struct_mut(ty).members[index].offset = offset;
            offset += member_size;
        } else {
            types.as_struct_mut(ty).members[index].offset = 0;
            if member_size > size {
                size = member_size;
            }
        }

        if member_alignment > alignment {
            alignment = member_alignment;
        }
    }

    types[ty].alignment = alignment;
    let total = if is_struct { offset } else { size };
    types[ty].size = if alignment == 0 {
        0
    } else {
        align(total, alignment)
    };
}

/// Adds the enclosing offset into anonymous nested aggregates so every
/// member's offset is absolute from the outermost aggregate.
pub(crate) fn fix_struct_offsets(types: &mut TypeTable, ty: TypeId, enclosing: u32) {
    let offset = if types.as_struct(ty).scope.is_some() {
        0
    } else {
        enclosing
    };

    let member_count = types.as_struct(ty).members.len();
    for index in 0..member_count {
        types.as_struct_mut(ty).members[index].offset += offset;

        let (member_ty, member_offset) = {
            let member = &types.as_struct(ty).members[index];
            (member.ty, member.offset)
        };
        if matches!(types[member_ty].kind, TypeKind::Struct(_)) {
            fix_struct_offsets(types, member_ty, member_offset);
        }
    }
}
