//! Type expression parsing and struct/union bodies.
//!
//! The type grammar is right-associative with respect to modifiers: `*`
//! and `[N]` apply to the type that follows them. Identifiers become
//! unresolved placeholders for the typer; `struct`/`union` literals at a
//! declaration site are tagged and open a struct scope that enforces
//! member-name uniqueness.

use luxc_lex::{Keyword, TokenKind};
use luxc_util::CompileResult;

use crate::ty::{StructEntry, StructMember, TypeId};
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses a type expression starting at the current token.
    pub(crate) fn parse_type(&mut self) -> CompileResult<TypeId> {
        let token = self.lexer.consume()?;

        if token.is_keyword(Keyword::U64) {
            return Ok(self.types.basic(8, false));
        }
        if token.is_keyword(Keyword::U32) {
            return Ok(self.types.basic(4, false));
        }
        if token.is_keyword(Keyword::U16) {
            return Ok(self.types.basic(2, false));
        }
        if token.is_keyword(Keyword::U8) {
            return Ok(self.types.basic(1, false));
        }
        if token.is_keyword(Keyword::S64) {
            return Ok(self.types.basic(8, true));
        }
        if token.is_keyword(Keyword::S32) {
            return Ok(self.types.basic(4, true));
        }
        if token.is_keyword(Keyword::S16) {
            return Ok(self.types.basic(2, true));
        }
        if token.is_keyword(Keyword::S8) {
            return Ok(self.types.basic(1, true));
        }
        if token.is_keyword(Keyword::Char) {
            return Ok(self.types.char_type());
        }
        if token.is_keyword(Keyword::Struct) {
            return self.parse_struct_body(true, true);
        }
        if token.is_keyword(Keyword::Union) {
            return self.parse_struct_body(false, true);
        }

        match token.kind {
            TokenKind::Star => {
                let pointee = self.parse_type()?;
                Ok(self.types.pointer_to(pointee))
            },
            TokenKind::LBracket => {
                let count = self.lexer.current();
                if count.kind != TokenKind::Number {
                    return Err(self.handler.fatal(
                        "cannot evaluate non-constant expressions currently",
                        count.span,
                    ));
                }
                self.lexer.skip(TokenKind::Number)?;
                self.lexer.skip(TokenKind::RBracket)?;

                let pointee = self.parse_type()?;
                Ok(self.types.array_of(count.value as u32, pointee))
            },
            TokenKind::Ident => {
                // The name may refer to a typedef declared anywhere in the
                // file; the typer replaces this placeholder in a later pass.
                Ok(self.types.unknown(token))
            },
            _ => Err(self.handler.fatal("expecting a type", token.span)),
        }
    }

    /// Parses `{ members }` of a struct or union.
    ///
    /// The opening keyword has already been consumed. Tagged aggregates open
    /// a struct scope; anonymous nested ones register their named members
    /// into the enclosing tagged scope instead.
    pub(crate) fn parse_struct_body(
        &mut self,
        is_struct: bool,
        tagged: bool,
    ) -> CompileResult<TypeId> {
        let saved_scope = self.current_struct_scope;
        let scope = if tagged {
            let scope = self.types.new_struct_scope();
            self.current_struct_scope = Some(scope);
            Some(scope)
        } else {
            None
        };

        let owner = self.types.new_struct(is_struct, scope);

        self.lexer.skip(TokenKind::LBrace)?;
        loop {
            let token = self.lexer.current();
            if token.kind == TokenKind::RBrace || token.kind == TokenKind::Eof {
                break;
            }
            self.parse_struct_member(owner)?;
        }
        self.lexer.skip(TokenKind::RBrace)?;

        if tagged {
            self.current_struct_scope = saved_scope;
        }
        Ok(owner)
    }

    /// Parses one struct member: `name : type ;` or an anonymous nested
    /// `struct`/`union` body.
    fn parse_struct_member(&mut self, owner: TypeId) -> CompileResult<()> {
        let token = self.lexer.current();

        if token.is_keyword(Keyword::Struct) || token.is_keyword(Keyword::Union) {
            let is_struct = token.is_keyword(Keyword::Struct);
            self.lexer.next()?;

            let nested = self.parse_struct_body(is_struct, false)?;
            self.lexer.skip(TokenKind::Semicolon)?;

            // Anonymous aggregates have no name and no scope of their own;
            // their named members were hoisted into the tagged scope as the
            // nested body was parsed.
            self.types.as_struct_mut(owner).members.push(StructMember {
                name: None,
                token: None,
                ty: nested,
                offset: 0,
            });
            return Ok(());
        }

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
        self.lexer.skip(TokenKind::Semicolon)?;

        let member = self.types.as_struct(owner).members.len();
        self.types.as_struct_mut(owner).members.push(StructMember {
            name: Some(name_token.text),
            token: Some(name_token),
            ty,
            offset: 0,
        });

        // Register the member in the innermost tagged scope, where name
        // uniqueness is enforced across anonymous nesting.
        let scope = self
            .current_struct_scope
            .expect("struct member outside a tagged aggregate");
        if self.types.struct_scopes[scope].find(name_token.text).is_some() {
            return Err(self
                .handler
                .fatal("duplicate struct member", name_token.span));
        }
        self.types.struct_scopes[scope].entries.push(StructEntry {
            name: name_token.text,
            token: name_token,
            owner,
            member,
        });

        Ok(())
    }
}
