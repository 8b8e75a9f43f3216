//! luxc-lex - Lexical analysis for the Lux language.
//!
//! The lexer produces tokens over a source buffer through a fixed-size
//! token window: a ring of slots that supports bounded lookahead
//! ([`PEEK_COUNT`] tokens) and bounded rewind ([`UNDO_COUNT`] tokens).
//! Tokens are materialised lazily as the cursor moves; advancing past the
//! undo horizon evicts the oldest retained token. Nothing is allocated per
//! token beyond the window.
//!
//! The parser drives the window with a small set of operations: `next`,
//! `peek`, `undo`, `current`, `consume`, `expect`, `skip` and
//! `skip_keyword`. Scan errors are reported through the shared diagnostic
//! handler and surface as [`FatalError`](luxc_util::FatalError).

pub mod cursor;
pub mod token;

mod scan;

#[cfg(test)]
mod edge_cases;

use luxc_util::{CompileResult, Handler, Span, Symbol};

use crate::cursor::Cursor;
pub use crate::token::{Keyword, Token, TokenKind};

/// Maximum lookahead distance, in tokens.
pub const PEEK_COUNT: usize = 10;

/// Maximum rewind distance, in tokens.
pub const UNDO_COUNT: usize = 10;

/// Number of slots in the token ring.
///
/// One extra slot holds the current token and one keeps the eviction edge
/// from touching the peek horizon.
const SLOT_COUNT: usize = PEEK_COUNT + UNDO_COUNT + 2;

/// The lexer: a scanner plus the token window over it.
pub struct Lexer<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) handler: &'a Handler,
    file_name: Symbol,

    slots: [Option<Token>; SLOT_COUNT],
    current_index: usize,
    buffer_index: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    ///
    /// The window starts empty; the first call to [`Lexer::next`] primes it.
    pub fn new(source: &'a str, file_name: Symbol, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            file_name,
            slots: [None; SLOT_COUNT],
            current_index: 0,
            buffer_index: 0,
        }
    }

    /// The name of the file being lexed.
    pub fn file_name(&self) -> Symbol {
        self.file_name
    }

    /// The source text being lexed.
    pub fn source(&self) -> &'a str {
        self.cursor.source()
    }

    fn wrap(index: usize) -> usize {
        (index + 1) % SLOT_COUNT
    }

    /// Distance between the cursor and the oldest retained slot.
    fn undo_distance(&self) -> usize {
        (self.current_index + SLOT_COUNT - self.buffer_index) % SLOT_COUNT
    }

    fn materialize(&mut self, index: usize) -> CompileResult<Token> {
        if self.slots[index].is_none() {
            let token = self.scan_token()?;
            self.slots[index] = Some(token);
        }
        Ok(self.slots[index].expect("slot was just materialised"))
    }

    /// Advances the cursor and returns the new current token.
    ///
    /// Evicts the oldest retained token once the window is full.
    pub fn next(&mut self) -> CompileResult<Token> {
        if self.undo_distance() > UNDO_COUNT {
            self.slots[self.buffer_index] = None;
            self.buffer_index = Self::wrap(self.buffer_index);
        }

        self.current_index = Self::wrap(self.current_index);
        self.materialize(self.current_index)
    }

    /// Returns the token `count` positions ahead without moving the cursor.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero or exceeds [`PEEK_COUNT`].
    pub fn peek(&mut self, count: usize) -> CompileResult<Token> {
        assert!(
            count >= 1 && count <= PEEK_COUNT,
            "peek distance {} is outside the token window",
            count
        );

        let mut index = self.current_index;
        let mut token = None;
        for _ in 0..count {
            index = Self::wrap(index);
            token = Some(self.materialize(index)?);
        }
        Ok(token.expect("peek count is at least one"))
    }

    /// Moves the cursor one token back and returns the token there.
    ///
    /// # Panics
    ///
    /// Panics if the retained window is empty.
    pub fn undo(&mut self) -> Token {
        assert!(
            self.undo_distance() > 1,
            "token undo past the retained window"
        );

        self.current_index = (self.current_index + SLOT_COUNT - 1) % SLOT_COUNT;
        self.slots[self.current_index].expect("undo into an invalidated slot")
    }

    /// Returns the current token.
    ///
    /// # Panics
    ///
    /// Panics if the window has not been primed with [`Lexer::next`] yet.
    pub fn current(&self) -> Token {
        assert!(
            self.current_index != self.buffer_index,
            "lexer window is not primed"
        );
        self.slots[self.current_index].expect("current slot is materialised")
    }

    /// Returns the current token and advances the cursor.
    pub fn consume(&mut self) -> CompileResult<Token> {
        let token = self.current();
        self.next()?;
        Ok(token)
    }

    /// Advances, then fails unless the new token has the given kind.
    pub fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        let token = self.next()?;
        if token.kind != kind {
            return Err(self.handler.fatal(
                format!(
                    "expecting {} but got {}",
                    kind.describe(),
                    token.kind.describe()
                ),
                token.span,
            ));
        }
        Ok(token)
    }

    /// Fails unless the current token has the given kind, then advances.
    ///
    /// Returns the new current token.
    pub fn skip(&mut self, kind: TokenKind) -> CompileResult<Token> {
        let token = self.current();
        if token.kind != kind {
            return Err(self.handler.fatal(
                format!(
                    "expecting {} but got {}",
                    kind.describe(),
                    token.kind.describe()
                ),
                token.span,
            ));
        }
        self.next()
    }

    /// Fails unless the current token is the given keyword, then advances.
    ///
    /// Returns the new current token.
    pub fn skip_keyword(&mut self, keyword: Keyword) -> CompileResult<Token> {
        let token = self.current();
        if !token.is_keyword(keyword) {
            return Err(self.handler.fatal(
                format!(
                    "expected the keyword '{}', but got {}",
                    keyword.as_str(),
                    token.text
                ),
                token.span,
            ));
        }
        self.next()
    }

    /// Captures a raw assembly body.
    ///
    /// The current token must be the opening `{` of an `asm` function. The
    /// body is the raw source slice from the byte after the `{` up to the
    /// next `}`; nested braces are not supported and no escape processing
    /// happens. Afterwards the window is reset and re-primed so the current
    /// token is the one following the closing brace.
    pub fn assembly_body(&mut self) -> CompileResult<Symbol> {
        let open = self.current();
        if open.kind != TokenKind::LBrace {
            return Err(self.handler.fatal(
                format!("expecting {{ but got {}", open.kind.describe()),
                open.span,
            ));
        }

        let start = open.span.end;
        let close = match self.cursor.source()[start..].find('}') {
            Some(offset) => start + offset,
            None => {
                return Err(self
                    .handler
                    .fatal("unterminated assembly body", open.span));
            },
        };

        let body = Symbol::intern(&self.cursor.source()[start..close]);

        // Walk the cursor over the body so line tracking stays correct, then
        // drop every materialised token and re-prime past the brace.
        while self.cursor.position() <= close {
            self.cursor.advance();
        }

        self.slots = [None; SLOT_COUNT];
        self.current_index = 0;
        self.buffer_index = 0;
        self.next()?;

        Ok(body)
    }

    pub(crate) fn fatal_at(
        &self,
        message: impl Into<String>,
        start: usize,
        line: u32,
        column: u32,
    ) -> luxc_util::FatalError {
        let end = self.cursor.position().max(start + 1);
        self.handler
            .fatal(message, Span::new(start, end, line, column))
    }
}
