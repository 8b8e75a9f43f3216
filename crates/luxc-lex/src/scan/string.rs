//! String literal scanning.
//!
//! Strings are `"`-delimited runs of literal bytes. There is no escape
//! processing; the bytes between the quotes become the lexeme as-is. An
//! unterminated string is fatal.

use luxc_util::{CompileResult, Span, Symbol};

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Scans a string literal starting at the opening quote.
    pub(super) fn scan_string(
        &mut self,
        start: usize,
        line: u32,
        column: u32,
    ) -> CompileResult<Token> {
        self.cursor.advance();
        let text_start = self.cursor.position();

        while self.cursor.current() != b'"' && self.cursor.current() != 0 {
            self.cursor.advance();
        }

        if self.cursor.current() == 0 {
            return Err(self.fatal_at("unterminated string", start, line, column));
        }

        let text = Symbol::intern(self.cursor.slice_from(text_start));
        self.cursor.advance();

        Ok(Token {
            kind: TokenKind::Str,
            text,
            value: 0,
            span: Span::new(start, self.cursor.position(), line, column),
        })
    }
}
