//! Comment scanning.
//!
//! Comments start with `//`. A line comment runs to the end of the line; a
//! block comment opens with `//(` and closes with `//)`, and the openers
//! nest. Comments become tokens so the parser can attach them to the tree
//! and the emitter can forward them into the assembly output.

use luxc_util::{CompileResult, Span, Symbol};

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Scans a comment starting at the `//` marker.
    pub(super) fn scan_comment(
        &mut self,
        start: usize,
        line: u32,
        column: u32,
    ) -> CompileResult<Token> {
        // The dispatch already saw both slashes.
        self.cursor.advance_by(2);
        let text_start = self.cursor.position();

        if self.cursor.current() == b'(' {
            let mut depth = 1u32;

            loop {
                if self.cursor.current() == 0 {
                    return Err(self.fatal_at("unterminated block comment", start, line, column));
                }

                if self.cursor.current() == b'/' && self.cursor.byte_at(1) == b'/' {
                    match self.cursor.byte_at(2) {
                        b'(' => depth += 1,
                        b')' => depth -= 1,
                        _ => {},
                    }

                    if depth == 0 {
                        self.cursor.advance_by(3);
                        break;
                    }
                }

                self.cursor.advance();
            }
        } else {
            while self.cursor.current() != b'\r'
                && self.cursor.current() != b'\n'
                && self.cursor.current() != 0
            {
                self.cursor.advance();
            }
        }

        let text = Symbol::intern(self.cursor.slice_from(text_start));
        Ok(Token {
            kind: TokenKind::Comment,
            text,
            value: 0,
            span: Span::new(start, self.cursor.position(), line, column),
        })
    }
}
