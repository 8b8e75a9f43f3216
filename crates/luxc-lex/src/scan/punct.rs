//! Punctuation scanning.
//!
//! Longest-match first: the two-byte digraphs (`== != <= >= :: -> ..`) are
//! checked before their one-byte prefixes. An unexpected character is fatal.

use luxc_util::CompileResult;

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Scans a punctuation token starting at the current character.
    pub(super) fn scan_punctuation(
        &mut self,
        start: usize,
        line: u32,
        column: u32,
    ) -> CompileResult<Token> {
        let current = self.cursor.current();
        let next = self.cursor.byte_at(1);

        let (kind, length) = match (current, next) {
            (b'-', b'>') => (TokenKind::Arrow, 2),
            (b'=', b'=') => (TokenKind::EqEq, 2),
            (b'<', b'=') => (TokenKind::Le, 2),
            (b'>', b'=') => (TokenKind::Ge, 2),
            (b':', b':') => (TokenKind::ColonColon, 2),
            (b'.', b'.') => (TokenKind::DotDot, 2),
            (b'!', b'=') => (TokenKind::NotEq, 2),

            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'{', _) => (TokenKind::LBrace, 1),
            (b'}', _) => (TokenKind::RBrace, 1),
            (b'[', _) => (TokenKind::LBracket, 1),
            (b']', _) => (TokenKind::RBracket, 1),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'=', _) => (TokenKind::Assign, 1),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', _) => (TokenKind::Gt, 1),
            (b';', _) => (TokenKind::Semicolon, 1),
            (b':', _) => (TokenKind::Colon, 1),
            (b',', _) => (TokenKind::Comma, 1),
            (b'.', _) => (TokenKind::Dot, 1),
            (b'^', _) => (TokenKind::Caret, 1),
            (b'&', _) => (TokenKind::Ampersand, 1),
            (b'@', _) => (TokenKind::At, 1),

            (c, _) => {
                return Err(self.fatal_at(
                    format!("unexpected character '{}'", c as char),
                    start,
                    line,
                    column,
                ));
            },
        };

        self.cursor.skip_punctuation(length);
        Ok(self.make_token(kind, start, line, column))
    }
}
