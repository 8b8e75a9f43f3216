//! Identifier scanning.
//!
//! Identifiers match `[A-Za-z_][A-Za-z_0-9]*` and are case-preserving.
//! Keywords are not distinguished here; the parser compares identifier
//! lexemes against the keyword table when it needs to.

use crate::scan::is_ident_continue;
use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Scans an identifier starting at the current character.
    pub(super) fn scan_identifier(&mut self, start: usize, line: u32, column: u32) -> Token {
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }

        self.make_token(TokenKind::Ident, start, line, column)
    }
}

#[cfg(test)]
mod tests {
    use crate::token::TokenKind;
    use crate::Lexer;
    use luxc_util::{Handler, Symbol};

    fn scan(source: &str) -> (TokenKind, String) {
        let handler = Handler::new();
        let mut lexer = Lexer::new(source, Symbol::intern("t"), &handler);
        let token = lexer.next().unwrap();
        (token.kind, token.text.to_string())
    }

    #[test]
    fn test_simple_identifier() {
        assert_eq!(scan("point"), (TokenKind::Ident, "point".to_string()));
    }

    #[test]
    fn test_underscore_and_digits() {
        assert_eq!(
            scan("frame_16_size"),
            (TokenKind::Ident, "frame_16_size".to_string())
        );
    }

    #[test]
    fn test_leading_underscore() {
        assert_eq!(scan("_tmp"), (TokenKind::Ident, "_tmp".to_string()));
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(scan("Point"), (TokenKind::Ident, "Point".to_string()));
    }

    #[test]
    fn test_keyword_is_plain_identifier() {
        assert_eq!(scan("func"), (TokenKind::Ident, "func".to_string()));
    }

    #[test]
    fn test_stops_at_punctuation() {
        assert_eq!(scan("a.b"), (TokenKind::Ident, "a".to_string()));
    }
}
