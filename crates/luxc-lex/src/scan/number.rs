//! Number literal scanning.
//!
//! A leading `0` selects a base prefix: `0x` hexadecimal, `0b` binary,
//! `0o` octal. A plain `0` is just zero; a non-zero decimal digit directly
//! after a leading `0` is an error. The digit run honours the chosen base
//! and the value is accumulated into a `u64`.

use luxc_util::CompileResult;

use crate::token::{Token, TokenKind};
use crate::Lexer;

/// Maps a character to its digit value, accepting `0-9 a-f A-F`.
///
/// Upper-case letters are normalised by setting bit 5.
fn digit_value(c: u8) -> Option<u64> {
    match c {
        b'0'..=b'9' => Some((c - b'0') as u64),
        _ => match c | (1 << 5) {
            l @ b'a'..=b'f' => Some((l - b'a' + 10) as u64),
            _ => None,
        },
    }
}

impl<'a> Lexer<'a> {
    /// Scans a number literal starting at the current digit.
    pub(super) fn scan_number(
        &mut self,
        start: usize,
        line: u32,
        column: u32,
    ) -> CompileResult<Token> {
        let mut base: u64 = 10;

        if self.cursor.current() == b'0' {
            self.cursor.advance();

            match self.cursor.current() {
                b'x' => {
                    base = 16;
                    self.cursor.advance();
                },
                b'b' => {
                    base = 2;
                    self.cursor.advance();
                },
                b'o' => {
                    base = 8;
                    self.cursor.advance();
                },
                c if c.is_ascii_digit() => {
                    return Err(self.fatal_at(
                        "a number cannot start with zero unless it is zero",
                        start,
                        line,
                        column,
                    ));
                },
                _ => {},
            }
        }

        let mut value: u64 = 0;
        loop {
            let digit = match digit_value(self.cursor.current()) {
                Some(digit) => digit,
                None => break,
            };

            if digit >= base {
                return Err(self.fatal_at(
                    format!("digit exceeds the base-{} number", base),
                    start,
                    line,
                    column,
                ));
            }

            value = value * base + digit;
            self.cursor.advance();
        }

        let mut token = self.make_token(TokenKind::Number, start, line, column);
        token.value = value;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxc_util::{Handler, Symbol};

    fn scan(source: &str) -> (CompileResult<Token>, Handler) {
        let handler = Handler::new();
        let result = {
            let mut lexer = Lexer::new(source, Symbol::intern("t"), &handler);
            lexer.scan_token()
        };
        (result, handler)
    }

    fn value_of(source: &str) -> u64 {
        let (result, handler) = scan(source);
        let token = result.expect("number should scan");
        assert!(!handler.has_errors());
        assert_eq!(token.kind, TokenKind::Number);
        token.value
    }

    #[test]
    fn test_decimal() {
        assert_eq!(value_of("42"), 42);
        assert_eq!(value_of("123456"), 123456);
    }

    #[test]
    fn test_zero() {
        assert_eq!(value_of("0"), 0);
        assert_eq!(value_of("0;"), 0);
    }

    #[test]
    fn test_hex() {
        assert_eq!(value_of("0xff"), 255);
        assert_eq!(value_of("0xFF"), 255);
        assert_eq!(value_of("0x10"), 16);
    }

    #[test]
    fn test_binary() {
        assert_eq!(value_of("0b1010"), 10);
    }

    #[test]
    fn test_octal() {
        assert_eq!(value_of("0o777"), 0o777);
    }

    #[test]
    fn test_nonzero_digit_after_zero_fails() {
        let (result, handler) = scan("0123");
        assert!(result.is_err());
        assert!(handler.has_errors());
    }

    #[test]
    fn test_digit_above_base_fails() {
        let (result, handler) = scan("0b12");
        assert!(result.is_err());
        assert!(handler.has_errors());
    }

    #[test]
    fn test_hex_digit_in_decimal_fails() {
        let (result, _) = scan("12ab");
        assert!(result.is_err());
    }

    #[test]
    fn test_lexeme_covers_prefix() {
        let (result, _) = scan("0x2a ");
        let token = result.unwrap();
        assert_eq!(token.text.as_str(), "0x2a");
        assert_eq!(token.value, 42);
    }
}
