//! Character cursor for traversing source code.
//!
//! The cursor walks the source buffer byte by byte and keeps the line and
//! column bookkeeping the tokens and diagnostics rely on. Lux source is
//! ASCII; reading past the end yields `0`, which plays the role of the
//! end-of-input sentinel everywhere in the scanner.

/// A cursor over a source buffer.
///
/// Lines are 1-based; columns are 0-based and reset on every newline. A
/// `\r\n` pair and a lone `\r` both count as a single newline.
pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 0,
        }
    }

    /// Returns the byte at the cursor, or `0` at the end of input.
    #[inline]
    pub fn current(&self) -> u8 {
        self.byte_at(0)
    }

    /// Returns the byte `offset` positions ahead, or `0` past the end.
    #[inline]
    pub fn byte_at(&self, offset: usize) -> u8 {
        *self
            .source
            .as_bytes()
            .get(self.position + offset)
            .unwrap_or(&0)
    }

    /// Advances one character and returns the new current byte.
    ///
    /// Does nothing at the end of input.
    pub fn advance(&mut self) -> u8 {
        let mut c = self.current();
        if c == 0 {
            return 0;
        }

        self.position += 1;
        if c == b'\r' {
            if self.current() == b'\n' {
                self.position += 1;
            }
            c = b'\n';
        }

        if c == b'\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }

        self.current()
    }

    /// Advances `count` characters.
    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    /// Advances `count` bytes of known punctuation.
    ///
    /// The caller has already checked the bytes being skipped, so the column
    /// moves by the literal count and no newline handling happens.
    #[inline]
    pub fn skip_punctuation(&mut self, count: usize) {
        self.position += count;
        self.column += count as u32;
    }

    /// Skips whitespace (space, tab, carriage return, newline).
    pub fn skip_whitespace(&mut self) {
        while is_whitespace(self.current()) {
            self.advance();
        }
    }

    /// Returns true if the cursor is at the end of the source.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Returns the current byte position.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the current line number (1-based).
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Returns the current column number (0-based).
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Returns the source slice from `start` to the current position.
    #[inline]
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }

    /// Returns the full source text.
    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }
}

/// Returns true for the whitespace set of the language.
#[inline]
pub fn is_whitespace(c: u8) -> bool {
    c == b' ' || c == b'\t' || c == b'\r' || c == b'\n'
}
