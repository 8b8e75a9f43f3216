//! The data-segment staging buffer.
//!
//! String literals and zero-initialised globals are discovered while code
//! is being generated, but belong in `.data`. They are appended here and
//! flushed after every function so code and data interleave per function in
//! the output. The buffer is append-only with amortised growth.

use std::fmt;
use std::fmt::Write;

/// An append-only byte buffer for the `.data` segment.
#[derive(Default)]
pub struct DataBuffer {
    buffer: String,
}

impl DataBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line of text.
    pub fn push_line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Appends a formatted line.
    pub fn push_fmt(&mut self, args: fmt::Arguments) {
        let _ = self.buffer.write_fmt(args);
        self.buffer.push('\n');
    }

    /// Number of staged bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Takes the staged contents, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
