//! Diagnostics and the fail-fast error model.
//!
//! The compiler does not recover from errors. Every detection site builds a
//! [`Diagnostic`], hands it to the shared [`Handler`], and returns
//! [`FatalError`], which callers propagate with `?` until the driver stops
//! the pipeline. The driver renders the collected diagnostics against the
//! source text and exits non-zero.

use std::cell::RefCell;
use std::fmt;
use std::fmt::Write;

use thiserror::Error;

use crate::Span;

/// Marker error meaning "a diagnostic has already been emitted".
///
/// Carries no payload on purpose: the message and location live in the
/// [`Handler`], and nothing downstream is allowed to continue past it.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("compilation stopped after a reported error")]
pub struct FatalError;

/// Result alias used throughout the compiler core.
pub type CompileResult<T> = Result<T, FatalError>;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that stops compilation.
    Error,
    /// A warning; compilation continues.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic message with a source location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity.
    pub level: Level,
    /// Main message.
    pub message: String,
    /// Location of the offending lexeme.
    pub span: Span,
}

/// Number of source lines shown above the offending line.
const CONTEXT_LINES: u32 = 3;

impl Diagnostic {
    /// Creates an error diagnostic.
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            span,
        }
    }

    /// Renders the diagnostic against the source it points into.
    ///
    /// The output shows up to three preceding lines, the offending line with
    /// a line-number gutter, and a caret run under the offending lexeme:
    ///
    /// ```text
    /// error: expecting ; but got )
    ///    1 | main : func () -> u64 {
    ///    2 |     return 1 + 2
    ///    3 | }
    ///      |     ^^^^^^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", self.level, self.message);

        if self.span.line == 0 {
            return out;
        }

        let lines: Vec<&str> = source.split('\n').collect();
        let last = (self.span.line as usize).min(lines.len());
        let first = (self.span.line.saturating_sub(CONTEXT_LINES)).max(1) as usize;

        for number in first..=last {
            let text = lines[number - 1].trim_end_matches('\r');
            let _ = writeln!(out, " {:>3} | {}", number, text);
        }

        // The gutter above is 7 characters wide; the column is 0-based.
        let carets = self.span.len().max(1);
        let _ = writeln!(
            out,
            "     | {}{}",
            " ".repeat(self.span.column as usize),
            "^".repeat(carets)
        );

        out
    }
}

/// Collects diagnostics for the current compiler invocation.
///
/// The handler is shared by reference between the pipeline phases; interior
/// mutability keeps the phase APIs free of `&mut` plumbing for a value that
/// is only ever appended to.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error and returns the fatal marker for the caller to
    /// propagate.
    pub fn fatal(&self, message: impl Into<String>, span: Span) -> FatalError {
        self.emit(Diagnostic::error(message, span));
        FatalError
    }

    /// Records a pre-built diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Returns true if any error has been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Returns the number of recorded errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Returns a copy of all recorded diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}
