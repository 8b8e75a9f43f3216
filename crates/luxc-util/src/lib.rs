//! luxc-util - Foundation types shared by every compiler phase.
//!
//! This crate holds the pieces the pipeline crates agree on:
//!
//! - [`Span`] for source locations
//! - [`Symbol`] for interned strings
//! - [`Idx`]/[`IndexVec`] typed arena indices
//! - [`Diagnostic`]/[`Handler`]/[`FatalError`] for the fail-fast error model

pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{CompileResult, Diagnostic, FatalError, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use symbol::Symbol;

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
