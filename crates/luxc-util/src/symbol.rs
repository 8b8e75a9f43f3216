//! String interning.
//!
//! A [`Symbol`] is a compact 4-byte handle to a string stored once in a
//! global table. Identifiers, keywords and string literals repeat constantly
//! in source code; interning them makes comparison an integer compare and
//! lets tokens stay `Copy`.
//!
//! Interned strings are leaked on purpose: the table lives for the whole
//! compiler invocation and the total amount of unique text is bounded by the
//! source size.

use std::fmt;
use std::sync::{LazyLock, RwLock};

use rustc_hash::FxHashMap;

static INTERNER: LazyLock<RwLock<Interner>> = LazyLock::new(|| RwLock::new(Interner::new()));

/// An interned string handle.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Interns a string, returning its symbol.
    ///
    /// Interning the same string twice returns the same symbol.
    pub fn intern(string: &str) -> Self {
        if let Some(sym) = INTERNER.read().unwrap().get(string) {
            return sym;
        }
        INTERNER.write().unwrap().insert(string)
    }

    /// Returns the string this symbol was interned from.
    pub fn as_str(self) -> &'static str {
        INTERNER.read().unwrap().strings[self.0 as usize]
    }

    /// The empty string, pre-interned.
    pub fn empty() -> Self {
        Symbol::intern("")
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Interner {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl Interner {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    fn get(&self, string: &str) -> Option<Symbol> {
        self.map.get(string).map(|&index| Symbol(index))
    }

    fn insert(&mut self, string: &str) -> Symbol {
        // A racing writer may have interned the string between our read
        // probe and taking the write lock.
        if let Some(&index) = self.map.get(string) {
            return Symbol(index);
        }

        let interned: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let index = self.strings.len() as u32;
        self.strings.push(interned);
        self.map.insert(interned, index);
        Symbol(index)
    }
}
