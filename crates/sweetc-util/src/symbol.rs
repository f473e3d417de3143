//! String interning for identifiers and string-literal contents.
//!
//! Grounded in the teacher's `Symbol` (faxc-util): a `Symbol` is a cheap
//! `Copy` handle into a deduplicating string table, so identifier
//! comparisons are integer comparisons rather than string comparisons.
//! The compiler core is single-threaded (spec §5), so the table lives in
//! a thread-local rather than behind a lock.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::new());
}

struct Interner {
    strings: Vec<&'static str>,
    lookup: FxHashMap<&'static str, u32>,
}

impl Interner {
    fn new() -> Self {
        Self {
            strings: Vec::new(),
            lookup: FxHashMap::default(),
        }
    }

    fn intern(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let id = self.strings.len() as u32;
        self.strings.push(leaked);
        self.lookup.insert(leaked, id);
        id
    }

    fn resolve(&self, id: u32) -> &'static str {
        self.strings[id as usize]
    }
}

/// A cheap, `Copy`, interned string handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Interns `s`, returning a handle usable for O(1) equality.
    pub fn intern(s: &str) -> Self {
        INTERNER.with(|i| Symbol(i.borrow_mut().intern(s)))
    }

    /// Returns the original string this symbol was interned from.
    pub fn as_str(self) -> &'static str {
        INTERNER.with(|i| i.borrow().resolve(self.0))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_interns_to_same_symbol() {
        let a = Symbol::intern("foo");
        let b = Symbol::intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn different_text_interns_differently() {
        let a = Symbol::intern("foo");
        let b = Symbol::intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn as_str_roundtrips() {
        let s = Symbol::intern("hello_world");
        assert_eq!(s.as_str(), "hello_world");
    }

    #[quickcheck_macros::quickcheck]
    fn interning_any_string_twice_is_consistent_and_roundtrips(s: String) -> bool {
        let a = Symbol::intern(&s);
        let b = Symbol::intern(&s);
        a == b && a.as_str() == s
    }
}
