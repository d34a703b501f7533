//! String interner backed by DashMap for lock-free concurrent access.
//!
//! Interning (hit) is a single sharded-map lookup; interning (miss) leaks the
//! string to obtain `'static` storage and records it under a fresh index.
//! Resolution goes through a reverse map keyed by index.

use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

/// Global string table instance, initialized on first use.
pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

/// Thread-safe string table.
pub struct StringTable {
    /// Interned string -> index.
    map: DashMap<&'static str, u32, RandomState>,
    /// Index -> interned string.
    rev: DashMap<u32, &'static str, RandomState>,
    /// Next free index.
    next_index: AtomicU32,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher(256, RandomState::new()),
            rev: DashMap::with_capacity_and_hasher(256, RandomState::new()),
            next_index: AtomicU32::new(0),
        }
    }

    /// Interns a string, returning its index. Identical strings always map
    /// to the same index, even under concurrent interning.
    pub fn intern(&self, s: &str) -> u32 {
        if let Some(index) = self.map.get(s) {
            return *index;
        }

        // Leaked intentionally; the table owns the string for the program
        // lifetime.
        let stored: &'static str = Box::leak(s.to_owned().into_boxed_str());

        // The entry API serializes racing inserts of the same string on the
        // shard lock, so exactly one index wins.
        let index = *self
            .map
            .entry(stored)
            .or_insert_with(|| self.next_index.fetch_add(1, Ordering::Relaxed));
        self.rev.insert(index, stored);
        index
    }

    /// Resolves an index back to its string.
    ///
    /// Panics when handed an index that was never produced by [`intern`];
    /// that can only happen through a forged `Symbol`, which is a compiler
    /// bug.
    ///
    /// [`intern`]: StringTable::intern
    pub fn resolve(&self, index: u32) -> &'static str {
        *self
            .rev
            .get(&index)
            .unwrap_or_else(|| panic!("unresolved symbol index {index}"))
    }

    /// Number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let table = StringTable::new();
        let a = table.intern("alpha");
        let b = table.intern("beta");
        assert_ne!(a, b);
        assert_eq!(table.resolve(a), "alpha");
        assert_eq!(table.resolve(b), "beta");
    }

    #[test]
    fn test_reintern_is_stable() {
        let table = StringTable::new();
        let first = table.intern("stable");
        let second = table.intern("stable");
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
    }

    #[test]
    #[should_panic(expected = "unresolved symbol index")]
    fn test_resolve_unknown_index_panics() {
        let table = StringTable::new();
        table.resolve(999);
    }
}
