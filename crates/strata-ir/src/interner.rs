//! Deduplicating interners.
//!
//! An `Interner` stores each distinct structural key once in an arena and
//! hands out the arena index. Lookups go through a `HashMap` keyed on the full
//! key, so a hash collision is resolved by key equality.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use cranelift_entity::{EntityRef, PrimaryMap};
use lasso::{Rodeo, Spur};

/// Deduplicating interner. Same key always yields the same ref.
pub struct Interner<K: EntityRef, V> {
    entries: PrimaryMap<K, V>,
    dedup: HashMap<V, K>,
}

impl<K, V> Interner<K, V>
where
    K: EntityRef + fmt::Display,
    V: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: PrimaryMap::new(),
            dedup: HashMap::default(),
        }
    }

    /// Intern a key, returning an existing ref if the key matches.
    pub fn intern(&mut self, data: V) -> K {
        if let Some(&existing) = self.dedup.get(&data) {
            return existing;
        }
        let r = self.entries.push(data.clone());
        self.dedup.insert(data, r);
        tracing::trace!(entry = %r, "interned new entry");
        r
    }

    /// Look up interned data by reference.
    pub fn get(&self, r: K) -> &V {
        &self.entries[r]
    }

    /// Whether `r` was issued by this interner.
    pub fn contains(&self, r: K) -> bool {
        self.entries.is_valid(r)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for Interner<K, V>
where
    K: EntityRef + fmt::Display,
    V: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// Interned name (operation names, attribute keys, function names).
///
/// Uses lasso for string interning with 4-byte `Spur` keys. Identifiers are
/// owned by the context that interned them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(Spur);

/// Per-context identifier table.
#[derive(Default)]
pub struct IdentifierInterner {
    rodeo: Rodeo,
}

impl IdentifierInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> Identifier {
        Identifier(self.rodeo.get_or_intern(text))
    }

    /// Look up an identifier without interning it.
    pub fn get(&self, text: &str) -> Option<Identifier> {
        self.rodeo.get(text).map(Identifier)
    }

    pub fn resolve(&self, ident: Identifier) -> &str {
        self.rodeo.resolve(&ident.0)
    }
}
