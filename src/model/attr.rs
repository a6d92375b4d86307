//! Interned `key=value` attributes.

use std::fmt;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Slot in a graph's attribute table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttrIdx(pub u32);

impl AttrIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AttrIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single attribute. `value` is kept exactly as written in the source,
/// quotes included, so it can be emitted again unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attr {
    pub key: String,
    pub value: String,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Ordered attribute references owned by a node, an edge, or the graph.
pub type AttrList = SmallVec<[AttrIdx; 4]>;

/// Deduplicating attribute storage.
///
/// Two structurally equal attributes always resolve to the same `AttrIdx`.
/// Entries are never removed, so indices stay valid for the table's lifetime.
#[derive(Debug, Clone, Default)]
pub struct AttrTable {
    entries: Vec<Attr>,
    index: HashMap<Attr, AttrIdx>,
}

impl AttrTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the slot for `attr`, allocating one on first sight.
    pub fn intern(&mut self, attr: Attr) -> AttrIdx {
        match self.index.entry(attr) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let idx = AttrIdx(self.entries.len() as u32);
                self.entries.push(e.key().clone());
                e.insert(idx);
                idx
            }
        }
    }

    /// Intern a whole attribute list, preserving order.
    ///
    /// A key that repeats within `pairs` overwrites the earlier entry in place.
    pub fn intern_all<I, K, V>(&mut self, pairs: I) -> AttrList
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut list = AttrList::new();
        for (key, value) in pairs {
            let idx = self.intern(Attr::new(key, value));
            let key = &self.entries[idx.index()].key;
            match list.iter().position(|prev| &self.entries[prev.index()].key == key) {
                Some(pos) => list[pos] = idx,
                None => list.push(idx),
            }
        }
        list
    }

    pub fn get(&self, idx: AttrIdx) -> Option<&Attr> {
        self.entries.get(idx.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
