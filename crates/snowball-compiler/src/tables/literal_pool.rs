//! Literal strings referenced from routine bodies.

use indexmap::IndexSet;
use serde::Serialize;

/// Where a literal's symbols are stored: `s_{index} + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiteralRef {
    pub index: usize,
    pub offset: usize,
}

/// Stored literals in first-use order.
///
/// A literal identical to, or a suffix of, an already stored one reuses it
/// through an offset. Sharing only looks backwards: a longer literal stored
/// later never absorbs an earlier shorter one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LiteralPool {
    entries: IndexSet<Vec<u16>>,
}

impl LiteralPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the literal's location and whether it was newly stored.
    pub fn intern(&mut self, text: &[u16]) -> (LiteralRef, bool) {
        if let Some(index) = self.entries.get_index_of(text) {
            return (LiteralRef { index, offset: 0 }, false);
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.ends_with(text) {
                let offset = entry.len() - text.len();
                return (LiteralRef { index, offset }, false);
            }
        }
        let (index, _) = self.entries.insert_full(text.to_vec());
        (LiteralRef { index, offset: 0 }, true)
    }

    pub fn entry(&self, index: usize) -> &[u16] {
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
