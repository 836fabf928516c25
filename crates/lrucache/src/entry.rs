//! Entry record stored in the recency list

/// Stable handle to an entry in the list arena
///
/// A handle stays valid until its entry is removed. The slot may then be
/// recycled, but the new occupant carries a different generation, so the
/// old handle resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

/// One cached record plus its links in the recency chain
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
    pub(crate) generation: u64,
}

impl<K, V> Entry<K, V> {
    /// Create a detached entry
    pub(crate) fn new(key: K, value: V, generation: u64) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
            generation,
        }
    }

    pub(crate) fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}
