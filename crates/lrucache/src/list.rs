//! Recency-ordered doubly linked list
//!
//! Entries live in a slot arena (`Vec<Option<Entry>>`) and link to each
//! other by index, so relinking never moves or reallocates an entry.
//! Freed slots go onto a free list and are reused by later inserts; each
//! insert stamps a fresh generation so handles to removed entries go stale
//! instead of aliasing whatever reuses their slot.
//!
//! Head is the most recently used entry, tail the least recently used.

use std::fmt;
use std::iter::FusedIterator;

use crate::entry::{Entry, EntryHandle};

/// Doubly linked list of entries with O(1) front insert, back removal and
/// move-to-front by handle
///
/// The list never looks at keys or values; it only keeps their order.
pub struct OrderedList<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    len: usize,
    next_generation: u64,
}

impl<K, V> OrderedList<K, V> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty list with room for `capacity` entries before the
    /// arena has to grow
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
            len: 0,
            next_generation: 0,
        }
    }

    /// Number of linked entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list has no entries
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Make a new entry the head of the list
    ///
    /// On an empty list the entry becomes both head and tail.
    pub fn insert_at_front(&mut self, key: K, value: V) -> EntryHandle {
        let handle = self.alloc_slot(key, value);
        self.link_front(handle.index);
        self.len += 1;
        handle
    }

    /// Detach and return the tail entry, or `None` if the list is empty
    pub fn remove_from_back(&mut self) -> Option<(K, V)> {
        let tail = self.tail?;
        self.remove_at(tail)
    }

    /// Relocate a linked entry to the head
    ///
    /// The entry keeps its slot, key and value. Moving the current head, or
    /// a handle whose entry has been removed, does nothing.
    pub fn move_to_front(&mut self, handle: EntryHandle) {
        let Some(idx) = self.live_index(handle) else {
            return;
        };
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);
        self.link_front(idx);
    }

    /// Splice an entry out of the list and return its key and value
    pub fn remove(&mut self, handle: EntryHandle) -> Option<(K, V)> {
        let idx = self.live_index(handle)?;
        self.remove_at(idx)
    }

    /// Check whether `handle` still refers to a linked entry
    pub fn contains(&self, handle: EntryHandle) -> bool {
        self.live_index(handle).is_some()
    }

    /// Key and value behind a handle
    pub fn get(&self, handle: EntryHandle) -> Option<(&K, &V)> {
        let idx = self.live_index(handle)?;
        self.entry_at(idx)
    }

    /// Mutable value behind a handle
    pub fn get_mut(&mut self, handle: EntryHandle) -> Option<&mut V> {
        let idx = self.live_index(handle)?;
        self.slots[idx].as_mut().map(|entry| &mut entry.value)
    }

    /// Most recently used entry
    pub fn front(&self) -> Option<(&K, &V)> {
        self.head.and_then(|idx| self.entry_at(idx))
    }

    /// Least recently used entry
    pub fn back(&self) -> Option<(&K, &V)> {
        self.tail.and_then(|idx| self.entry_at(idx))
    }

    /// Iterate from head (most recent) to tail (least recent)
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            next: self.head,
            remaining: self.len,
        }
    }

    /// Drop every entry and release the arena
    ///
    /// Generations keep counting, so handles issued before the clear never
    /// match entries inserted after it.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Slot index for a handle, if its entry is still the one in the slot
    fn live_index(&self, handle: EntryHandle) -> Option<usize> {
        match self.slots.get(handle.index) {
            Some(Some(entry)) if entry.generation == handle.generation => Some(handle.index),
            _ => None,
        }
    }

    fn entry_at(&self, idx: usize) -> Option<(&K, &V)> {
        self.slots[idx]
            .as_ref()
            .map(|entry| (&entry.key, &entry.value))
    }

    fn remove_at(&mut self, idx: usize) -> Option<(K, V)> {
        self.unlink(idx);
        let entry = self.slots[idx].take()?;
        self.free_list.push(idx);
        self.len -= 1;
        Some(entry.into_pair())
    }

    fn alloc_slot(&mut self, key: K, value: V) -> EntryHandle {
        let generation = self.next_generation;
        self.next_generation += 1;
        let entry = Some(Entry::new(key, value, generation));

        let index = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = entry;
            idx
        } else {
            self.slots.push(entry);
            self.slots.len() - 1
        };

        EntryHandle { index, generation }
    }

    /// Attach a detached slot at the head
    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;

        if let Some(entry) = &mut self.slots[idx] {
            entry.prev = None;
            entry.next = old_head;
        }

        match old_head {
            Some(head_idx) => {
                if let Some(head) = &mut self.slots[head_idx] {
                    head.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }

        self.head = Some(idx);
    }

    /// Detach a slot from its neighbours, leaving its own links cleared
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &mut self.slots[idx] {
            Some(entry) => (entry.prev.take(), entry.next.take()),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_entry) = &mut self.slots[prev_idx] {
                    prev_entry.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_idx) => {
                if let Some(next_entry) = &mut self.slots[next_idx] {
                    next_entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    /// Walk the chain both ways and panic on any broken link
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.head.is_none(), self.tail.is_none());
        assert_eq!(self.head.is_none(), self.len == 0);

        let mut forward = Vec::new();
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let entry = self.slots[idx].as_ref().expect("linked slot is empty");
            assert_eq!(entry.prev, prev, "broken prev link at slot {}", idx);
            forward.push(idx);
            assert!(forward.len() <= self.len, "cycle or stale len");
            prev = Some(idx);
            cursor = entry.next;
        }
        assert_eq!(prev, self.tail);
        assert_eq!(forward.len(), self.len);

        let mut backward = Vec::new();
        let mut cursor = self.tail;
        while let Some(idx) = cursor {
            backward.push(idx);
            assert!(backward.len() <= self.len, "cycle in prev links");
            cursor = self.slots[idx].as_ref().and_then(|entry| entry.prev);
        }
        backward.reverse();
        assert_eq!(forward, backward);

        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.len);
        assert_eq!(occupied + self.free_list.len(), self.slots.len());
    }
}

impl<K, V> Default for OrderedList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over list entries from most to least recently used
pub struct Iter<'a, K, V> {
    slots: &'a [Option<Entry<K, V>>],
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let entry = self.slots[idx].as_ref()?;
        self.next = entry.next;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
