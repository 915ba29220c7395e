// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty queue: keys waiting for the next validation pass.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::kinds::DirtyKinds;

/// Coalescing queue of dirty keys with generation tracking.
///
/// Each key appears at most once. Marking a key that is already queued merges
/// the new kinds into its entry instead of appending a second one, so a node
/// mutated many times between passes is validated once. Entries keep the
/// order in which their key was first marked.
///
/// The generation counter increments on every mutation and can be used to
/// detect whether the queue changed since a previous observation.
///
/// # Type Parameters
///
/// - `K`: The key type, typically a node identifier. Must be `Copy + Eq + Hash`.
///
/// # Example
///
/// ```
/// use canopy_dirty::{DirtyKinds, DirtyQueue};
///
/// let mut queue = DirtyQueue::<u32>::new();
///
/// assert!(queue.mark(1, DirtyKinds::DRAW));
/// assert!(!queue.mark(1, DirtyKinds::MEASURE));
/// assert_eq!(queue.kinds(1), DirtyKinds::DRAW | DirtyKinds::MEASURE);
///
/// // A removed key is skipped by `take`.
/// queue.mark(2, DirtyKinds::DRAW);
/// queue.remove(2);
/// assert_eq!(queue.take(), vec![(1, DirtyKinds::GEOMETRY)]);
/// ```
#[derive(Debug, Clone)]
pub struct DirtyQueue<K>
where
    K: Copy + Eq + Hash,
{
    /// Entries in first-mark order. Removed entries hold empty kinds.
    entries: Vec<(K, DirtyKinds)>,
    /// Position of each live key in `entries`.
    index: HashMap<K, usize>,
    /// Generation counter, incremented on each mutation.
    generation: u64,
}

impl<K> Default for DirtyQueue<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DirtyQueue<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates a new empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            generation: 0,
        }
    }

    /// Returns the current generation.
    ///
    /// The generation is incremented on every mutation (mark, remove, take,
    /// clear).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks `key` dirty in `kinds`.
    ///
    /// Returns `true` if the key was newly queued, `false` if it was already
    /// queued and the kinds were merged into its entry. Marking with empty
    /// kinds is a no-op that returns `false`.
    pub fn mark(&mut self, key: K, kinds: DirtyKinds) -> bool {
        if kinds.is_empty() {
            return false;
        }
        self.generation = self.generation.wrapping_add(1);
        if let Some(&idx) = self.index.get(&key) {
            self.entries[idx].1 |= kinds;
            false
        } else {
            self.index.insert(key, self.entries.len());
            self.entries.push((key, kinds));
            true
        }
    }

    /// Returns the kinds currently queued for `key` (empty if not queued).
    #[must_use]
    pub fn kinds(&self, key: K) -> DirtyKinds {
        self.index
            .get(&key)
            .map(|&idx| self.entries[idx].1)
            .unwrap_or_default()
    }

    /// Returns `true` if `key` is queued.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.index.contains_key(&key)
    }

    /// Removes `key` from the queue, returning the kinds it held.
    ///
    /// This is used when a node is disposed before the next pass.
    pub fn remove(&mut self, key: K) -> Option<DirtyKinds> {
        let idx = self.index.remove(&key)?;
        self.generation = self.generation.wrapping_add(1);
        let kinds = core::mem::take(&mut self.entries[idx].1);
        if self.index.is_empty() {
            self.entries.clear();
        }
        Some(kinds)
    }

    /// Returns the number of queued keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no keys are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns an iterator over the queued keys and their kinds, in order.
    ///
    /// This does not clear the queue. Use [`take`](Self::take) to consume it.
    pub fn iter(&self) -> impl Iterator<Item = (K, DirtyKinds)> + '_ {
        self.entries
            .iter()
            .copied()
            .filter(|(_, kinds)| !kinds.is_empty())
    }

    /// Takes every queued entry, leaving the queue empty.
    ///
    /// Keys marked after this call belong to the next batch.
    pub fn take(&mut self) -> Vec<(K, DirtyKinds)> {
        self.generation = self.generation.wrapping_add(1);
        self.index.clear();
        let mut entries = core::mem::take(&mut self.entries);
        entries.retain(|(_, kinds)| !kinds.is_empty());
        entries
    }

    /// Clears the queue.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.index.clear();
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn mark_and_query() {
        let mut queue = DirtyQueue::<u32>::new();

        assert!(queue.is_empty());
        assert!(!queue.contains(1));

        assert!(queue.mark(1, DirtyKinds::DRAW));
        assert!(queue.contains(1));
        assert_eq!(queue.kinds(1), DirtyKinds::DRAW);
        assert_eq!(queue.len(), 1);

        // Marking again merges instead of inserting.
        assert!(!queue.mark(1, DirtyKinds::POSITION));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.kinds(1), DirtyKinds::DRAW | DirtyKinds::POSITION);
    }

    #[test]
    fn empty_mark_is_noop() {
        let mut queue = DirtyQueue::<u32>::new();
        let generation = queue.generation();
        assert!(!queue.mark(1, DirtyKinds::empty()));
        assert!(queue.is_empty());
        assert_eq!(queue.generation(), generation);
    }

    #[test]
    fn take_preserves_first_mark_order() {
        let mut queue = DirtyQueue::<u32>::new();

        queue.mark(3, DirtyKinds::DRAW);
        queue.mark(1, DirtyKinds::MEASURE);
        queue.mark(2, DirtyKinds::POSITION);
        queue.mark(3, DirtyKinds::MEASURE);

        let keys: Vec<_> = queue.take().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![3, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn removed_keys_are_skipped() {
        let mut queue = DirtyQueue::<u32>::new();

        queue.mark(1, DirtyKinds::DRAW);
        queue.mark(2, DirtyKinds::DRAW);
        assert_eq!(queue.remove(1), Some(DirtyKinds::DRAW));
        assert_eq!(queue.remove(1), None);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().count(), 1);
        assert_eq!(queue.take(), vec![(2, DirtyKinds::DRAW)]);
    }

    #[test]
    fn remark_after_remove_appends() {
        let mut queue = DirtyQueue::<u32>::new();

        queue.mark(1, DirtyKinds::DRAW);
        queue.mark(2, DirtyKinds::DRAW);
        queue.remove(1);
        queue.mark(1, DirtyKinds::MEASURE);

        assert_eq!(
            queue.take(),
            vec![(2, DirtyKinds::DRAW), (1, DirtyKinds::MEASURE)]
        );
    }

    #[test]
    fn marks_after_take_start_a_new_batch() {
        let mut queue = DirtyQueue::<u32>::new();

        queue.mark(1, DirtyKinds::DRAW);
        let first = queue.take();
        queue.mark(1, DirtyKinds::MEASURE);

        assert_eq!(first, vec![(1, DirtyKinds::DRAW)]);
        assert_eq!(queue.take(), vec![(1, DirtyKinds::MEASURE)]);
    }

    #[test]
    fn generation_increments() {
        let mut queue = DirtyQueue::<u32>::new();
        let initial = queue.generation();

        queue.mark(1, DirtyKinds::DRAW);
        assert_eq!(queue.generation(), initial + 1);

        queue.mark(1, DirtyKinds::DRAW);
        assert_eq!(queue.generation(), initial + 2);

        let _ = queue.take();
        assert_eq!(queue.generation(), initial + 3);

        queue.clear();
        assert_eq!(queue.generation(), initial + 4);
    }
}
