// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Dense slot store with generational handles
//!
//! Values live in a dense `Vec` so bulk passes walk contiguous memory.
//! Removal swaps the last value into the hole, which means a value's dense
//! position changes over time. Handles never point at dense positions
//! directly; they go through a redirection table instead.
//!
//! # Memory Layout
//!
//! ```text
//! ids:      [rid -> dense position]           one entry per slot ever created
//! data:     [T, T, T, ...]                    live values only
//! metadata: [dense position -> (rid, op id)]  one entry per slot ever created
//! ```
//!
//! Positions `data.len()..metadata.len()` of `metadata` are the free list:
//! each remembers which redirection index it can hand out next, so inserts
//! after a removal reuse the freed handle index with a fresh operation id.

use super::SlotId;

/// Iterator over live values in dense order
pub type Iter<'a, T> = std::slice::Iter<'a, T>;

/// Mutable iterator over live values in dense order
pub type IterMut<'a, T> = std::slice::IterMut<'a, T>;

#[derive(Debug, Clone, Copy)]
struct SlotMetadata {
    /// Redirection index owning this dense position
    rid: u64,
    /// Operation id recorded when the position was last filled or freed
    op_id: u64,
}

/// Container mapping stable `SlotId` handles to densely stored values
///
/// # Examples
///
/// ```
/// use verlet_engine::store::SlotStore;
///
/// let mut store = SlotStore::new();
/// let a = store.insert("a");
/// let b = store.insert("b");
///
/// assert_eq!(store.remove(a), Some("a"));
/// assert!(!store.is_valid(a));
/// assert_eq!(store.get(b), Some(&"b"));
///
/// // The freed slot is reused, but the old handle stays invalid
/// let c = store.insert("c");
/// assert_eq!(c.index(), a.index());
/// assert!(!store.is_valid(a));
/// assert!(store.is_valid(c));
/// ```
#[derive(Debug, Clone)]
pub struct SlotStore<T> {
    data: Vec<T>,
    ids: Vec<u64>,
    metadata: Vec<SlotMetadata>,
    op_count: u64,
}

impl<T> SlotStore<T> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new store with room for `capacity` values
    pub fn with_capacity(capacity: usize) -> Self {
        SlotStore {
            data: Vec::with_capacity(capacity),
            ids: Vec::with_capacity(capacity),
            metadata: Vec::with_capacity(capacity),
            op_count: 0,
        }
    }

    /// Insert a value and return its handle
    ///
    /// Reuses a freed slot when one exists, otherwise grows the store by one
    /// slot. Allocation failure aborts the process.
    pub fn insert(&mut self, value: T) -> SlotId {
        let position = self.data.len();
        if position == self.metadata.len() {
            let rid = position as u64;
            let op_id = self.next_op();
            self.ids.push(position as u64);
            self.metadata.push(SlotMetadata { rid, op_id });
        } else {
            let op_id = self.next_op();
            self.metadata[position].op_id = op_id;
        }
        self.data.push(value);

        let meta = self.metadata[position];
        SlotId::new(meta.rid, meta.op_id)
    }

    /// Remove the value behind `id`
    ///
    /// The last live value is moved into the freed position so storage stays
    /// dense. Handles to the moved value remain valid. Returns `None` if `id`
    /// is stale.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let position = self.position(id)?;
        let last = self.data.len() - 1;
        let value = self.data.swap_remove(position);

        if position != last {
            let moved = self.metadata[last];
            self.metadata[position] = moved;
            self.ids[moved.rid as usize] = position as u64;
        }

        // Park the freed handle index at the head of the free region with an
        // op id nobody has been issued.
        let op_id = self.next_op();
        self.metadata[last] = SlotMetadata { rid: id.index(), op_id };
        self.ids[id.index() as usize] = last as u64;

        Some(value)
    }

    /// Check whether `id` still refers to the value it was issued for
    ///
    /// O(1) and side-effect free. Handles from another store may alias
    /// live values of this one; handles are only meaningful for the store
    /// that issued them.
    pub fn is_valid(&self, id: SlotId) -> bool {
        self.position(id).is_some()
    }

    /// Get a reference to the value behind `id`, or `None` if `id` is stale
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.position(id).map(|position| &self.data[position])
    }

    /// Get a mutable reference to the value behind `id`, or `None` if `id` is stale
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        let position = self.position(id)?;
        Some(&mut self.data[position])
    }

    /// Get the current dense position of `id`
    ///
    /// Positions change on removal, so this is only meaningful until the
    /// next `remove`.
    pub fn position(&self, id: SlotId) -> Option<usize> {
        let position = *self.ids.get(id.index() as usize)? as usize;
        if position < self.data.len() && self.metadata[position].op_id == id.op_id() {
            Some(position)
        } else {
            None
        }
    }

    /// Get the number of live values
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the store holds no live values
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of slots ever created (live plus free)
    pub fn capacity(&self) -> usize {
        self.metadata.len()
    }

    /// Remove every value, invalidating all outstanding handles
    ///
    /// Slots are kept and reused by later inserts.
    pub fn clear(&mut self) {
        for position in 0..self.data.len() {
            let op_id = self.next_op();
            self.metadata[position].op_id = op_id;
        }
        self.data.clear();
    }

    /// Iterate over live values in dense order
    ///
    /// The order is not stable across removals.
    pub fn iter(&self) -> Iter<'_, T> {
        self.data.iter()
    }

    /// Iterate mutably over live values in dense order
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Iterate over the handles of live values, in the same order as `iter`
    pub fn ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.metadata[..self.data.len()]
            .iter()
            .map(|meta| SlotId::new(meta.rid, meta.op_id))
    }

    /// Get the live values as a dense slice
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the live values as a mutable dense slice
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn next_op(&mut self) -> u64 {
        let op_id = self.op_count;
        self.op_count += 1;
        op_id
    }
}

impl<T> Default for SlotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a SlotStore<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut SlotStore<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
