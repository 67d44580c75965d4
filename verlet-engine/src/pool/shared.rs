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
//! Shared mutable access for range tasks
//!
//! Range tasks receive `&self` closures, so a pass that writes per-element
//! results needs a way to hand every task a mutable view of the same slice.
//! `SharedMut` is that view. It does not check for overlapping access; the
//! caller guarantees that concurrently running tasks touch disjoint indices.

use std::marker::PhantomData;

/// Unchecked mutable view of a slice that can be shared across range tasks
pub(crate) struct SharedMut<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: a SharedMut only hands out references to T through `get_mut`,
// whose contract forbids two threads touching the same index.
unsafe impl<T: Send> Send for SharedMut<'_, T> {}
unsafe impl<T: Send> Sync for SharedMut<'_, T> {}

impl<'a, T> SharedMut<'a, T> {
    /// Borrow `slice` for shared mutable access
    pub(crate) fn new(slice: &'a mut [T]) -> Self {
        SharedMut {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Get a mutable reference to element `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Safety
    ///
    /// No other reference to element `index` may be alive, on this thread or
    /// any other, while the returned reference is in use.
    #[allow(clippy::mut_from_ref)]
    #[inline]
    pub(crate) unsafe fn get_mut(&self, index: usize) -> &mut T {
        assert!(index < self.len, "index {} out of bounds ({})", index, self.len);
        &mut *self.ptr.add(index)
    }
}
