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
//! Slot identifiers
//!
//! A `SlotId` is the handle handed out by a [`SlotStore`](super::SlotStore).
//! It pairs the redirection index with the operation id recorded when the
//! slot was last filled, so a handle to a freed and reused slot no longer
//! matches.

use std::fmt;

/// Stable handle to a value held in a `SlotStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: u64,
    op_id: u64,
}

impl SlotId {
    /// Create a handle from a redirection index and an operation id
    pub fn new(index: u64, op_id: u64) -> Self {
        SlotId { index, op_id }
    }

    /// Get the redirection index
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Get the operation id recorded when the handle was issued
    pub fn op_id(&self) -> u64 {
        self.op_id
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({}, op: {})", self.index, self.op_id)
    }
}
