//! Generational slot storage
//!
//! This module provides the container that backs the particle population:
//! - Stable `SlotId` handles that survive unrelated removals
//! - Dense storage so bulk passes walk a contiguous slice
//! - O(1) validity checks for handles whose slot has been reused

mod id;
mod slot_store;

pub use id::SlotId;
pub use slot_store::{Iter, IterMut, SlotStore};
