//! Collision detection and response
//!
//! This module provides the broad phase and the contact response:
//! - A fixed-capacity uniform grid rebuilt every sub-step
//! - A world-to-cell mapping over the containment boundary's bounding box
//! - A two-phase slab schedule that resolves contacts in parallel

mod broad_phase;
mod grid;
mod response;

pub use broad_phase::{slab_count, solve_collisions, SLAB_WIDTH};
pub use grid::{CollisionCell, CollisionGrid, GridMapping, CELL_CAPACITY, MAX_GRID_CELLS};
pub use response::{resolve_contact, DEFAULT_RESPONSE_COEFFICIENT};
