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
//! Uniform collision grid
//!
//! The grid buckets particle indices by cell so collision candidates can be
//! found by scanning a 3x3 neighbourhood instead of every other particle.
//! Buckets have a fixed capacity; insertions into a full bucket are dropped.
//! That loses candidates in very dense cells for one sub-step, which is an
//! accepted approximation in exchange for allocation-free rebuilds.

use crate::error::SolverError;
use glam::Vec2;

/// Maximum number of particle indices a single cell can hold
pub const CELL_CAPACITY: usize = 4;

/// Largest number of cells a grid may have (2048 x 2048)
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// Fixed-capacity bucket of particle indices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionCell {
    count: u32,
    objects: [u32; CELL_CAPACITY],
}

impl CollisionCell {
    /// Append a particle index, returning `false` if the cell is full
    pub fn add(&mut self, object: u32) -> bool {
        let count = self.count as usize;
        if count == CELL_CAPACITY {
            return false;
        }
        self.objects[count] = object;
        self.count += 1;
        true
    }

    /// Remove a particle index by swapping the last entry into its place
    ///
    /// Returns `false` if the index was not in the cell.
    pub fn remove(&mut self, object: u32) -> bool {
        let count = self.count as usize;
        match self.objects[..count].iter().position(|&o| o == object) {
            Some(i) => {
                self.objects[i] = self.objects[count - 1];
                self.count -= 1;
                true
            }
            None => false,
        }
    }

    /// Reset the occupancy to zero
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Get the stored particle indices
    pub fn objects(&self) -> &[u32] {
        &self.objects[..self.count as usize]
    }

    /// Get the number of stored indices
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Check if the cell holds no indices
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if the cell is at capacity
    pub fn is_full(&self) -> bool {
        self.count as usize == CELL_CAPACITY
    }
}

/// Width x height array of collision cells
///
/// Cells are stored column-major (`x * height + y`) so that a vertical slab
/// of columns is a contiguous run of cells.
#[derive(Debug, Clone)]
pub struct CollisionGrid {
    width: usize,
    height: usize,
    cells: Vec<CollisionCell>,
    dropped: usize,
}

impl CollisionGrid {
    /// Create an empty grid with the given dimensions
    ///
    /// # Panics
    ///
    /// Panics if `width * height` exceeds [`MAX_GRID_CELLS`]
    pub fn new(width: usize, height: usize) -> Self {
        let cell_count = match width.checked_mul(height) {
            Some(n) if n <= MAX_GRID_CELLS => n,
            _ => panic!("Grid of {}x{} cells exceeds MAX_GRID_CELLS", width, height),
        };
        CollisionGrid {
            width,
            height,
            cells: vec![CollisionCell::default(); cell_count],
            dropped: 0,
        }
    }

    /// Get the number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Flat cell index of `(x, y)`
    #[inline]
    pub fn cell_index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// Get the cell at `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn cell(&self, x: usize, y: usize) -> &CollisionCell {
        &self.cells[self.cell_index(x, y)]
    }

    /// Get a cell by flat index
    pub fn cell_at(&self, index: usize) -> &CollisionCell {
        &self.cells[index]
    }

    /// Append `object` to the cell at `(x, y)`
    ///
    /// Coordinates must already be clamped to the grid. Returns `false` and
    /// counts the drop if the cell is full.
    pub fn add_to_cell(&mut self, x: usize, y: usize, object: u32) -> bool {
        let index = self.cell_index(x, y);
        self.add_to_index(index, object)
    }

    /// Append `object` to the cell with the given flat index
    pub fn add_to_index(&mut self, index: usize, object: u32) -> bool {
        let stored = self.cells[index].add(object);
        if !stored {
            self.dropped += 1;
        }
        stored
    }

    /// Remove `object` from the cell at `(x, y)`
    pub fn remove_from_cell(&mut self, x: usize, y: usize, object: u32) -> bool {
        let index = self.cell_index(x, y);
        self.cells[index].remove(object)
    }

    /// Reset every cell without releasing memory
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.dropped = 0;
    }

    /// Number of insertions dropped since the last `clear`
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Total number of stored indices
    pub fn len(&self) -> usize {
        self.cells.iter().map(CollisionCell::len).sum()
    }

    /// Check if no cell holds an index
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(CollisionCell::is_empty)
    }
}

/// Maps world positions onto grid coordinates
///
/// The mapping covers an axis-aligned square starting at `origin`. Positions
/// outside of it are clamped onto the border cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    origin: Vec2,
    cell_size: f32,
    width: usize,
    height: usize,
}

impl GridMapping {
    /// Create a mapping that covers the square of side `2 * half_extent`
    /// centred on `center`
    ///
    /// Fails with `SolverError::GridTooLarge` when the square needs more
    /// than [`MAX_GRID_CELLS`] cells.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` or `half_extent` is non-positive or not finite.
    pub fn covering(center: Vec2, half_extent: f32, cell_size: f32) -> Result<Self, SolverError> {
        assert!(
            cell_size > 0.0 && cell_size.is_finite(),
            "Cell size must be positive and finite"
        );
        assert!(
            half_extent > 0.0 && half_extent.is_finite(),
            "Grid extent must be positive and finite"
        );
        // Saturates to usize::MAX for absurd ratios
        let cells = ((2.0 * half_extent) / cell_size).ceil().max(1.0) as usize;
        match cells.checked_mul(cells) {
            Some(n) if n <= MAX_GRID_CELLS => Ok(GridMapping {
                origin: center - Vec2::splat(half_extent),
                cell_size,
                width: cells,
                height: cells,
            }),
            _ => Err(SolverError::GridTooLarge {
                width: cells,
                height: cells,
            }),
        }
    }

    /// Get the size of one cell in world units
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Get the number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Build an empty grid with this mapping's dimensions
    pub fn build_grid(&self) -> CollisionGrid {
        CollisionGrid::new(self.width, self.height)
    }

    /// Clamped grid coordinates of a world position
    #[inline]
    pub fn coords(&self, position: Vec2) -> (usize, usize) {
        let local = (position - self.origin) / self.cell_size;
        // `as usize` saturates negatives and NaN to zero
        let x = (local.x.floor() as usize).min(self.width - 1);
        let y = (local.y.floor() as usize).min(self.height - 1);
        (x, y)
    }

    /// Flat cell index of a world position, matching `CollisionGrid::cell_index`
    #[inline]
    pub fn cell_index(&self, position: Vec2) -> usize {
        let (x, y) = self.coords(position);
        x * self.height + y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_add_and_overflow() {
        let mut cell = CollisionCell::default();
        for i in 0..CELL_CAPACITY as u32 {
            assert!(cell.add(i));
        }
        assert!(cell.is_full());
        assert!(!cell.add(99));
        assert_eq!(cell.objects(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_cell_remove_swaps_last() {
        let mut cell = CollisionCell::default();
        cell.add(1);
        cell.add(2);
        cell.add(3);

        assert!(cell.remove(1));
        assert_eq!(cell.objects(), &[3, 2]);
        assert!(!cell.remove(42));
        assert_eq!(cell.len(), 2);
    }

    #[test]
    fn test_grid_add_and_clear() {
        let mut grid = CollisionGrid::new(4, 3);
        assert!(grid.add_to_cell(2, 1, 7));
        assert!(grid.add_to_cell(2, 1, 8));
        assert_eq!(grid.cell(2, 1).objects(), &[7, 8]);
        assert_eq!(grid.len(), 2);

        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
    }

    #[test]
    fn test_grid_counts_dropped() {
        let mut grid = CollisionGrid::new(1, 1);
        for i in 0..6 {
            grid.add_to_cell(0, 0, i);
        }
        assert_eq!(grid.cell(0, 0).len(), CELL_CAPACITY);
        assert_eq!(grid.dropped(), 2);

        grid.clear();
        assert_eq!(grid.dropped(), 0);
    }

    #[test]
    fn test_grid_remove_from_cell() {
        let mut grid = CollisionGrid::new(2, 2);
        grid.add_to_cell(1, 0, 5);
        assert!(grid.remove_from_cell(1, 0, 5));
        assert!(grid.cell(1, 0).is_empty());
    }

    #[test]
    fn test_mapping_dimensions() {
        let mapping = GridMapping::covering(Vec2::ZERO, 450.0, 50.0).unwrap();
        assert_eq!(mapping.width(), 18);
        assert_eq!(mapping.height(), 18);
    }

    #[test]
    fn test_mapping_coords_clamp() {
        let mapping = GridMapping::covering(Vec2::ZERO, 100.0, 50.0).unwrap();
        assert_eq!(mapping.coords(Vec2::new(-100.0, -100.0)), (0, 0));
        assert_eq!(mapping.coords(Vec2::new(-1.0, 1.0)), (1, 2));
        assert_eq!(mapping.coords(Vec2::new(-500.0, 500.0)), (0, 3));
        assert_eq!(mapping.coords(Vec2::new(f32::NAN, 0.0)), (0, 2));
    }

    #[test]
    #[should_panic(expected = "Cell size must be positive and finite")]
    fn test_mapping_zero_cell_size() {
        let _ = GridMapping::covering(Vec2::ZERO, 10.0, 0.0);
    }

    #[test]
    fn test_mapping_too_many_cells() {
        // 2048 x 2048 fits exactly, one more column does not
        let mapping = GridMapping::covering(Vec2::ZERO, 1024.0, 1.0).unwrap();
        assert_eq!(mapping.width() * mapping.height(), MAX_GRID_CELLS);

        assert!(matches!(
            GridMapping::covering(Vec2::ZERO, 1024.5, 1.0),
            Err(SolverError::GridTooLarge { width: 2049, height: 2049 })
        ));
        assert!(matches!(
            GridMapping::covering(Vec2::ZERO, 1.0e30, 1.0e-30),
            Err(SolverError::GridTooLarge { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "exceeds MAX_GRID_CELLS")]
    fn test_grid_dimensions_overflow() {
        CollisionGrid::new(usize::MAX, 2);
    }
}
