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
//! Grid-driven collision pass
//!
//! Every particle index in a cell is tested against the indices in the same
//! cell and its eight neighbours. A pair is only resolved from the side
//! with the smaller index, so each pair is seen once per pass.
//!
//! # Parallel Schedule
//!
//! The grid is cut into vertical slabs of [`SLAB_WIDTH`] columns. Resolving
//! a slab writes particles in its own columns plus one column on either
//! side, so two slabs that are two apart never touch the same particle.
//! The pass runs all even slabs concurrently, then all odd slabs.
//!
//! ```text
//! columns: | 0 1 | 2 3 | 4 5 | 6 7 | 8 9 |
//! slab:    |  0  |  1  |  2  |  3  |  4  |
//! phase 0:    *           *           *
//! phase 1:          *           *
//! ```
//!
//! Slabs are fixed by the grid width rather than the worker count, and
//! slabs within a phase are independent, so the result is bit-identical
//! for every dispatcher.

use super::response::resolve_contact;
use super::CollisionGrid;
use crate::particle::Particle;
use crate::pool::{RangeDispatcher, SharedMut};

/// Number of grid columns in one slab
pub const SLAB_WIDTH: usize = 2;

/// Number of slabs needed to cover a grid of `width` columns
pub fn slab_count(width: usize) -> usize {
    (width + SLAB_WIDTH - 1) / SLAB_WIDTH
}

/// Resolve every overlapping candidate pair found through `grid`
///
/// `grid` must have been populated from `particles` (cell entries are
/// indices into `particles`), with each particle in at most one cell.
/// Returns the number of contacts resolved.
///
/// # Panics
///
/// Panics if the grid holds an index outside `particles`.
pub fn solve_collisions(
    grid: &CollisionGrid,
    particles: &mut [Particle],
    response_coefficient: f32,
    dispatcher: &dyn RangeDispatcher,
) -> usize {
    let slabs = slab_count(grid.width());
    let shared = SharedMut::new(particles);
    let mut contacts = 0;

    for phase in 0..2 {
        let phase_slabs = (slabs + 1 - phase) / 2;
        let phase_contacts = std::sync::atomic::AtomicUsize::new(0);
        dispatcher.dispatch(phase_slabs, &|start, end| {
            let mut local = 0;
            for k in start..end {
                let slab = 2 * k + phase;
                // SAFETY: slabs of one phase are two slabs apart, so their
                // write halos are disjoint, and each particle index appears
                // in exactly one cell.
                local += unsafe { solve_slab(grid, &shared, slab, response_coefficient) };
            }
            phase_contacts.fetch_add(local, std::sync::atomic::Ordering::Relaxed);
        });
        contacts += phase_contacts.into_inner();
    }

    contacts
}

/// Resolve contacts for particles whose cell lies in `slab`
///
/// # Safety
///
/// No other thread may access particles stored in columns
/// `slab * SLAB_WIDTH - 1 ..= (slab + 1) * SLAB_WIDTH` while this runs.
unsafe fn solve_slab(
    grid: &CollisionGrid,
    particles: &SharedMut<'_, Particle>,
    slab: usize,
    response_coefficient: f32,
) -> usize {
    let first = slab * SLAB_WIDTH;
    let last = (first + SLAB_WIDTH).min(grid.width());
    let mut contacts = 0;

    for x in first..last {
        for y in 0..grid.height() {
            for &i in grid.cell(x, y).objects() {
                contacts += solve_neighbourhood(grid, particles, x, y, i, response_coefficient);
            }
        }
    }
    contacts
}

/// Test particle `i`, stored in cell `(x, y)`, against higher indices in the
/// surrounding 3x3 block
unsafe fn solve_neighbourhood(
    grid: &CollisionGrid,
    particles: &SharedMut<'_, Particle>,
    x: usize,
    y: usize,
    i: u32,
    response_coefficient: f32,
) -> usize {
    let x_range = x.saturating_sub(1)..=(x + 1).min(grid.width() - 1);
    let y_range = y.saturating_sub(1)..=(y + 1).min(grid.height() - 1);
    let mut contacts = 0;

    for nx in x_range {
        for ny in y_range.clone() {
            for &j in grid.cell(nx, ny).objects() {
                if j <= i {
                    continue;
                }
                let a = particles.get_mut(i as usize);
                let b = particles.get_mut(j as usize);
                if resolve_contact(a, b, response_coefficient) {
                    contacts += 1;
                }
            }
        }
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::GridMapping;
    use crate::pool::{Sequential, ThreadPool};
    use glam::Vec2;

    fn populate(mapping: &GridMapping, particles: &[Particle]) -> CollisionGrid {
        let mut grid = mapping.build_grid();
        for (i, p) in particles.iter().enumerate() {
            grid.add_to_index(mapping.cell_index(p.position()), i as u32);
        }
        grid
    }

    fn lattice(count_per_side: usize, spacing: f32, radius: f32) -> Vec<Particle> {
        let mut particles = Vec::new();
        for i in 0..count_per_side {
            for j in 0..count_per_side {
                let jitter = ((i * 7 + j * 13) % 5) as f32 * 0.01;
                let position = Vec2::new(
                    -100.0 + i as f32 * spacing + jitter,
                    -100.0 + j as f32 * spacing - jitter,
                );
                particles.push(Particle::new(position, radius));
            }
        }
        particles
    }

    #[test]
    fn test_slab_count() {
        assert_eq!(slab_count(0), 0);
        assert_eq!(slab_count(1), 1);
        assert_eq!(slab_count(2), 1);
        assert_eq!(slab_count(5), 3);
    }

    #[test]
    fn test_pair_in_neighbouring_cells() {
        let mapping = GridMapping::covering(Vec2::ZERO, 100.0, 10.0).unwrap();
        let mut particles = vec![
            Particle::new(Vec2::new(-0.5, 0.0), 4.0),
            Particle::new(Vec2::new(0.5, 0.0), 4.0),
        ];
        let grid = populate(&mapping, &particles);
        assert_ne!(
            mapping.cell_index(particles[0].position()),
            mapping.cell_index(particles[1].position())
        );

        let contacts = solve_collisions(&grid, &mut particles, 0.75, &Sequential);
        assert_eq!(contacts, 1);
        assert!(particles[0].position().distance(particles[1].position()) > 1.0);
    }

    #[test]
    fn test_distant_pair_ignored() {
        let mapping = GridMapping::covering(Vec2::ZERO, 100.0, 10.0).unwrap();
        let mut particles = vec![
            Particle::new(Vec2::new(-50.0, 0.0), 4.0),
            Particle::new(Vec2::new(50.0, 0.0), 4.0),
        ];
        let grid = populate(&mapping, &particles);
        assert_eq!(solve_collisions(&grid, &mut particles, 0.75, &Sequential), 0);
    }

    #[test]
    fn test_each_pair_resolved_once() {
        // Three mutually overlapping particles in one cell
        let mapping = GridMapping::covering(Vec2::ZERO, 100.0, 10.0).unwrap();
        let mut particles = vec![
            Particle::new(Vec2::new(1.0, 1.0), 2.0),
            Particle::new(Vec2::new(2.0, 1.0), 2.0),
            Particle::new(Vec2::new(1.5, 2.0), 2.0),
        ];
        let grid = populate(&mapping, &particles);
        assert_eq!(solve_collisions(&grid, &mut particles, 0.75, &Sequential), 3);
    }

    #[test]
    fn test_pool_matches_sequential() {
        let mapping = GridMapping::covering(Vec2::ZERO, 100.0, 10.0).unwrap();
        let mut sequential = lattice(30, 6.0, 4.0);
        let mut pooled = sequential.clone();
        let grid = populate(&mapping, &sequential);

        let pool = ThreadPool::new(4).unwrap();
        let a = solve_collisions(&grid, &mut sequential, 0.75, &Sequential);
        let b = solve_collisions(&grid, &mut pooled, 0.75, &pool);

        assert!(a > 0);
        assert_eq!(a, b);
        assert_eq!(sequential, pooled);
    }
}
