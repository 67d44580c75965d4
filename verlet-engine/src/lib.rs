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
//! # Verlet Engine
//!
//! A real-time 2D particle solver: circular particles advanced with
//! position Verlet integration, overlap collisions found through a uniform
//! grid, and bulk passes spread over a fixed worker pool.
//!
//! ## Features
//!
//! - **Stable handles**: generational slot store, handles survive unrelated removals
//! - **Broad phase**: fixed-capacity uniform grid rebuilt every sub-step
//! - **Sub-stepping**: configurable sub-steps per frame for stable dense piles
//! - **Parallelization**: spinning worker pool, or rayon with the `parallel` feature
//! - **Determinism**: identical results for every worker count
//!
//! Rendering, windowing and input are left to the caller, which reads
//! particle positions and colours between updates.
//!
//! ## Example
//!
//! ```rust
//! use glam::Vec2;
//! use verlet_engine::{PhysicsSolver, SolverConfig};
//!
//! let config = SolverConfig::default().with_sub_steps(8);
//! let mut solver = PhysicsSolver::new(config).unwrap();
//! solver.set_boundary(Vec2::ZERO, 450.0).unwrap();
//!
//! let a = solver.add_particle(Vec2::new(-5.0, 0.0), 25.0).unwrap();
//! let b = solver.add_particle(Vec2::new(5.0, 0.0), 25.0).unwrap();
//! solver.update();
//!
//! let pa = solver.particle(a).unwrap().position();
//! let pb = solver.particle(b).unwrap().position();
//! assert!(pa.distance(pb) > 10.0);
//! ```

#![warn(missing_docs)]

/// Generational slot storage
pub mod store;

/// Uniform grid broad phase and contact response
pub mod collision;

/// Position Verlet integration
pub mod integration;

/// Range dispatch backends
pub mod pool;

/// Simulation loop and configuration
pub mod solver;

/// Error types
pub mod error;

mod color;
mod particle;

pub use color::Color;
pub use error::{ConfigError, PoolError, SolverError};
pub use particle::Particle;
pub use solver::{Boundary, PhysicsSolver, SolverConfig};
pub use store::{SlotId, SlotStore};
