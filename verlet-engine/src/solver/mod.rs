//! Particle solver
//!
//! This module ties the slot store, collision grid, integrator and range
//! dispatcher together into a sub-stepped simulation loop:
//! - `SolverConfig` with validated simulation parameters
//! - `Boundary` for circular containment
//! - `PhysicsSolver` owning all simulation state

mod boundary;
mod config;
mod physics;

pub use boundary::Boundary;
pub use config::SolverConfig;
pub use physics::PhysicsSolver;
