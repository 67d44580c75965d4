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
//! Sub-stepped Verlet particle solver
//!
//! Each call to [`PhysicsSolver::update`] advances one frame. The frame is
//! split into `sub_steps` equal steps, and every step runs, in order:
//!
//! 1. Grid rebuild: clear the grid and bucket every particle by position
//! 2. Collisions: resolve overlaps found in each particle's 3x3 neighbourhood
//! 3. Containment: project escaped particles back inside the boundary
//! 4. Integration: apply gravity and advance positions by one step
//!
//! The solver owns all of its state. Reads through [`PhysicsSolver::particles`]
//! are only possible between updates, which the borrow checker enforces.

use super::config::{validate_sub_steps, validate_update_rate};
use super::{Boundary, SolverConfig};
use crate::collision::{self, CollisionGrid, GridMapping};
use crate::error::SolverError;
use crate::integration::PositionVerlet;
use crate::particle::Particle;
use crate::pool::{RangeDispatcher, Sequential, SharedMut, ThreadPool};
use crate::store::{SlotId, SlotStore};
use crate::Color;
use glam::Vec2;
use log::{debug, trace};
use std::sync::Arc;

/// Verlet particle solver with a circular containment boundary
///
/// # Examples
///
/// ```
/// use glam::Vec2;
/// use verlet_engine::{PhysicsSolver, SolverConfig};
///
/// let mut solver = PhysicsSolver::new(SolverConfig::default().with_sub_steps(8)).unwrap();
/// solver.set_boundary(Vec2::ZERO, 450.0).unwrap();
///
/// let id = solver.add_particle(Vec2::new(0.0, 100.0), 10.0).unwrap();
/// solver.set_velocity(id, Vec2::new(50.0, 0.0)).unwrap();
///
/// for _ in 0..60 {
///     solver.update();
/// }
/// assert!((solver.time() - 1.0).abs() < 1e-4);
/// assert!(solver.particle(id).unwrap().position().x > 0.0);
/// ```
pub struct PhysicsSolver {
    config: SolverConfig,
    boundary: Boundary,
    mapping: GridMapping,
    grid: CollisionGrid,
    particles: SlotStore<Particle>,
    integrator: PositionVerlet,
    dispatcher: Arc<dyn RangeDispatcher>,
    cell_indices: Vec<usize>,
    time: f32,
}

impl PhysicsSolver {
    /// Create a solver from a configuration
    ///
    /// Starts an owned `ThreadPool` when `config.worker_count > 0`.
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        config.validate()?;
        let dispatcher: Arc<dyn RangeDispatcher> = if config.worker_count > 0 {
            Arc::new(ThreadPool::new(config.worker_count)?)
        } else {
            Arc::new(Sequential)
        };
        Self::with_dispatcher(config, dispatcher)
    }

    /// Create a solver that runs bulk passes on `dispatcher`
    ///
    /// `config.worker_count` is ignored. The dispatcher may be shared with
    /// other solvers.
    pub fn with_dispatcher(
        config: SolverConfig,
        dispatcher: Arc<dyn RangeDispatcher>,
    ) -> Result<Self, SolverError> {
        config.validate()?;
        let boundary = Boundary::default();
        let mapping = Self::mapping_for(&boundary, config.cell_size)?;
        debug!(
            "Created solver: {} sub-steps at {} Hz, {}x{} grid, dispatcher {} ({} workers)",
            config.sub_steps,
            config.update_rate,
            mapping.width(),
            mapping.height(),
            dispatcher.name(),
            dispatcher.worker_count()
        );

        Ok(PhysicsSolver {
            integrator: PositionVerlet::with_damping(config.velocity_damping),
            grid: mapping.build_grid(),
            mapping,
            boundary,
            config,
            particles: SlotStore::new(),
            dispatcher,
            cell_indices: Vec::new(),
            time: 0.0,
        })
    }

    /// Spawn a particle at rest and return its handle
    ///
    /// The diameter must fit in one grid cell, i.e. `radius <=
    /// cell_size / 2`; larger particles could collide with partners outside
    /// the 3x3 neighbourhood.
    pub fn add_particle(&mut self, position: Vec2, radius: f32) -> Result<SlotId, SolverError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(SolverError::InvalidRadius(radius));
        }
        let max = self.config.max_radius();
        if radius > max {
            return Err(SolverError::RadiusTooLarge { radius, max });
        }
        if !position.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        Ok(self.particles.insert(Particle::new(position, radius)))
    }

    /// Remove a particle, returning its final state
    ///
    /// Other handles stay valid. Returns `None` if `id` is stale.
    pub fn remove_particle(&mut self, id: SlotId) -> Option<Particle> {
        self.particles.remove(id)
    }

    /// Set a particle's velocity in units per second
    ///
    /// The velocity is stored as a position offset for the current sub-step
    /// length, so it should be set after the sub-step count and update rate.
    pub fn set_velocity(&mut self, id: SlotId, velocity: Vec2) -> Result<(), SolverError> {
        if !velocity.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        let dt = self.step_dt();
        self.particle_mut(id)?.set_velocity(velocity, dt);
        Ok(())
    }

    /// Move a particle, keeping its velocity
    pub fn set_position(&mut self, id: SlotId, position: Vec2) -> Result<(), SolverError> {
        if !position.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        self.particle_mut(id)?.teleport(position);
        Ok(())
    }

    /// Set a particle's display colour
    pub fn set_color(&mut self, id: SlotId, color: Color) -> Result<(), SolverError> {
        self.particle_mut(id)?.set_color(color);
        Ok(())
    }

    /// Move the containment boundary and rebuild the grid to cover it
    ///
    /// Fails with `GridTooLarge` if covering the boundary would take more
    /// than `MAX_GRID_CELLS` cells; the previous boundary is kept.
    pub fn set_boundary(&mut self, center: Vec2, radius: f32) -> Result<(), SolverError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(SolverError::InvalidBoundary(radius));
        }
        if !center.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        let boundary = Boundary::new(center, radius);
        let mapping = Self::mapping_for(&boundary, self.config.cell_size)?;
        self.boundary = boundary;
        self.mapping = mapping;
        self.grid = mapping.build_grid();
        debug!(
            "Boundary set to {:?} r={}, grid {}x{}",
            center,
            radius,
            self.mapping.width(),
            self.mapping.height()
        );
        Ok(())
    }

    /// Set the number of sub-steps per frame
    pub fn set_sub_step_count(&mut self, sub_steps: u32) -> Result<(), SolverError> {
        validate_sub_steps(sub_steps)?;
        self.config.sub_steps = sub_steps;
        debug!("Sub-step count set to {}", sub_steps);
        Ok(())
    }

    /// Set the simulation rate in Hz
    pub fn set_update_rate(&mut self, rate: f32) -> Result<(), SolverError> {
        validate_update_rate(rate)?;
        self.config.update_rate = rate;
        debug!("Update rate set to {} Hz", rate);
        Ok(())
    }

    /// Set the acceleration applied to every particle
    pub fn set_gravity(&mut self, gravity: Vec2) -> Result<(), SolverError> {
        if !gravity.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        self.config.gravity = gravity;
        Ok(())
    }

    /// Advance the simulation by one frame
    pub fn update(&mut self) {
        self.time += self.config.frame_dt();
        let step_dt = self.step_dt();

        for _ in 0..self.config.sub_steps {
            self.populate_grid();
            collision::solve_collisions(
                &self.grid,
                self.particles.as_mut_slice(),
                self.config.response_coefficient,
                &*self.dispatcher,
            );
            self.apply_constraint();
            self.update_particles(step_dt);
        }

        trace!(
            "Frame done: t={:.4}s, {} particles",
            self.time,
            self.particles.len()
        );
    }

    /// Get a particle by handle
    pub fn particle(&self, id: SlotId) -> Option<&Particle> {
        self.particles.get(id)
    }

    /// Check whether a handle still refers to a live particle
    pub fn is_valid(&self, id: SlotId) -> bool {
        self.particles.is_valid(id)
    }

    /// Read-only view of every particle
    pub fn particles(&self) -> &SlotStore<Particle> {
        &self.particles
    }

    /// Number of live particles
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Get the containment boundary
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Simulated time elapsed across all updates
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Length of one frame in seconds
    pub fn frame_dt(&self) -> f32 {
        self.config.frame_dt()
    }

    /// Length of one sub-step in seconds
    pub fn step_dt(&self) -> f32 {
        self.config.step_dt()
    }

    /// Number of sub-steps per frame
    pub fn sub_steps(&self) -> u32 {
        self.config.sub_steps
    }

    /// Get the active configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Collision grid as left by the last sub-step
    pub fn grid(&self) -> &CollisionGrid {
        &self.grid
    }

    /// Get the dispatcher running bulk passes
    pub fn dispatcher(&self) -> &dyn RangeDispatcher {
        &*self.dispatcher
    }

    fn mapping_for(boundary: &Boundary, cell_size: f32) -> Result<GridMapping, SolverError> {
        GridMapping::covering(boundary.center(), boundary.radius(), cell_size)
    }

    fn particle_mut(&mut self, id: SlotId) -> Result<&mut Particle, SolverError> {
        self.particles.get_mut(id).ok_or(SolverError::StaleId(id))
    }

    fn populate_grid(&mut self) {
        self.grid.clear();

        let particles = self.particles.as_slice();
        let mapping = self.mapping;
        self.cell_indices.resize(particles.len(), 0);
        let cells = SharedMut::new(&mut self.cell_indices);
        self.dispatcher.dispatch(particles.len(), &|start, end| {
            for (i, particle) in particles[start..end].iter().enumerate() {
                // SAFETY: dispatch ranges are disjoint
                unsafe { *cells.get_mut(start + i) = mapping.cell_index(particle.position()) };
            }
        });

        // Insert in dense order so bucket contents do not depend on threading
        for (i, &cell) in self.cell_indices.iter().enumerate() {
            self.grid.add_to_index(cell, i as u32);
        }
        if self.grid.dropped() > 0 {
            debug!(
                "Collision grid full: dropped {} of {} particles this sub-step",
                self.grid.dropped(),
                self.particles.len()
            );
        }
    }

    fn apply_constraint(&mut self) {
        let boundary = self.boundary;
        let particles = SharedMut::new(self.particles.as_mut_slice());
        self.dispatcher.dispatch(particles.len(), &|start, end| {
            for i in start..end {
                // SAFETY: dispatch ranges are disjoint
                boundary.constrain(unsafe { particles.get_mut(i) });
            }
        });
    }

    fn update_particles(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        let integrator = self.integrator;
        let particles = SharedMut::new(self.particles.as_mut_slice());
        self.dispatcher.dispatch(particles.len(), &|start, end| {
            for i in start..end {
                // SAFETY: dispatch ranges are disjoint
                let particle = unsafe { particles.get_mut(i) };
                particle.accelerate(gravity);
                integrator.step(particle, dt);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> PhysicsSolver {
        PhysicsSolver::new(SolverConfig::default()).unwrap()
    }

    #[test]
    fn test_solver_creation() {
        let s = solver();
        assert_eq!(s.particle_count(), 0);
        assert_eq!(s.time(), 0.0);
        assert_eq!(s.boundary(), Boundary::default());
        assert_eq!(s.dispatcher().name(), "Sequential");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = PhysicsSolver::new(SolverConfig::default().with_sub_steps(0));
        assert!(matches!(result, Err(SolverError::Config(_))));
    }

    #[test]
    fn test_add_particle_validation() {
        let mut s = solver();
        assert!(matches!(
            s.add_particle(Vec2::ZERO, 0.0),
            Err(SolverError::InvalidRadius(_))
        ));
        assert!(matches!(
            s.add_particle(Vec2::ZERO, 26.0),
            Err(SolverError::RadiusTooLarge { .. })
        ));
        assert!(matches!(
            s.add_particle(Vec2::new(f32::NAN, 0.0), 1.0),
            Err(SolverError::NonFiniteVector)
        ));
        assert!(s.add_particle(Vec2::ZERO, 25.0).is_ok());
        assert_eq!(s.particle_count(), 1);
    }

    #[test]
    fn test_sub_step_setter_stores_value() {
        let mut s = solver();
        s.set_sub_step_count(8).unwrap();
        assert_eq!(s.sub_steps(), 8);
        assert!(s.set_sub_step_count(0).is_err());
        assert_eq!(s.sub_steps(), 8);
    }

    #[test]
    fn test_update_rate_setter() {
        let mut s = solver();
        s.set_update_rate(120.0).unwrap();
        assert!((s.frame_dt() - 1.0 / 120.0).abs() < 1e-9);
        assert!(s.set_update_rate(-5.0).is_err());
    }

    #[test]
    fn test_set_boundary_rebuilds_grid() {
        let mut s = solver();
        s.set_boundary(Vec2::new(10.0, 10.0), 450.0).unwrap();
        assert_eq!(s.boundary().radius(), 450.0);
        assert_eq!(s.grid().width(), 18);
        assert!(matches!(
            s.set_boundary(Vec2::ZERO, -1.0),
            Err(SolverError::InvalidBoundary(_))
        ));
    }

    #[test]
    fn test_set_velocity_uses_step_dt() {
        let mut s = PhysicsSolver::new(SolverConfig::default().with_sub_steps(4)).unwrap();
        let id = s.add_particle(Vec2::ZERO, 5.0).unwrap();
        s.set_velocity(id, Vec2::new(240.0, 0.0)).unwrap();

        let p = s.particle(id).unwrap();
        assert!((p.velocity(s.step_dt()).x - 240.0).abs() < 1e-3);
        assert!((p.displacement().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stale_handle_operations() {
        let mut s = solver();
        let id = s.add_particle(Vec2::ZERO, 5.0).unwrap();
        assert!(s.remove_particle(id).is_some());

        assert!(!s.is_valid(id));
        assert!(s.particle(id).is_none());
        assert!(matches!(
            s.set_velocity(id, Vec2::X),
            Err(SolverError::StaleId(_))
        ));
        assert!(matches!(
            s.set_color(id, Color::WHITE),
            Err(SolverError::StaleId(_))
        ));
    }

    #[test]
    fn test_set_color_and_position() {
        let mut s = solver();
        let id = s.add_particle(Vec2::ZERO, 5.0).unwrap();
        s.set_color(id, Color::rainbow(1.0)).unwrap();
        s.set_position(id, Vec2::new(10.0, 0.0)).unwrap();

        let p = s.particle(id).unwrap();
        assert_eq!(p.color(), Color::rainbow(1.0));
        assert_eq!(p.position(), Vec2::new(10.0, 0.0));
        assert_eq!(p.displacement(), Vec2::ZERO);
    }

    #[test]
    fn test_gravity_pulls_particles() {
        let mut s = PhysicsSolver::new(
            SolverConfig::default().with_gravity(Vec2::new(0.0, 100.0)),
        )
        .unwrap();
        let id = s.add_particle(Vec2::ZERO, 5.0).unwrap();
        s.update();
        assert!(s.particle(id).unwrap().position().y > 0.0);
    }

    #[test]
    fn test_grid_holds_particles_after_update() {
        let mut s = solver();
        s.add_particle(Vec2::new(-20.0, 0.0), 5.0).unwrap();
        s.add_particle(Vec2::new(20.0, 0.0), 5.0).unwrap();
        s.update();
        assert_eq!(s.grid().len(), 2);
        assert_eq!(s.grid().dropped(), 0);
    }
}
