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
//! Solver configuration

use crate::collision::DEFAULT_RESPONSE_COEFFICIENT;
use crate::error::ConfigError;
use glam::Vec2;

/// Configuration for a `PhysicsSolver`
///
/// # Examples
///
/// ```
/// use glam::Vec2;
/// use verlet_engine::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_sub_steps(8)
///     .with_update_rate(60.0)
///     .with_gravity(Vec2::new(0.0, 1000.0));
/// assert!(config.validate().is_ok());
/// assert!((config.step_dt() - 1.0 / 480.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Integration sub-steps per frame; more is stabler and slower
    pub sub_steps: u32,
    /// Frames per simulated second; the frame dt is `1 / update_rate`
    pub update_rate: f32,
    /// Fraction of the overlap removed per contact, in (0, 1]
    pub response_coefficient: f32,
    /// Drag opposing each particle's displacement; zero disables it
    pub velocity_damping: f32,
    /// Acceleration applied to every particle each sub-step
    pub gravity: Vec2,
    /// Side length of a collision grid cell; bounds the particle diameter
    pub cell_size: f32,
    /// Worker threads for bulk passes; zero runs everything on the caller
    pub worker_count: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            sub_steps: 1,
            update_rate: 60.0,
            response_coefficient: DEFAULT_RESPONSE_COEFFICIENT,
            velocity_damping: 0.0,
            gravity: Vec2::ZERO,
            cell_size: 50.0,
            worker_count: 0,
        }
    }
}

impl SolverConfig {
    /// Set the number of sub-steps per frame
    pub fn with_sub_steps(mut self, sub_steps: u32) -> Self {
        self.sub_steps = sub_steps;
        self
    }

    /// Set the simulation rate in Hz
    pub fn with_update_rate(mut self, rate: f32) -> Self {
        self.update_rate = rate;
        self
    }

    /// Set the collision response coefficient
    pub fn with_response_coefficient(mut self, coefficient: f32) -> Self {
        self.response_coefficient = coefficient;
        self
    }

    /// Set the velocity damping factor
    pub fn with_velocity_damping(mut self, damping: f32) -> Self {
        self.velocity_damping = damping;
        self
    }

    /// Set the gravity vector
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the collision grid cell size
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the number of worker threads
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Length of one frame in seconds
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.update_rate
    }

    /// Length of one sub-step in seconds
    pub fn step_dt(&self) -> f32 {
        self.frame_dt() / self.sub_steps as f32
    }

    /// Largest particle radius the grid supports
    pub fn max_radius(&self) -> f32 {
        0.5 * self.cell_size
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sub_steps(self.sub_steps)?;
        validate_update_rate(self.update_rate)?;
        let coefficient = self.response_coefficient;
        if !(coefficient > 0.0 && coefficient <= 1.0) {
            return Err(ConfigError::InvalidResponseCoefficient(coefficient));
        }
        if !(self.velocity_damping >= 0.0 && self.velocity_damping.is_finite()) {
            return Err(ConfigError::InvalidDamping(self.velocity_damping));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::InvalidGravity);
        }
        if !(self.cell_size > 0.0 && self.cell_size.is_finite()) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }
}

pub(crate) fn validate_sub_steps(sub_steps: u32) -> Result<(), ConfigError> {
    if sub_steps == 0 {
        return Err(ConfigError::ZeroSubSteps);
    }
    Ok(())
}

pub(crate) fn validate_update_rate(rate: f32) -> Result<(), ConfigError> {
    if !(rate > 0.0 && rate.is_finite()) {
        return Err(ConfigError::InvalidUpdateRate(rate));
    }
    Ok(())
}
