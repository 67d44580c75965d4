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
//! Particle state
//!
//! Particles carry no explicit velocity. Velocity is implied by the
//! displacement between the current and previous position, which is what
//! position Verlet integration advances.

use crate::color::Color;
use glam::Vec2;

/// Circular particle advanced by position Verlet integration
///
/// # Examples
///
/// ```
/// use glam::Vec2;
/// use verlet_engine::Particle;
///
/// let mut p = Particle::new(Vec2::new(10.0, 0.0), 2.0);
/// p.set_velocity(Vec2::new(60.0, 0.0), 1.0 / 60.0);
/// assert!((p.displacement().x - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    position: Vec2,
    last_position: Vec2,
    acceleration: Vec2,
    radius: f32,
    color: Color,
}

impl Particle {
    /// Create a particle at rest
    ///
    /// # Panics
    ///
    /// Panics if `radius` is non-positive, NaN, or infinite
    pub fn new(position: Vec2, radius: f32) -> Self {
        assert!(
            radius > 0.0 && radius.is_finite(),
            "Radius must be positive and finite"
        );
        Particle {
            position,
            last_position: position,
            acceleration: Vec2::ZERO,
            radius,
            color: Color::default(),
        }
    }

    /// Get the current position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Get the position before the last integration step
    pub fn last_position(&self) -> Vec2 {
        self.last_position
    }

    /// Get the acceleration accumulated since the last integration step
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// Get the radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Get the display colour
    pub fn color(&self) -> Color {
        self.color
    }

    /// Set the display colour
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Displacement covered during the last step
    pub fn displacement(&self) -> Vec2 {
        self.position - self.last_position
    }

    /// Velocity implied by the last step of length `dt`
    pub fn velocity(&self, dt: f32) -> Vec2 {
        self.displacement() / dt
    }

    /// Give the particle a velocity for steps of length `dt`
    pub fn set_velocity(&mut self, velocity: Vec2, dt: f32) {
        self.last_position = self.position - velocity * dt;
    }

    /// Move the particle without touching its previous position
    ///
    /// Because velocity is implicit, this also changes the velocity seen by
    /// the next integration step.
    pub fn nudge(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Move the particle to `position`, keeping its current velocity
    pub fn teleport(&mut self, position: Vec2) {
        let displacement = self.displacement();
        self.position = position;
        self.last_position = position - displacement;
    }

    /// Place the particle at `position` without moving its previous position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Add to the accumulated acceleration
    pub fn accelerate(&mut self, acceleration: Vec2) {
        self.acceleration += acceleration;
    }

    /// Commit a new position, shifting the current one into the history
    /// and clearing the accumulated acceleration
    pub fn advance(&mut self, next: Vec2) {
        self.last_position = self.position;
        self.position = next;
        self.acceleration = Vec2::ZERO;
    }

    /// Check if position state is finite
    pub fn is_valid(&self) -> bool {
        self.position.is_finite() && self.last_position.is_finite()
    }
}
