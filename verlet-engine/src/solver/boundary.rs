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
//! Circular containment boundary

use crate::particle::Particle;
use glam::Vec2;

/// Circle every particle must stay inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    center: Vec2,
    radius: f32,
}

impl Boundary {
    /// Create a boundary
    ///
    /// # Panics
    ///
    /// Panics if `radius` is non-positive, NaN, or infinite, or `center`
    /// is not finite
    pub fn new(center: Vec2, radius: f32) -> Self {
        assert!(
            radius > 0.0 && radius.is_finite(),
            "Boundary radius must be positive and finite"
        );
        assert!(center.is_finite(), "Boundary center must be finite");
        Boundary { center, radius }
    }

    /// Get the centre
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Get the radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Check whether a particle lies fully inside, within `epsilon`
    pub fn contains(&self, particle: &Particle, epsilon: f32) -> bool {
        particle.position().distance(self.center) <= self.radius - particle.radius() + epsilon
    }

    /// Project a particle that pokes out back onto the limiting circle
    ///
    /// The limiting circle has radius `radius - particle.radius()`. Only the
    /// position is changed, so the correction becomes velocity on the next
    /// integration step. Returns `true` if the particle was moved.
    pub fn constrain(&self, particle: &mut Particle) -> bool {
        let to_center = self.center - particle.position();
        let dist = to_center.length();
        let limit = (self.radius - particle.radius()).max(0.0);
        if dist <= limit {
            return false;
        }
        // dist > limit >= 0, so the division is safe
        let normal = to_center / dist;
        particle.set_position(self.center - normal * limit);
        true
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Boundary::new(Vec2::ZERO, 100.0)
    }
}
