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
//! Position Verlet integrator
//!
//! ```text
//! d      = x(t) - x(t - dt)
//! x(t+dt) = x(t) + d + (a - d * damping) * dt²
//! ```
//!
//! With `damping = 0` this is the classic Störmer-Verlet position update.
//! It needs no velocity field. Position corrections made between steps
//! become velocity on the next step.
//!
//! # References
//!
//! - Verlet, L. (1967). Computer "Experiments" on Classical Fluids. I. Thermodynamical
//!   Properties of Lennard-Jones Molecules. Physical Review, 159(1), 98-103.
//! - Jakobsen, T. (2001). Advanced Character Physics. Game Developers Conference.

use crate::particle::Particle;

/// Position Verlet integrator with optional velocity damping
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use verlet_engine::integration::PositionVerlet;
/// use verlet_engine::Particle;
///
/// let verlet = PositionVerlet::new();
/// let mut p = Particle::new(Vec2::ZERO, 1.0);
/// p.accelerate(Vec2::new(0.0, 100.0));
/// verlet.step(&mut p, 0.1);
/// assert!((p.position().y - 1.0).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionVerlet {
    damping: f32,
}

impl PositionVerlet {
    /// Create an undamped integrator
    pub fn new() -> Self {
        PositionVerlet { damping: 0.0 }
    }

    /// Create an integrator with a drag term opposing the displacement
    ///
    /// # Panics
    ///
    /// Panics if `damping` is negative, NaN, or infinite
    pub fn with_damping(damping: f32) -> Self {
        assert!(
            damping >= 0.0 && damping.is_finite(),
            "Damping must be non-negative and finite"
        );
        PositionVerlet { damping }
    }

    /// Get the damping factor
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Advance one particle by `dt` and clear its acceleration
    #[inline]
    pub fn step(&self, particle: &mut Particle, dt: f32) {
        let displacement = particle.displacement();
        let acceleration = particle.acceleration() - displacement * self.damping;
        let next = particle.position() + displacement + acceleration * (dt * dt);
        particle.advance(next);
    }
}
