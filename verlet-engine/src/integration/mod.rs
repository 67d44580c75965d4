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
//! Numerical integration for particle motion
//!
//! Particles are advanced with position Verlet: velocity is never stored,
//! only implied by the previous position. Collision and containment
//! corrections move positions directly and the integrator picks the change
//! up as velocity on the next step.
//!
//! # Timestep Guidelines
//!
//! - The solver integrates once per sub-step, so the effective `dt` is
//!   `1 / (update_rate * sub_steps)`
//! - More sub-steps keep dense piles stable at the cost of CPU time
//! - Velocities handed to `set_velocity` are converted with the sub-step `dt`

use crate::particle::Particle;

mod verlet;

pub use verlet::PositionVerlet;

/// Kinetic energy of one particle for a step of length `dt`
///
/// Mass is taken proportional to radius, the same approximation the
/// collision response uses.
pub fn kinetic_energy(particle: &Particle, dt: f32) -> f32 {
    let v = particle.velocity(dt);
    0.5 * particle.radius() * v.length_squared()
}

/// Total kinetic energy of a set of particles
pub fn total_kinetic_energy<'a, I>(particles: I, dt: f32) -> f32
where
    I: IntoIterator<Item = &'a Particle>,
{
    particles.into_iter().map(|p| kinetic_energy(p, dt)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_kinetic_energy_at_rest() {
        let p = Particle::new(Vec2::ZERO, 2.0);
        assert_eq!(kinetic_energy(&p, 0.1), 0.0);
    }

    #[test]
    fn test_total_kinetic_energy() {
        let mut a = Particle::new(Vec2::ZERO, 2.0);
        a.set_velocity(Vec2::new(3.0, 0.0), 0.5);
        let mut b = Particle::new(Vec2::ZERO, 1.0);
        b.set_velocity(Vec2::new(0.0, 2.0), 0.5);

        // 0.5 * 2 * 9 + 0.5 * 1 * 4
        let total = total_kinetic_energy([a, b].iter(), 0.5);
        assert!((total - 11.0).abs() < 1e-5);
    }
}
