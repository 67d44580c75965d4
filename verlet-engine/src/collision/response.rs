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
//! Overlap response between two particles
//!
//! The response is purely positional. Both particles are pushed apart along
//! the line between their centres by a fraction of the overlap, split by
//! mass ratio with mass taken proportional to radius. Because velocity is
//! implied by position history, the push shows up as velocity on the next
//! integration step.

use crate::particle::Particle;

/// Default fraction of the overlap removed per contact
pub const DEFAULT_RESPONSE_COEFFICIENT: f32 = 0.75;

/// Separate two overlapping particles
///
/// Returns `true` if the particles overlapped and were moved. Exactly
/// coincident centres have no separation direction and are skipped.
///
/// Each contact removes `response_coefficient / 2` of the overlap, so with a
/// coefficient in `(0, 1]` the particles end up closer to touching but never
/// pushed past it.
#[inline]
pub fn resolve_contact(a: &mut Particle, b: &mut Particle, response_coefficient: f32) -> bool {
    let offset = a.position() - b.position();
    let dist_sq = offset.length_squared();
    let min_dist = a.radius() + b.radius();

    if dist_sq >= min_dist * min_dist || dist_sq <= 0.0 {
        return false;
    }

    let dist = dist_sq.sqrt();
    let normal = offset / dist;
    let mass_ratio_a = a.radius() / min_dist;
    let mass_ratio_b = b.radius() / min_dist;
    let delta = 0.5 * response_coefficient * (dist - min_dist);

    // The larger particle moves less
    a.nudge(-normal * (mass_ratio_b * delta));
    b.nudge(normal * (mass_ratio_a * delta));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_separated_particles_untouched() {
        let mut a = Particle::new(Vec2::new(0.0, 0.0), 1.0);
        let mut b = Particle::new(Vec2::new(3.0, 0.0), 1.0);
        assert!(!resolve_contact(&mut a, &mut b, 0.75));
        assert_eq!(a.position(), Vec2::ZERO);
    }

    #[test]
    fn test_touching_particles_untouched() {
        let mut a = Particle::new(Vec2::new(0.0, 0.0), 1.0);
        let mut b = Particle::new(Vec2::new(2.0, 0.0), 1.0);
        assert!(!resolve_contact(&mut a, &mut b, 0.75));
    }

    #[test]
    fn test_overlap_reduced() {
        let mut a = Particle::new(Vec2::new(-5.0, 0.0), 25.0);
        let mut b = Particle::new(Vec2::new(5.0, 0.0), 25.0);
        assert!(resolve_contact(&mut a, &mut b, 0.75));

        let separation = a.position().distance(b.position());
        // 40 overlap, 0.375 of it removed
        assert!((separation - 25.0).abs() < 1e-4);
        assert!(separation <= 50.0);
        assert_eq!(a.position().y, 0.0);
        assert!(a.position().x < -5.0);
        assert!(b.position().x > 5.0);
    }

    #[test]
    fn test_full_coefficient_does_not_overshoot() {
        let mut a = Particle::new(Vec2::new(0.0, 0.0), 1.0);
        let mut b = Particle::new(Vec2::new(0.5, 0.0), 1.0);
        resolve_contact(&mut a, &mut b, 1.0);
        assert!(a.position().distance(b.position()) < 2.0);
    }

    #[test]
    fn test_larger_particle_moves_less() {
        let mut big = Particle::new(Vec2::new(0.0, 0.0), 3.0);
        let mut small = Particle::new(Vec2::new(2.0, 0.0), 1.0);
        resolve_contact(&mut big, &mut small, 0.75);

        let big_moved = big.position().x.abs();
        let small_moved = small.position().x - 2.0;
        assert!(big_moved < small_moved);
        assert!((small_moved / big_moved - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_coincident_particles_skipped() {
        let mut a = Particle::new(Vec2::new(1.0, 1.0), 1.0);
        let mut b = Particle::new(Vec2::new(1.0, 1.0), 1.0);
        assert!(!resolve_contact(&mut a, &mut b, 0.75));
        assert!(a.is_valid());
        assert_eq!(a.position(), b.position());
    }
}
