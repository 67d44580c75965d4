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
//! Display colours
//!
//! The solver never reads a particle's colour; it is carried along so the
//! rendering layer has something to draw with.

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color::new(255, 255, 255);
    /// Opaque black
    pub const BLACK: Color = Color::new(0, 0, 0);
    /// Opaque magenta, the default particle colour
    pub const MAGENTA: Color = Color::new(255, 0, 255);

    /// Create an opaque colour
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// Return this colour with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    /// Sample a smooth rainbow palette
    ///
    /// Each channel is `sin²` of `t` shifted by a third of a turn, so the
    /// palette cycles every π.
    ///
    /// ```
    /// use verlet_engine::Color;
    ///
    /// let c = Color::rainbow(0.0);
    /// assert_eq!(c.r, 0);
    /// ```
    pub fn rainbow(t: f32) -> Self {
        use std::f32::consts::TAU;

        let r = t.sin();
        let g = (t + TAU / 3.0).sin();
        let b = (t + 2.0 * TAU / 3.0).sin();
        Color::new(channel(r * r), channel(g * g), channel(b * b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::MAGENTA
    }
}

fn channel(intensity: f32) -> u8 {
    (255.0 * intensity).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_magenta() {
        assert_eq!(Color::default(), Color::MAGENTA);
        assert_eq!(Color::MAGENTA.a, 255);
    }

    #[test]
    fn test_with_alpha() {
        let c = Color::WHITE.with_alpha(10);
        assert_eq!(c, Color { r: 255, g: 255, b: 255, a: 10 });
    }

    #[test]
    fn test_rainbow_channels() {
        let c = Color::rainbow(std::f32::consts::FRAC_PI_2);
        assert_eq!(c.r, 255);
        // sin²(π/2 + 2π/3) = cos²(2π/3) = 0.25
        assert_eq!(c.g, 64);
        assert_eq!(c.b, 64);
    }

    #[test]
    fn test_rainbow_is_periodic() {
        let a = Color::rainbow(1.0);
        let b = Color::rainbow(1.0 + std::f32::consts::PI);
        assert!((a.r as i32 - b.r as i32).abs() <= 1);
        assert!((a.g as i32 - b.g as i32).abs() <= 1);
        assert!((a.b as i32 - b.b as i32).abs() <= 1);
    }
}
