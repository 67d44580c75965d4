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
//! Error types
//!
//! Configuration problems and invalid solver inputs are reported through
//! these enums. Degenerate geometry and grid bucket overflow are not errors;
//! the solver skips or drops those silently.

use crate::store::SlotId;
use thiserror::Error;

/// Invalid solver configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The sub-step count must be at least one
    #[error("sub-step count must be at least 1")]
    ZeroSubSteps,
    /// The update rate must be positive and finite
    #[error("invalid update rate {0} Hz: must be positive and finite")]
    InvalidUpdateRate(f32),
    /// The collision response coefficient must lie in (0, 1]
    #[error("invalid response coefficient {0}: must be in (0, 1]")]
    InvalidResponseCoefficient(f32),
    /// Velocity damping must be non-negative and finite
    #[error("invalid velocity damping {0}: must be non-negative and finite")]
    InvalidDamping(f32),
    /// Gravity must be finite
    #[error("gravity must be finite")]
    InvalidGravity,
    /// Grid cell size must be positive and finite
    #[error("invalid cell size {0}: must be positive and finite")]
    InvalidCellSize(f32),
}

/// Failure to start a worker pool
#[derive(Debug, Error)]
pub enum PoolError {
    /// A pool needs at least one worker
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    /// The OS refused to spawn a worker thread
    #[error("failed to spawn worker thread {index}")]
    Spawn {
        /// Index of the worker that failed to start
        index: usize,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },
    /// The rayon thread pool could not be built
    #[cfg(feature = "parallel")]
    #[error("failed to build rayon thread pool")]
    Rayon(#[from] rayon::ThreadPoolBuildError),
}

/// Errors returned by `PhysicsSolver` operations
#[derive(Debug, Error)]
pub enum SolverError {
    /// Invalid configuration value
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The worker pool could not be started
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// Particle radius must be positive and finite
    #[error("invalid particle radius {0}: must be positive and finite")]
    InvalidRadius(f32),
    /// Particle diameter does not fit in one grid cell
    #[error("particle radius {radius} exceeds the grid limit of {max}")]
    RadiusTooLarge {
        /// Requested radius
        radius: f32,
        /// Largest radius the grid cell size supports
        max: f32,
    },
    /// The boundary would need a collision grid with too many cells
    #[error("collision grid of {width}x{height} cells is too large")]
    GridTooLarge {
        /// Requested number of columns
        width: usize,
        /// Requested number of rows
        height: usize,
    },
    /// Boundary radius must be positive and finite
    #[error("invalid boundary radius {0}: must be positive and finite")]
    InvalidBoundary(f32),
    /// A position or velocity had a NaN or infinite component
    #[error("vector components must be finite")]
    NonFiniteVector,
    /// The handle refers to a removed particle
    #[error("stale particle handle {0}")]
    StaleId(SlotId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::ZeroSubSteps.to_string(),
            "sub-step count must be at least 1"
        );
        assert!(ConfigError::InvalidUpdateRate(-1.0).to_string().contains("-1"));
    }

    #[test]
    fn test_solver_error_from_config() {
        let err: SolverError = ConfigError::ZeroSubSteps.into();
        assert!(matches!(err, SolverError::Config(ConfigError::ZeroSubSteps)));
        assert_eq!(err.to_string(), "sub-step count must be at least 1");
    }

    #[test]
    fn test_stale_id_message() {
        let err = SolverError::StaleId(SlotId::new(2, 5));
        assert_eq!(err.to_string(), "stale particle handle Slot(2, op: 5)");
    }
}
