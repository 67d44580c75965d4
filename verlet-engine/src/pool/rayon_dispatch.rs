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
//! Rayon-backed range dispatch
//!
//! Splits the range into one contiguous batch per rayon thread and lets the
//! work-stealing scheduler run them. Useful when the host application
//! already owns a rayon pool and spinning workers would compete with it.

use super::{RangeDispatcher, RangeTask};
use crate::error::PoolError;
use rayon::prelude::*;

/// Dispatcher running batches on a rayon thread pool
pub struct RayonDispatcher {
    pool: Option<rayon::ThreadPool>,
}

impl RayonDispatcher {
    /// Use rayon's global thread pool
    pub fn new() -> Self {
        RayonDispatcher { pool: None }
    }

    /// Build a dedicated rayon pool with `threads` threads
    pub fn with_threads(threads: usize) -> Result<Self, PoolError> {
        if threads == 0 {
            return Err(PoolError::ZeroWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("verlet-rayon-{}", index))
            .build()?;
        Ok(RayonDispatcher { pool: Some(pool) })
    }

    fn run(element_count: usize, batches: usize, task: RangeTask<'_>) {
        let batch_size = (element_count + batches - 1) / batches;
        (0..batches).into_par_iter().for_each(|batch| {
            let start = batch * batch_size;
            let end = (start + batch_size).min(element_count);
            if start < end {
                task(start, end);
            }
        });
    }
}

impl Default for RayonDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeDispatcher for RayonDispatcher {
    fn worker_count(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn dispatch(&self, element_count: usize, task: RangeTask<'_>) {
        if element_count == 0 {
            return;
        }
        let batches = self.worker_count().clamp(1, element_count);
        match &self.pool {
            Some(pool) => pool.install(|| Self::run(element_count, batches, task)),
            None => Self::run(element_count, batches, task),
        }
    }

    fn name(&self) -> &str {
        "Rayon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_rayon_covers_range() {
        let dispatcher = RayonDispatcher::with_threads(3).unwrap();
        assert_eq!(dispatcher.worker_count(), 3);

        let visits: Vec<AtomicUsize> = (0..101).map(|_| AtomicUsize::new(0)).collect();
        dispatcher.dispatch(visits.len(), &|start, end| {
            for v in &visits[start..end] {
                v.fetch_add(1, Ordering::Relaxed);
            }
        });
        assert!(visits.iter().all(|v| v.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn test_rayon_zero_threads() {
        assert!(matches!(
            RayonDispatcher::with_threads(0),
            Err(PoolError::ZeroWorkers)
        ));
    }

    #[test]
    fn test_rayon_global_pool() {
        let dispatcher = RayonDispatcher::new();
        let sum = AtomicUsize::new(0);
        dispatcher.dispatch(10, &|start, end| {
            sum.fetch_add((start..end).sum::<usize>(), Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), 45);
    }
}
