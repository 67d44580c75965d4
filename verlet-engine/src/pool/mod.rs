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
//! Data-parallel range dispatch
//!
//! Bulk per-particle passes are written once against [`RangeDispatcher`]
//! and run on whichever backend the solver was built with:
//! - [`Sequential`]: everything on the calling thread
//! - [`ThreadPool`]: a fixed set of spinning worker threads
//! - `RayonDispatcher`: the rayon work-stealing pool (`parallel` feature)
//!
//! Every backend gives the same contract: `dispatch(n, task)` calls `task`
//! on disjoint contiguous ranges that exactly cover `0..n`, and returns only
//! once every range has completed.

mod shared;
mod thread_pool;
#[cfg(feature = "parallel")]
mod rayon_dispatch;

pub(crate) use shared::SharedMut;
pub use thread_pool::{PoolConfig, PoolStats, ThreadPool};
#[cfg(feature = "parallel")]
pub use rayon_dispatch::RayonDispatcher;

/// A range task: called with a half-open `start..end` index range
pub type RangeTask<'a> = &'a (dyn Fn(usize, usize) + Sync);

/// Backend that runs a range task over `0..element_count`
///
/// Implementations must call `task` on ranges that cover every index in
/// `0..element_count` exactly once and must not return before all of them
/// have finished. Ranges may run concurrently, so `task` must be safe to
/// call from several threads on disjoint ranges.
pub trait RangeDispatcher: Send + Sync {
    /// Number of threads that may run ranges concurrently
    fn worker_count(&self) -> usize;

    /// Run `task` over `0..element_count` and wait for completion
    fn dispatch(&self, element_count: usize, task: RangeTask<'_>);

    /// Get a descriptive name for this backend
    fn name(&self) -> &str;
}

/// Runs every range on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl RangeDispatcher for Sequential {
    fn worker_count(&self) -> usize {
        1
    }

    fn dispatch(&self, element_count: usize, task: RangeTask<'_>) {
        if element_count > 0 {
            task(0, element_count);
        }
    }

    fn name(&self) -> &str {
        "Sequential"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_sequential_single_range() {
        let calls = AtomicUsize::new(0);
        Sequential.dispatch(10, &|start, end| {
            assert_eq!((start, end), (0, 10));
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_sequential_empty() {
        Sequential.dispatch(0, &|_, _| panic!("no range expected"));
        assert_eq!(Sequential.worker_count(), 1);
    }
}
