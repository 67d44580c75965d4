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
//! Dispatch correctness across backends
//!
//! Every backend must call the task on ranges covering `0..n` exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use verlet_engine::pool::{PoolConfig, RangeDispatcher, Sequential, ThreadPool};

fn visit_counts(dispatcher: &dyn RangeDispatcher, element_count: usize) -> Vec<usize> {
    let visits: Vec<AtomicUsize> = (0..element_count).map(|_| AtomicUsize::new(0)).collect();
    dispatcher.dispatch(element_count, &|start, end| {
        assert!(start < end, "empty range {}..{}", start, end);
        assert!(end <= element_count);
        for v in &visits[start..end] {
            v.fetch_add(1, Ordering::Relaxed);
        }
    });
    visits.into_iter().map(AtomicUsize::into_inner).collect()
}

fn assert_exact_cover(dispatcher: &dyn RangeDispatcher) {
    for n in [0, 1, 2, 3, 7, 10, 64, 101, 1023, 4096] {
        let counts = visit_counts(dispatcher, n);
        assert_eq!(counts.len(), n);
        assert!(
            counts.iter().all(|&c| c == 1),
            "{} with {} workers: bad cover for n = {}",
            dispatcher.name(),
            dispatcher.worker_count(),
            n
        );
    }
}

#[test]
fn test_sequential_exact_cover() {
    assert_exact_cover(&Sequential);
}

#[test]
fn test_thread_pool_exact_cover() {
    for workers in 1..=6 {
        let pool = ThreadPool::new(workers).unwrap();
        assert_exact_cover(&pool);
    }
}

#[cfg(feature = "parallel")]
#[test]
fn test_rayon_exact_cover() {
    let dispatcher = verlet_engine::pool::RayonDispatcher::with_threads(3).unwrap();
    assert_exact_cover(&dispatcher);
}

#[test]
fn test_uneven_split_ranges_are_contiguous() {
    // 3 workers, 10 elements: three batches of 3 plus a remainder of 1
    let pool = ThreadPool::new(3).unwrap();
    let ranges = Mutex::new(Vec::new());
    pool.dispatch(10, &|start, end| ranges.lock().unwrap().push((start, end)));

    let mut ranges = ranges.into_inner().unwrap();
    ranges.sort_unstable();
    assert_eq!(ranges, vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
}

#[test]
fn test_dispatch_is_a_barrier() {
    let pool = ThreadPool::new(4).unwrap();
    let done = AtomicUsize::new(0);
    for round in 1..=20 {
        pool.dispatch(40, &|start, end| {
            std::thread::yield_now();
            done.fetch_add(end - start, Ordering::SeqCst);
        });
        // Every batch has finished by the time dispatch returns
        assert_eq!(done.load(Ordering::SeqCst), round * 40);
    }
}

#[test]
fn test_shared_pool_across_threads() {
    let pool = ThreadPool::with_config(PoolConfig::new(2)).unwrap();
    std::thread::scope(|scope| {
        for _ in 0..2 {
            scope.spawn(|| {
                for _ in 0..10 {
                    assert!(visit_counts(&pool, 50).iter().all(|&c| c == 1));
                }
            });
        }
    });
}

#[test]
fn test_solver_updated_from_its_own_pool() {
    use glam::Vec2;
    use std::sync::Arc;
    use verlet_engine::{PhysicsSolver, SolverConfig};

    let pool = Arc::new(ThreadPool::new(3).unwrap());
    let mut solver = PhysicsSolver::with_dispatcher(SolverConfig::default(), pool.clone()).unwrap();
    let id = solver.add_particle(Vec2::new(-5.0, 0.0), 10.0).unwrap();
    solver.add_particle(Vec2::new(5.0, 0.0), 10.0).unwrap();

    let finished = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&finished);
    pool.submit(move || {
        for _ in 0..10 {
            solver.update();
        }
        *slot.lock().unwrap() = solver.particle(id).map(|p| p.position());
    });
    pool.wait_for_completion();

    let position = finished.lock().unwrap().expect("solver task did not finish");
    assert!(position.x < -5.0);
}
