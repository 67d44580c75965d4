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
//! Swirling Emitter Example
//!
//! Headless demo that pours particles into a circular container from a
//! rotating emitter. It showcases:
//!
//! - Sub-stepped Verlet integration under gravity
//! - Grid-accelerated collision response
//! - Rainbow colouring by spawn time
//! - Pooled parallel dispatch
//!
//! # Running
//!
//! ```bash
//! # Run with default settings (2000 particles, 8 sub-steps)
//! cargo run --example swirl --release
//!
//! # Run with custom parameters
//! cargo run --example swirl --release -- --particles 5000 --sub-steps 4 --workers 8
//!
//! # Spawn one particle every 3 frames
//! cargo run --example swirl --release -- --interval 3
//! ```

use glam::Vec2;
use std::time::Instant;
use verlet_engine::integration::total_kinetic_energy;
use verlet_engine::{Color, PhysicsSolver, SolverConfig, SolverError};

/// Demo configuration
struct SwirlConfig {
    max_particles: usize,
    sub_steps: u32,
    workers: usize,
    radius: f32,
    spawn_speed: f32,
    spawn_interval: u32,
    frames: u32,
}

impl Default for SwirlConfig {
    fn default() -> Self {
        SwirlConfig {
            max_particles: 2000,
            sub_steps: 8,
            workers: 4,
            radius: 4.0,
            spawn_speed: 600.0,
            spawn_interval: 1,
            frames: 1200,
        }
    }
}

fn parse_args() -> SwirlConfig {
    let mut config = SwirlConfig::default();
    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--particles", Some(v)) => match v.parse() {
                Ok(n) => config.max_particles = n,
                Err(_) => eprintln!("Invalid particle count: {}", v),
            },
            ("--sub-steps", Some(v)) => match v.parse() {
                Ok(n) => config.sub_steps = n,
                Err(_) => eprintln!("Invalid sub-step count: {}", v),
            },
            ("--workers", Some(v)) => match v.parse() {
                Ok(n) => config.workers = n,
                Err(_) => eprintln!("Invalid worker count: {}", v),
            },
            ("--interval", Some(v)) => match v.parse() {
                Ok(n) if n > 0 => config.spawn_interval = n,
                _ => eprintln!("Invalid spawn interval (must be at least 1): {}", v),
            },
            ("--frames", Some(v)) => match v.parse() {
                Ok(n) => config.frames = n,
                Err(_) => eprintln!("Invalid frame count: {}", v),
            },
            (flag, _) => {
                eprintln!("Unknown or incomplete argument: {}", flag);
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    config
}

fn main() -> Result<(), SolverError> {
    let config = parse_args();

    println!("Verlet Engine - Swirl Example");
    println!("=============================\n");
    println!("Particles:  {}", config.max_particles);
    println!("Sub-steps:  {}", config.sub_steps);
    println!("Workers:    {}", config.workers);
    println!("Interval:   {} frames", config.spawn_interval);
    println!("Frames:     {}\n", config.frames);

    let solver_config = SolverConfig::default()
        .with_sub_steps(config.sub_steps)
        .with_cell_size(config.radius * 2.0)
        .with_gravity(Vec2::new(0.0, -1000.0))
        .with_worker_count(config.workers);
    let mut solver = PhysicsSolver::new(solver_config)?;
    solver.set_boundary(Vec2::ZERO, 450.0)?;

    let emitter = Vec2::new(0.0, 300.0);
    let start = Instant::now();
    let mut frame_time = 0.0f64;

    for frame in 0..config.frames {
        if solver.particle_count() < config.max_particles && frame % config.spawn_interval == 0 {
            let t = solver.time();
            let angle = 0.5 * (3.0 * t).sin() - std::f32::consts::FRAC_PI_2;
            let id = solver.add_particle(emitter, config.radius)?;
            solver.set_velocity(id, Vec2::from_angle(angle) * config.spawn_speed)?;
            solver.set_color(id, Color::rainbow(t))?;
        }

        let frame_start = Instant::now();
        solver.update();
        frame_time += frame_start.elapsed().as_secs_f64();

        if (frame + 1) % 60 == 0 {
            let energy = total_kinetic_energy(solver.particles(), solver.step_dt());
            println!(
                "t={:6.2}s  particles={:5}  energy={:12.2}  grid drops={:3}  avg frame={:.3} ms",
                solver.time(),
                solver.particle_count(),
                energy,
                solver.grid().dropped(),
                frame_time * 1000.0 / 60.0
            );
            frame_time = 0.0;
        }
    }

    let escaped = solver
        .particles()
        .iter()
        .filter(|p| !solver.boundary().contains(p, p.displacement().length() + 1e-3))
        .count();
    println!("\nFinished in {:.2?}", start.elapsed());
    println!("Particles outside container: {}", escaped);

    Ok(())
}
