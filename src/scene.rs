//! Scene presets.
//!
//! A preset seeds the initial particle population and registers emitters.
//!
//! | Preset | Contents |
//! |--------|----------|
//! | [`Preset::Cascade`] | A red hero ball, two clusters of balls and a rain of particles falling from high above |
//! | [`Preset::Fountain`] | A disk emitter spraying short-lived particles upward |
//! | [`Preset::Empty`] | Nothing; emitters come from the scene file |

use glam::{Vec3, Vec4};
use serde::Deserialize;

use crate::emitter::{Emitter, Span, SpawnShape};
use crate::error::EmitterError;
use crate::spawn::Spawner;
use crate::state::SimulationState;
use crate::store::Particle;

/// Largest particle size in the cascade.
pub const MAX_SIZE: f32 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Cascade,
    Fountain,
    Empty,
}

impl Preset {
    /// Fill `state` with this preset's particles and emitters.
    ///
    /// `rain` caps the number of rain particles in the cascade; `None` fills
    /// the remaining capacity.
    pub fn populate<const N: usize>(
        self,
        state: &mut SimulationState<N>,
        rain: Option<usize>,
    ) -> Result<(), EmitterError> {
        match self {
            Preset::Cascade => {
                seed_cascade(state, rain);
                Ok(())
            }
            Preset::Fountain => {
                state.integrator.config.cull_expired = true;
                state.add_emitter(fountain())
            }
            Preset::Empty => Ok(()),
        }
    }
}

fn ball(spawner: &mut Spawner, position: Vec3, speed: f32) -> Particle {
    let color = Vec4::new(
        0.1 + spawner.random(),
        0.1 + spawner.random(),
        0.1 + spawner.random(),
        1.0,
    );
    Particle {
        position,
        velocity: Vec3::new(
            speed * spawner.random_signed(),
            speed * spawner.random_signed(),
            speed * spawner.random_signed(),
        ),
        start_color: color,
        end_color: color,
        size: 25.0 + (MAX_SIZE - 25.0) * spawner.random(),
        ..Particle::default()
    }
}

/// Seed the cascade population. Stops quietly once the store is full.
pub fn seed_cascade<const N: usize>(state: &mut SimulationState<N>, rain: Option<usize>) {
    let hero = Particle {
        position: Vec3::new(0.0, 15.0, 5.0),
        velocity: Vec3::new(0.0, 1.0, 0.0),
        start_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
        end_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
        size: MAX_SIZE,
        ..Particle::default()
    };
    if state.seed(hero).is_err() {
        return;
    }

    let s = &mut state.spawner;
    let mut batch = Vec::with_capacity(24);
    for _ in 0..4 {
        let pos = Vec3::new(5.0 * s.random_signed(), 60.0 + 15.0 * s.random(), 5.0 * s.random());
        batch.push(ball(s, pos, 3.0));
    }
    for _ in 0..20 {
        let pos = Vec3::new(5.0 * s.random_signed(), 130.0 + 20.0 * s.random(), 5.0 * s.random());
        batch.push(ball(s, pos, 3.0));
    }
    for p in batch {
        if state.seed(p).is_err() {
            return;
        }
    }

    let remaining = N - state.store.len();
    let rain = rain.map_or(remaining, |r| r.min(remaining));
    for _ in 0..rain {
        let s = &mut state.spawner;
        let pos = Vec3::new(
            100.0 * s.random_signed(),
            750.0 + 2000.0 * s.random(),
            200.0 * s.random(),
        );
        let p = ball(s, pos, 10.0);
        if state.seed(p).is_err() {
            break;
        }
    }
    tracing::info!(particles = state.store.len(), "cascade seeded");
}

/// Disk fountain in the middle of the arena.
pub fn fountain() -> Emitter {
    Emitter::new(SpawnShape::Disk { radius: 3.0 }, 2000.0)
        .at(Vec3::new(0.0, 0.1, 100.0))
        .with_velocity(Span::new(Vec3::new(-4.0, 10.0, -4.0), Vec3::new(4.0, 20.0, 4.0)))
        .with_start_color(Span::new(
            Vec4::new(0.1, 0.3, 0.8, 1.0),
            Vec4::new(0.3, 0.6, 1.0, 1.0),
        ))
        .with_end_color(Span::fixed(Vec4::new(1.0, 1.0, 1.0, 0.3)))
        .with_color_speed(Span::new(0.2, 0.5))
        .with_lifetime(Span::new(4.0, 8.0))
        .with_size(Span::new(15.0, 40.0))
        .with_blur(Span::new(0.0, 0.5))
}
