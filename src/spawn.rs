//! Stochastic particle spawning.
//!
//! Turns an [`Emitter`] and a timestep into new rows in the
//! [`ParticleStore`]. Fractional spawn counts are rounded stochastically so
//! low rates still average out to `rate * dt` per frame.

use std::f32::consts::TAU;

use glam::{Vec3, Vec4};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::emitter::{Emitter, Span, SpawnShape};
use crate::store::{Particle, ParticleStore};

/// Outcome of one [`Spawner::spawn`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Particles appended to the store.
    pub spawned: usize,
    /// The store filled up before the batch finished.
    pub capacity_reached: bool,
}

/// Random source and sampling helpers for spawning.
pub struct Spawner {
    rng: SmallRng,
}

impl Spawner {
    /// Spawner seeded from the system clock.
    pub fn new() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::with_seed(seed)
    }

    /// Deterministic spawner.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Spawn this frame's share of `emitter` particles into `store`.
    ///
    /// Stops early, without error, when the store is full.
    pub fn spawn<const N: usize>(
        &mut self,
        emitter: &Emitter,
        dt: f32,
        store: &mut ParticleStore<N>,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();
        if dt <= 0.0 {
            return report;
        }

        let count = self.spawn_count(emitter.rate * dt);
        for _ in 0..count {
            let particle = self.sample(emitter);
            if store.append(particle).is_err() {
                report.capacity_reached = true;
                break;
            }
            report.spawned += 1;
        }

        if report.capacity_reached {
            tracing::warn!(
                capacity = store.capacity(),
                spawned = report.spawned,
                "particle limit reached"
            );
        }
        report
    }

    /// Round `expected` down, then up with probability equal to its fraction.
    pub fn spawn_count(&mut self, expected: f32) -> u32 {
        if expected.is_nan() || expected <= 0.0 {
            return 0;
        }
        let whole = expected.floor();
        let fraction = expected - whole;
        let mut count = whole as u32;
        if self.random() < fraction {
            count += 1;
        }
        count
    }

    /// Build one particle from the emitter's configuration.
    pub fn sample(&mut self, emitter: &Emitter) -> Particle {
        let offset = match emitter.shape {
            SpawnShape::Point => Vec3::ZERO,
            SpawnShape::Disk { radius } => self.random_in_disk(radius),
        };

        Particle {
            position: emitter.position + offset,
            velocity: emitter.base_velocity + self.sample_vec3(&emitter.velocity),
            start_color: self.sample_vec4(&emitter.start_color),
            end_color: self.sample_vec4(&emitter.end_color),
            color_speed: self.sample_f32(&emitter.color_speed),
            lighting: emitter.lighting,
            size: self.sample_f32(&emitter.size),
            blur: self.sample_f32(&emitter.blur),
            age: 0.0,
            life_limit: self.sample_f32(&emitter.lifetime),
            subject_to_gravity: emitter.subject_to_gravity,
            grounded: false,
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[-1, 1)`.
    #[inline]
    pub fn random_signed(&mut self) -> f32 {
        self.rng.gen::<f32>() * 2.0 - 1.0
    }

    // ========== Position helpers ==========

    /// Random point inside a disk in the XZ plane at y=0.
    ///
    /// `sqrt` on the radius sample keeps the density uniform over area.
    pub fn random_in_disk(&mut self, radius: f32) -> Vec3 {
        let r = radius * self.random().sqrt();
        let theta = TAU * self.random();
        Vec3::new(theta.sin() * r, 0.0, theta.cos() * r)
    }

    // ========== Range sampling ==========

    fn sample_f32(&mut self, span: &Span<f32>) -> f32 {
        span.at(self.random())
    }

    fn sample_vec3(&mut self, span: &Span<Vec3>) -> Vec3 {
        let t = Vec3::new(self.random(), self.random(), self.random());
        span.min + (span.max - span.min) * t
    }

    fn sample_vec4(&mut self, span: &Span<Vec4>) -> Vec4 {
        let t = Vec4::new(self.random(), self.random(), self.random(), self.random());
        span.min + (span.max - span.min) * t
    }
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dt_spawns_nothing() {
        let mut spawner = Spawner::with_seed(1);
        let mut store = ParticleStore::<16>::new();
        let emitter = Emitter::new(SpawnShape::Point, 1000.0);
        let report = spawner.spawn(&emitter, 0.0, &mut store);
        assert_eq!(report.spawned, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_whole_count_spawned() {
        let mut spawner = Spawner::with_seed(7);
        let mut store = ParticleStore::<64>::new();
        let emitter = Emitter::new(SpawnShape::Point, 10.0);
        let report = spawner.spawn(&emitter, 1.0, &mut store);
        assert_eq!(report.spawned, 10);
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_capacity_stops_batch() {
        let mut spawner = Spawner::with_seed(3);
        let mut store = ParticleStore::<4>::new();
        let emitter = Emitter::new(SpawnShape::Point, 10.0);
        let report = spawner.spawn(&emitter, 1.0, &mut store);
        assert_eq!(
            report,
            SpawnReport {
                spawned: 4,
                capacity_reached: true
            }
        );
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_point_spawn_uses_center_and_config() {
        let mut spawner = Spawner::with_seed(11);
        let emitter = Emitter::new(SpawnShape::Point, 1.0)
            .at(Vec3::new(1.0, 2.0, 3.0))
            .with_base_velocity(Vec3::new(0.0, 5.0, 0.0))
            .with_lighting(0.25)
            .with_gravity(false);

        let p = spawner.sample(&emitter);
        assert_eq!(p.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p.velocity, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(p.lighting, 0.25);
        assert!(!p.subject_to_gravity);
        assert!(!p.grounded);
        assert_eq!(p.age, 0.0);
    }

    #[test]
    fn test_default_base_velocity_leaves_samples_in_range() {
        let mut spawner = Spawner::with_seed(23);
        let span = Span::new(Vec3::new(-1.0, 2.0, -3.0), Vec3::new(1.0, 4.0, 3.0));
        let emitter = Emitter::new(SpawnShape::Point, 1.0).with_velocity(span);
        assert_eq!(emitter.base_velocity, Vec3::ZERO);

        for _ in 0..200 {
            let v = spawner.sample(&emitter).velocity;
            assert!(v.cmpge(span.min).all() && v.cmple(span.max).all(), "{v:?}");
        }
    }

    #[test]
    fn test_sampled_attributes_within_ranges() {
        let mut spawner = Spawner::with_seed(5);
        let emitter = Emitter::new(SpawnShape::Disk { radius: 3.0 }, 1.0)
            .with_velocity(Span::new(Vec3::splat(-2.0), Vec3::splat(2.0)))
            .with_size(Span::new(25.0, 100.0))
            .with_lifetime(Span::new(1.0, 4.0));

        for _ in 0..500 {
            let p = spawner.sample(&emitter);
            assert!(p.velocity.abs().max_element() <= 2.0);
            assert!((25.0..=100.0).contains(&p.size));
            assert!((1.0..=4.0).contains(&p.life_limit));
            assert_eq!(p.position.y, 0.0);
            assert!(Vec3::new(p.position.x, 0.0, p.position.z).length() <= 3.0 + 1e-4);
        }
    }

    #[test]
    fn test_spawn_count_fraction() {
        let mut spawner = Spawner::with_seed(9);
        for _ in 0..100 {
            let n = spawner.spawn_count(2.25);
            assert!(n == 2 || n == 3);
        }
        assert_eq!(spawner.spawn_count(-1.0), 0);
        assert_eq!(spawner.spawn_count(f32::NAN), 0);
    }
}
