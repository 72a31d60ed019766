//! Per-frame particle integration.
//!
//! Each live particle is in one of two regimes:
//!
//! | Regime | Motion |
//! |--------|--------|
//! | Airborne | Full 3D integration, wall reflection, floor bounce |
//! | Grounded | Horizontal sliding with linear friction, `y` frozen at the floor |
//!
//! A particle becomes grounded once a floor bounce leaves it with less
//! vertical displacement than one step of gravity would add. The transition
//! is one-way.
//!
//! The arena is `|x| < half_extent` and `|z - z_center| < half_extent`. A
//! particle reaching a wall is clamped just inside it and its velocity
//! component is reversed and damped.

use glam::Vec3;
use serde::Deserialize;

use crate::store::{ParticleMut, ParticleStore};

/// Tunable physics constants.
///
/// Defaults reproduce the reference arena: 200 x 200 units, floor at 0.1.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in units/s².
    pub gravity: f32,
    /// Half width of the arena on X and Z.
    pub half_extent: f32,
    /// Z coordinate of the arena centre. X is centred on 0.
    pub z_center: f32,
    /// Offset from the centre a particle is clamped to after hitting a wall.
    pub wall_clamp: f32,
    /// Fraction of horizontal speed kept after a wall bounce.
    pub wall_restitution: f32,
    /// Height of the floor.
    pub floor: f32,
    /// Fraction of vertical speed kept after a floor bounce.
    pub floor_restitution: f32,
    /// Linear deceleration of grounded particles in units/s².
    pub friction: f32,
    /// Also offset airborne positions by `-g dt² / 2` every step, for every
    /// particle regardless of its gravity flag.
    ///
    /// Gravity then reaches position both directly and through velocity.
    /// Turning this off keeps gravity in the velocity term only.
    pub legacy_position_gravity: bool,
    /// Remove particles whose age reaches their life limit.
    pub cull_expired: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            half_extent: 100.0,
            z_center: 100.0,
            wall_clamp: 99.9,
            wall_restitution: 0.7,
            floor: 0.1,
            floor_restitution: 0.3,
            friction: 2.0,
            legacy_position_gravity: true,
            cull_expired: false,
        }
    }
}

/// Advances every live particle by one timestep.
#[derive(Debug, Clone, Default)]
pub struct Integrator {
    pub config: PhysicsConfig,
}

impl Integrator {
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    /// Step every live particle by `dt` seconds. Returns the number culled.
    ///
    /// With culling enabled an expired particle is swap-removed and the same
    /// index is visited again, since it now holds the relocated last particle.
    /// A non-positive `dt` leaves the store untouched.
    pub fn integrate<const N: usize>(&self, store: &mut ParticleStore<N>, dt: f32) -> usize {
        if dt.is_nan() || dt <= 0.0 {
            return 0;
        }

        let mut culled = 0;
        let mut i = 0;
        while i < store.len() {
            let Some(mut p) = store.particle_mut(i) else {
                break;
            };
            *p.age += dt;

            if self.config.cull_expired && *p.age >= p.life_limit {
                store.remove(i);
                culled += 1;
                continue;
            }

            if *p.grounded {
                self.step_grounded(&mut p, dt);
            } else {
                self.step_airborne(&mut p, dt);
            }
            i += 1;
        }
        culled
    }

    fn step_airborne(&self, p: &mut ParticleMut<'_>, dt: f32) {
        let cfg = &self.config;
        let g = cfg.gravity;

        *p.position += *p.velocity * dt;
        if cfg.legacy_position_gravity {
            p.position.y -= dt * dt * g / 2.0;
        }

        self.reflect(&mut p.position.x, &mut p.velocity.x, 0.0);

        if p.position.y < cfg.floor {
            p.position.y = cfg.floor;
            p.velocity.y *= -cfg.floor_restitution;
            if (p.velocity.y * dt).abs() < dt * dt * g {
                p.velocity.y = 0.0;
                *p.grounded = true;
            }
        } else if p.subject_to_gravity {
            p.velocity.y -= g * dt;
        }

        self.reflect(&mut p.position.z, &mut p.velocity.z, cfg.z_center);
    }

    fn step_grounded(&self, p: &mut ParticleMut<'_>, dt: f32) {
        let cfg = &self.config;

        p.position.x += p.velocity.x * dt;
        p.position.z += p.velocity.z * dt;

        self.reflect(&mut p.position.x, &mut p.velocity.x, 0.0);
        self.reflect(&mut p.position.z, &mut p.velocity.z, cfg.z_center);

        let decel = cfg.friction * dt;
        p.velocity.x -= sign(p.velocity.x) * decel;
        p.velocity.z -= sign(p.velocity.z) * decel;

        let horizontal = (p.velocity.x * p.velocity.x + p.velocity.z * p.velocity.z).sqrt();
        if horizontal < dt {
            *p.velocity = Vec3::ZERO;
        }
    }

    /// Clamp one axis inside the arena and bounce its velocity component.
    #[inline]
    fn reflect(&self, coord: &mut f32, vel: &mut f32, center: f32) {
        let cfg = &self.config;
        let rel = *coord - center;
        if rel.abs() >= cfg.half_extent {
            *coord = center + sign(rel) * cfg.wall_clamp;
            *vel *= -cfg.wall_restitution;
        }
    }
}

/// Sign of `v`, with zero mapping to zero.
#[inline]
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
