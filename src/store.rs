//! Fixed-capacity columnar particle storage.
//!
//! Each particle attribute lives in its own contiguous column, allocated once
//! at construction and never resized. Slots `0..len()` are live; everything
//! past the cursor is stale and must not be read.
//!
//! Removal is swap-and-shrink: the last live row is moved into the freed slot.
//! Any index held across a [`ParticleStore::remove`] call is invalidated.

use glam::{Vec3, Vec4};

use crate::error::StoreError;

/// Default capacity used by the application.
pub const MAX_PARTICLES: usize = 300_000;

/// One logical particle row.
///
/// Used to append into the store and to read rows back out. The store itself
/// keeps the fields in separate columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World-space position.
    pub position: Vec3,
    /// World-space velocity in units per second.
    pub velocity: Vec3,
    /// RGBA colour at birth.
    pub start_color: Vec4,
    /// RGBA colour the particle transitions towards.
    pub end_color: Vec4,
    /// Rate of the start → end colour transition.
    pub color_speed: f32,
    /// Shading weight; 0 renders flat, 1 fully lit.
    pub lighting: f32,
    /// Sprite diameter in size units.
    pub size: f32,
    /// Edge softness, 0 (hard) to 1.
    pub blur: f32,
    /// Seconds since spawn.
    pub age: f32,
    /// Maximum lifetime in seconds.
    pub life_limit: f32,
    /// Whether gravity is integrated for this particle.
    pub subject_to_gravity: bool,
    /// Whether the particle has settled into ground contact.
    pub grounded: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            start_color: Vec4::ONE,
            end_color: Vec4::ONE,
            color_speed: 0.0,
            lighting: 1.0,
            size: 1.0,
            blur: 0.0,
            age: 0.0,
            life_limit: f32::INFINITY,
            subject_to_gravity: true,
            grounded: false,
        }
    }
}

/// Mutable view of the fields the integrator touches for one live row.
pub struct ParticleMut<'a> {
    pub position: &'a mut Vec3,
    pub velocity: &'a mut Vec3,
    pub age: &'a mut f32,
    pub grounded: &'a mut bool,
    pub subject_to_gravity: bool,
    pub life_limit: f32,
}

/// Columnar particle store with a compile-time capacity `N`.
///
/// # Example
///
/// ```
/// use spritefall::store::{Particle, ParticleStore};
///
/// let mut store = ParticleStore::<4>::new();
/// let i = store.append(Particle::default()).unwrap();
/// assert_eq!(i, 0);
/// assert_eq!(store.len(), 1);
/// ```
pub struct ParticleStore<const N: usize> {
    len: usize,
    positions: Box<[Vec3]>,
    velocities: Box<[Vec3]>,
    start_colors: Box<[Vec4]>,
    end_colors: Box<[Vec4]>,
    color_speeds: Box<[f32]>,
    lightings: Box<[f32]>,
    sizes: Box<[f32]>,
    blurs: Box<[f32]>,
    ages: Box<[f32]>,
    life_limits: Box<[f32]>,
    subject_to_gravity: Box<[bool]>,
    grounded: Box<[bool]>,
}

fn column<T: Copy>(value: T, len: usize) -> Box<[T]> {
    vec![value; len].into_boxed_slice()
}

impl<const N: usize> ParticleStore<N> {
    /// Allocate every column at full capacity.
    pub fn new() -> Self {
        Self {
            len: 0,
            positions: column(Vec3::ZERO, N),
            velocities: column(Vec3::ZERO, N),
            start_colors: column(Vec4::ZERO, N),
            end_colors: column(Vec4::ZERO, N),
            color_speeds: column(0.0, N),
            lightings: column(0.0, N),
            sizes: column(0.0, N),
            blurs: column(0.0, N),
            ages: column(0.0, N),
            life_limits: column(0.0, N),
            subject_to_gravity: column(false, N),
            grounded: column(false, N),
        }
    }

    /// Number of live particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Fixed capacity of the store.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Write `particle` into the first free slot and return its index.
    pub fn append(&mut self, particle: Particle) -> Result<usize, StoreError> {
        if self.len == N {
            return Err(StoreError::CapacityExceeded { capacity: N });
        }
        let index = self.len;
        self.write(index, &particle);
        self.len += 1;
        Ok(index)
    }

    /// Remove the particle at `index` by moving the last live row into it.
    ///
    /// `index` must be `< len()`. Debug builds assert; release builds ignore
    /// an out-of-range index.
    pub fn remove(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "remove index {index} out of live range {}",
            self.len
        );
        if index >= self.len {
            return;
        }
        let last = self.len - 1;
        if index != last {
            self.move_row(last, index);
        }
        self.len = last;
    }

    /// Drop every live particle.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Read a live row.
    pub fn get(&self, index: usize) -> Option<Particle> {
        if index >= self.len {
            return None;
        }
        Some(Particle {
            position: self.positions[index],
            velocity: self.velocities[index],
            start_color: self.start_colors[index],
            end_color: self.end_colors[index],
            color_speed: self.color_speeds[index],
            lighting: self.lightings[index],
            size: self.sizes[index],
            blur: self.blurs[index],
            age: self.ages[index],
            life_limit: self.life_limits[index],
            subject_to_gravity: self.subject_to_gravity[index],
            grounded: self.grounded[index],
        })
    }

    /// Mutable kinematic view of a live row.
    pub fn particle_mut(&mut self, index: usize) -> Option<ParticleMut<'_>> {
        if index >= self.len {
            return None;
        }
        Some(ParticleMut {
            position: &mut self.positions[index],
            velocity: &mut self.velocities[index],
            age: &mut self.ages[index],
            grounded: &mut self.grounded[index],
            subject_to_gravity: self.subject_to_gravity[index],
            life_limit: self.life_limits[index],
        })
    }

    // ========== Live columns ==========

    pub fn positions(&self) -> &[Vec3] {
        &self.positions[..self.len]
    }

    pub fn start_colors(&self) -> &[Vec4] {
        &self.start_colors[..self.len]
    }

    pub fn end_colors(&self) -> &[Vec4] {
        &self.end_colors[..self.len]
    }

    pub fn color_speeds(&self) -> &[f32] {
        &self.color_speeds[..self.len]
    }

    pub fn lightings(&self) -> &[f32] {
        &self.lightings[..self.len]
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes[..self.len]
    }

    pub fn blurs(&self) -> &[f32] {
        &self.blurs[..self.len]
    }

    pub fn ages(&self) -> &[f32] {
        &self.ages[..self.len]
    }

    fn write(&mut self, index: usize, p: &Particle) {
        self.positions[index] = p.position;
        self.velocities[index] = p.velocity;
        self.start_colors[index] = p.start_color;
        self.end_colors[index] = p.end_color;
        self.color_speeds[index] = p.color_speed;
        self.lightings[index] = p.lighting;
        self.sizes[index] = p.size;
        self.blurs[index] = p.blur;
        self.ages[index] = p.age;
        self.life_limits[index] = p.life_limit;
        self.subject_to_gravity[index] = p.subject_to_gravity;
        self.grounded[index] = p.grounded;
    }

    /// Copy row `from` over row `to` in every column.
    fn move_row(&mut self, from: usize, to: usize) {
        self.positions[to] = self.positions[from];
        self.velocities[to] = self.velocities[from];
        self.start_colors[to] = self.start_colors[from];
        self.end_colors[to] = self.end_colors[from];
        self.color_speeds[to] = self.color_speeds[from];
        self.lightings[to] = self.lightings[from];
        self.sizes[to] = self.sizes[from];
        self.blurs[to] = self.blurs[from];
        self.ages[to] = self.ages[from];
        self.life_limits[to] = self.life_limits[from];
        self.subject_to_gravity[to] = self.subject_to_gravity[from];
        self.grounded[to] = self.grounded[from];
    }
}

impl<const N: usize> Default for ParticleStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
