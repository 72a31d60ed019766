//! Particle emitters for runtime spawning.
//!
//! An emitter describes where new particles appear and which ranges their
//! attributes are drawn from. It holds configuration only; the
//! [`Spawner`](crate::spawn::Spawner) turns it into particles every frame.
//!
//! # Spawn Shapes
//!
//! | Shape | Description |
//! |-------|-------------|
//! | [`SpawnShape::Point`] | Every particle starts at the emitter position |
//! | [`SpawnShape::Disk`] | Area-uniform sample of a horizontal disk |
//!
//! # Example
//!
//! ```
//! use spritefall::emitter::{Emitter, Span, SpawnShape};
//! use spritefall::{Vec3, Vec4};
//!
//! // Fountain spraying upward from a 2-unit disk
//! let fountain = Emitter::new(SpawnShape::Disk { radius: 2.0 }, 400.0)
//!     .at(Vec3::new(0.0, 0.1, 100.0))
//!     .with_velocity(Span::new(Vec3::new(-1.0, 8.0, -1.0), Vec3::new(1.0, 14.0, 1.0)))
//!     .with_start_color(Span::fixed(Vec4::new(0.2, 0.5, 1.0, 0.8)));
//! assert!(fountain.validate().is_ok());
//! ```

use glam::{Vec3, Vec4};
use serde::Deserialize;

use crate::error::EmitterError;

/// Inclusive `[min, max]` range an attribute is sampled from.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy> Span<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Degenerate range that always yields `value`.
    pub fn fixed(value: T) -> Self {
        Self { min: value, max: value }
    }
}

impl Span<f32> {
    /// Map a unit sample `t` in `[0, 1)` into the range.
    #[inline]
    pub fn at(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }

    fn check(&self, attribute: &'static str) -> Result<(), EmitterError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(EmitterError::InvalidRange { attribute })
        }
    }
}

impl Span<Vec3> {
    fn check(&self, attribute: &'static str) -> Result<(), EmitterError> {
        if self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all() {
            Ok(())
        } else {
            Err(EmitterError::InvalidRange { attribute })
        }
    }
}

impl Span<Vec4> {
    fn check(&self, attribute: &'static str) -> Result<(), EmitterError> {
        if self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all() {
            Ok(())
        } else {
            Err(EmitterError::InvalidRange { attribute })
        }
    }
}

/// Region new particles are placed in.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnShape {
    /// Spawn exactly at the emitter position.
    Point,
    /// Spawn uniformly over a disk of `radius` in the XZ plane.
    Disk {
        /// Disk radius in world units.
        radius: f32,
    },
}

/// Particle emitter configuration.
///
/// Immutable once registered with a
/// [`SimulationState`](crate::state::SimulationState), which validates it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Emitter {
    /// Spawn region.
    pub shape: SpawnShape,
    /// Emission rate (particles per second).
    pub rate: f32,
    /// Centre of the spawn region.
    pub position: Vec3,
    /// Velocity added to every sampled velocity.
    pub base_velocity: Vec3,
    /// Nominal emission direction. Informational; spawning does not rotate by it.
    pub direction: Vec3,
    /// Per-component initial velocity range.
    pub velocity: Span<Vec3>,
    /// Per-channel start colour range.
    pub start_color: Span<Vec4>,
    /// Per-channel end colour range.
    pub end_color: Span<Vec4>,
    /// Colour transition speed range.
    pub color_speed: Span<f32>,
    /// Lifetime range in seconds.
    pub lifetime: Span<f32>,
    /// Sprite size range.
    pub size: Span<f32>,
    /// Edge blur range.
    pub blur: Span<f32>,
    /// Lighting weight applied to every spawned particle.
    pub lighting: f32,
    /// Whether spawned particles fall under gravity.
    pub subject_to_gravity: bool,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            shape: SpawnShape::Point,
            rate: 0.0,
            position: Vec3::ZERO,
            base_velocity: Vec3::ZERO,
            direction: Vec3::Y,
            velocity: Span::fixed(Vec3::ZERO),
            start_color: Span::fixed(Vec4::ONE),
            end_color: Span::fixed(Vec4::ONE),
            color_speed: Span::fixed(0.0),
            lifetime: Span::fixed(5.0),
            size: Span::fixed(25.0),
            blur: Span::fixed(0.0),
            lighting: 1.0,
            subject_to_gravity: true,
        }
    }
}

impl Emitter {
    /// Emitter of the given shape and rate with default attribute ranges.
    pub fn new(shape: SpawnShape, rate: f32) -> Self {
        Self {
            shape,
            rate,
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_base_velocity(mut self, velocity: Vec3) -> Self {
        self.base_velocity = velocity;
        self
    }

    pub fn with_velocity(mut self, velocity: Span<Vec3>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_start_color(mut self, color: Span<Vec4>) -> Self {
        self.start_color = color;
        self
    }

    pub fn with_end_color(mut self, color: Span<Vec4>) -> Self {
        self.end_color = color;
        self
    }

    pub fn with_color_speed(mut self, speed: Span<f32>) -> Self {
        self.color_speed = speed;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Span<f32>) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_size(mut self, size: Span<f32>) -> Self {
        self.size = size;
        self
    }

    pub fn with_blur(mut self, blur: Span<f32>) -> Self {
        self.blur = blur;
        self
    }

    pub fn with_lighting(mut self, lighting: f32) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn with_gravity(mut self, subject_to_gravity: bool) -> Self {
        self.subject_to_gravity = subject_to_gravity;
        self
    }

    /// Reject configurations that would produce undefined particles.
    pub fn validate(&self) -> Result<(), EmitterError> {
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(EmitterError::InvalidRate(self.rate));
        }
        if let SpawnShape::Disk { radius } = self.shape {
            if !radius.is_finite() || radius < 0.0 {
                return Err(EmitterError::InvalidRadius(radius));
            }
        }
        self.velocity.check("velocity")?;
        self.start_color.check("start_color")?;
        self.end_color.check("end_color")?;
        self.color_speed.check("color_speed")?;
        self.lifetime.check("lifetime")?;
        self.size.check("size")?;
        self.blur.check("blur")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_emitter_is_valid() {
        assert!(Emitter::default().validate().is_ok());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let emitter = Emitter::new(SpawnShape::Point, -1.0);
        assert_eq!(emitter.validate(), Err(EmitterError::InvalidRate(-1.0)));
    }

    #[test]
    fn test_nan_rate_rejected() {
        let emitter = Emitter::new(SpawnShape::Point, f32::NAN);
        assert!(matches!(emitter.validate(), Err(EmitterError::InvalidRate(_))));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let emitter = Emitter::default().with_size(Span::new(10.0, 5.0));
        assert_eq!(
            emitter.validate(),
            Err(EmitterError::InvalidRange { attribute: "size" })
        );
    }

    #[test]
    fn test_inverted_vector_component_rejected() {
        let emitter = Emitter::default()
            .with_velocity(Span::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 1.0)));
        assert_eq!(
            emitter.validate(),
            Err(EmitterError::InvalidRange { attribute: "velocity" })
        );
    }

    #[test]
    fn test_negative_disk_radius_rejected() {
        let emitter = Emitter::new(SpawnShape::Disk { radius: -2.0 }, 10.0);
        assert_eq!(emitter.validate(), Err(EmitterError::InvalidRadius(-2.0)));
    }

    #[test]
    fn test_span_at() {
        let span = Span::new(2.0, 6.0);
        assert_eq!(span.at(0.0), 2.0);
        assert_eq!(span.at(0.5), 4.0);
        assert_eq!(Span::fixed(3.0).at(0.7), 3.0);
    }
}
