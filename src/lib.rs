//! # spritefall
//!
//! Real-time point-sprite particle simulation with ground collision and a
//! free-fly camera.
//!
//! Up to [`MAX_PARTICLES`] particles fall under gravity, bounce off the floor
//! and the arena walls, come to rest by sliding with friction, and are drawn
//! as lit sprites over a ground quad.
//!
//! ## Quick Start
//!
//! ```ignore
//! use spritefall::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     Simulation::new()
//!         .with_preset(Preset::Fountain)
//!         .with_seed(42)
//!         .run()
//! }
//! ```
//!
//! ## Frame Pipeline
//!
//! | Step | Type |
//! |------|------|
//! | Input drained, camera and clock updated | [`InputState`], [`CameraState`], [`Time`] |
//! | New particles sampled from each emitter | [`Spawner`], [`Emitter`] |
//! | Every live particle integrated | [`Integrator`] |
//! | Live columns uploaded | [`RenderSync`] |
//! | Ground, opaque and translucent sprites drawn | wgpu backend |
//!
//! The simulation core ([`ParticleStore`], [`SimulationState`]) needs no
//! window or GPU and can be driven directly:
//!
//! ```
//! use spritefall::prelude::*;
//!
//! let mut state: SimulationState<1024> =
//!     SimulationState::new(PhysicsConfig::default(), Spawner::with_seed(1));
//! state
//!     .add_emitter(
//!         Emitter::new(SpawnShape::Disk { radius: 2.0 }, 100.0).at(Vec3::new(0.0, 10.0, 100.0)),
//!     )
//!     .unwrap();
//! for _ in 0..60 {
//!     state.step(1.0 / 60.0);
//! }
//! assert!(!state.store.is_empty());
//! ```

pub mod camera;
pub mod config;
pub mod emitter;
pub mod error;
mod gpu;
pub mod input;
pub mod physics;
pub mod scene;
pub mod simulation;
pub mod spawn;
pub mod state;
pub mod store;
pub mod sync;
pub mod time;

pub use camera::{CameraConfig, CameraState, Movement};
pub use config::{SimConfig, WindowConfig};
pub use emitter::{Emitter, Span, SpawnShape};
pub use error::{ConfigError, EmitterError, GpuError, SimulationError, StoreError};
pub use glam::{Mat4, Vec3, Vec4};
pub use input::InputState;
pub use physics::{Integrator, PhysicsConfig};
pub use scene::Preset;
pub use simulation::Simulation;
pub use spawn::{SpawnReport, Spawner};
pub use state::{FrameReport, SimulationState};
pub use store::{Particle, ParticleStore, MAX_PARTICLES};
pub use sync::{RenderSync, SceneLayout, StaticGeometry, UploadBuffer};
pub use time::Time;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use spritefall::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SimConfig;
    pub use crate::emitter::{Emitter, Span, SpawnShape};
    pub use crate::error::SimulationError;
    pub use crate::physics::PhysicsConfig;
    pub use crate::scene::Preset;
    pub use crate::simulation::Simulation;
    pub use crate::spawn::Spawner;
    pub use crate::state::SimulationState;
    pub use crate::store::{Particle, ParticleStore};
    pub use crate::{Vec3, Vec4};
}
