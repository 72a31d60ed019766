//! Error types for spritefall.
//!
//! Store and emitter errors are non-fatal and surface during a frame or at
//! configuration time. GPU, config and simulation errors abort startup.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`ParticleStore`](crate::store::ParticleStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Every slot is live; nothing was written.
    #[error("particle store is full ({capacity} particles)")]
    CapacityExceeded {
        /// Fixed capacity of the store.
        capacity: usize,
    },
}

/// Malformed emitter configuration, detected when the emitter is registered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmitterError {
    /// Spawn rate is negative, NaN or infinite.
    #[error("invalid spawn rate {0}: must be finite and >= 0")]
    InvalidRate(f32),
    /// A `[min, max]` range has `min > max` or a non-finite bound.
    #[error("invalid range for `{attribute}`: min must be <= max and both finite")]
    InvalidRange {
        /// Name of the offending attribute.
        attribute: &'static str,
    },
    /// Disk radius is negative or non-finite.
    #[error("invalid disk radius {0}")]
    InvalidRadius(f32),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// Surface reports no usable texture format.
    #[error("surface has no supported texture formats")]
    NoSurfaceFormat,
}

/// Errors raised while loading a scene file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`SimConfig`](crate::config::SimConfig).
    #[error("failed to parse scene file: {0}")]
    Parse(#[from] toml::de::Error),
    /// An emitter in the file failed validation.
    #[error("emitter #{index} is invalid: {source}")]
    Emitter {
        /// Position of the emitter in the file.
        index: usize,
        /// Validation failure.
        source: EmitterError,
    },
}

/// Errors that can occur when running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Failed to create or run the event loop.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Scene configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An emitter passed to the builder failed validation.
    #[error("invalid emitter: {0}")]
    Emitter(#[from] EmitterError),
}
