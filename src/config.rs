//! Scene files.
//!
//! A scene file is TOML. Every section is optional:
//!
//! ```toml
//! seed = 42
//! preset = "empty"
//!
//! [window]
//! width = 1280
//! height = 720
//!
//! [physics]
//! cull_expired = true
//!
//! [camera]
//! eye = [0.0, 10.0, -20.0]
//!
//! [[emitters]]
//! shape = { kind = "disk", radius = 3.0 }
//! rate = 500.0
//! position = [0.0, 0.1, 100.0]
//! velocity = { min = [-2.0, 8.0, -2.0], max = [2.0, 14.0, 2.0] }
//! lifetime = { min = 2.0, max = 5.0 }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::camera::CameraConfig;
use crate::emitter::Emitter;
use crate::error::ConfigError;
use crate::physics::PhysicsConfig;
use crate::scene::Preset;

/// Window settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "spritefall".to_string(),
            width: 800,
            height: 800,
        }
    }
}

/// Everything a run can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed; clock-seeded when absent.
    pub seed: Option<u64>,
    pub preset: Preset,
    /// Cap on cascade rain particles; fills the store when absent.
    pub rain: Option<usize>,
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub emitters: Vec<Emitter>,
}

impl SimConfig {
    /// Parse and validate a scene from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            emitters = config.emitters.len(),
            "scene file loaded"
        );
        Ok(config)
    }

    /// Check every emitter, reporting the first failure by index.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, emitter) in self.emitters.iter().enumerate() {
            emitter
                .validate()
                .map_err(|source| ConfigError::Emitter { index, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::SpawnShape;
    use crate::error::EmitterError;
    use glam::Vec3;

    #[test]
    fn test_empty_file_is_default() {
        let config = SimConfig::from_toml("").unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.preset, Preset::Cascade);
        assert_eq!(config.physics.gravity, 9.8);
    }

    #[test]
    fn test_full_scene() {
        let config = SimConfig::from_toml(
            r#"
            seed = 7
            preset = "empty"

            [window]
            width = 1024

            [physics]
            cull_expired = true
            legacy_position_gravity = false

            [camera]
            eye = [1.0, 2.0, 3.0]

            [[emitters]]
            shape = { kind = "disk", radius = 2.5 }
            rate = 120.0
            position = [0.0, 0.1, 100.0]
            velocity = { min = [-1.0, 5.0, -1.0], max = [1.0, 9.0, 1.0] }
            lifetime = { min = 1.0, max = 3.0 }

            [[emitters]]
            rate = 10.0
            subject_to_gravity = false
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.preset, Preset::Empty);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 800);
        assert!(config.physics.cull_expired);
        assert!(!config.physics.legacy_position_gravity);
        assert_eq!(config.physics.friction, 2.0);
        assert_eq!(config.camera.eye, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.camera.far, 500.0);

        assert_eq!(config.emitters.len(), 2);
        assert_eq!(config.emitters[0].shape, SpawnShape::Disk { radius: 2.5 });
        assert_eq!(config.emitters[0].velocity.max, Vec3::new(1.0, 9.0, 1.0));
        assert_eq!(config.emitters[1].shape, SpawnShape::Point);
        assert!(!config.emitters[1].subject_to_gravity);
    }

    #[test]
    fn test_invalid_emitter_reports_index() {
        let err = SimConfig::from_toml(
            r#"
            [[emitters]]
            rate = 5.0

            [[emitters]]
            rate = 5.0
            size = { min = 10.0, max = 1.0 }
            "#,
        )
        .unwrap_err();

        match err {
            ConfigError::Emitter { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, EmitterError::InvalidRange { attribute: "size" });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            SimConfig::from_toml("preset = \"volcano\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SimConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("not/here.toml"));
    }
}
