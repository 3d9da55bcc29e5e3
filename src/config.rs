use crate::physics::fields::registry::FieldRegistry;
use crate::physics::math::Scalar;
use crate::physics::stepper::StepParams;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest ring depth accepted from configuration. Per-particle vertex indices stay below 2^16.
pub const MAX_TRAIL_DEPTH: usize = 32768;

const ENV_PREFIX: &str = "VFIELD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to assemble layered configuration: {0}")]
    Layered(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub trails: TrailsConfig,
    pub rendering: RenderingConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub field: String,
    pub step_size: Scalar,
    pub steps_per_frame: usize,
    pub initial_particle_count: usize,
    pub initial_seed: Option<u64>,
    pub clone_jitter: Scalar,
    pub start_paused: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            field: "rigid".to_string(),
            step_size: 0.005,
            steps_per_frame: 6,
            initial_particle_count: 50,
            initial_seed: None,
            clone_jitter: 1e-4,
            start_paused: false,
        }
    }
}

impl PhysicsConfig {
    pub fn step_params(&self) -> StepParams {
        StepParams {
            step_size: self.step_size,
            steps_per_frame: self.steps_per_frame,
            paused: self.start_paused,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrailsConfig {
    pub depth: usize,
    pub min_depth: usize,
    pub max_depth: usize,
    pub draw_heads: bool,
}

impl Default for TrailsConfig {
    fn default() -> Self {
        Self {
            depth: 1024,
            min_depth: 4,
            max_depth: MAX_TRAIL_DEPTH,
            draw_heads: false,
        }
    }
}

impl TrailsConfig {
    /// Half of `current`, never below `min_depth`
    pub fn halved_depth(&self, current: usize) -> usize {
        (current / 2).max(self.min_depth)
    }

    /// Twice `current`, never above `max_depth`
    pub fn doubled_depth(&self, current: usize) -> usize {
        current.saturating_mul(2).min(self.max_depth)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RenderingConfig {
    pub camera_radius: f32,
    pub trail_alpha: f32,
    pub head_radius: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            camera_radius: 3.0,
            trail_alpha: 0.9,
            head_radius: 0.01,
        }
    }
}

impl SimulationConfig {
    /// Parse a TOML file. Missing sections and keys take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a file, falling back to defaults if the file doesn't exist
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Read { .. }) => {
                info!("Config file {} not found. Using defaults.", path);
                Self::default()
            }
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Location of the per-user configuration file, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "vfield").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Defaults, overlaid by the user configuration file, overlaid by `VFIELD_*` variables.
    ///
    /// Nested keys use a double underscore, e.g. `VFIELD_PHYSICS__STEP_SIZE=0.01`.
    pub fn load_from_user_config() -> Self {
        match Self::try_load_from_user_config() {
            Ok(config) => config,
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Same layering as [`Self::load_from_user_config`], leaving the fallback to the caller
    pub fn try_load_from_user_config() -> Result<Self, ConfigError> {
        Self::load_layered(Self::user_config_path(), ENV_PREFIX)
    }

    pub fn load_layered(file: Option<PathBuf>, env_prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = file {
            debug!("Reading user configuration from {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        let config = builder
            .add_source(
                ::config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        let trails = &self.trails;

        if !(physics.step_size.is_finite() && physics.step_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "physics.step_size must be finite and positive, got {}",
                physics.step_size
            )));
        }
        if physics.steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "physics.steps_per_frame must be at least 1".to_string(),
            ));
        }
        if !(physics.clone_jitter.is_finite() && physics.clone_jitter >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "physics.clone_jitter must be finite and non-negative, got {}",
                physics.clone_jitter
            )));
        }
        FieldRegistry::default()
            .create(&physics.field)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if trails.min_depth == 0 || trails.min_depth > trails.max_depth {
            return Err(ConfigError::Invalid(format!(
                "trails.min_depth must be in 1..={}, got {}",
                trails.max_depth, trails.min_depth
            )));
        }
        if trails.max_depth > MAX_TRAIL_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "trails.max_depth must not exceed {MAX_TRAIL_DEPTH}, got {}",
                trails.max_depth
            )));
        }
        if !(trails.min_depth..=trails.max_depth).contains(&trails.depth) {
            return Err(ConfigError::Invalid(format!(
                "trails.depth must be in {}..={}, got {}",
                trails.min_depth, trails.max_depth, trails.depth
            )));
        }

        let rendering = &self.rendering;
        if !(0.0..=1.0).contains(&rendering.trail_alpha) {
            return Err(ConfigError::Invalid(format!(
                "rendering.trail_alpha must be in 0..=1, got {}",
                rendering.trail_alpha
            )));
        }
        if !(rendering.camera_radius > 0.0 && rendering.head_radius > 0.0) {
            return Err(ConfigError::Invalid(
                "rendering.camera_radius and rendering.head_radius must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
