//! Simulation configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `footpath.ron` in the working directory, or an explicit file
//! 3. Environment variables prefixed with `FOOTPATH_`
//!
//! Example environment variable: `FOOTPATH_MOVEMENT__PHYSICS__GRAVITY=0.6`

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use footpath_mob::MovementConfig;
use serde::{Deserialize, Serialize};

/// Everything a simulation run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub movement: MovementConfig,

    #[serde(default)]
    pub run: RunConfig,
}

/// How long and how fast to simulate, and how to report it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of ticks to simulate
    pub ticks: u32,
    /// Milliseconds per tick
    pub dt_ms: f32,
    /// Base seed mixed into every mob's seed
    pub seed: u64,
    /// Trace output format
    pub format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            dt_ms: 16.67,
            seed: 1,
            format: OutputFormat::Text,
        }
    }
}

/// Trace output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per mob and tick
    Text,
    /// One JSON object per line
    Json,
}

impl SimConfig {
    /// Load configuration with layered priority
    ///
    /// Without `path`, a missing `footpath.ron` is fine; an explicit `path`
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&SimConfig::default())
            .context("Failed to encode default configuration")?;

        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("footpath")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .add_source(defaults)
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (FOOTPATH_RUN__TICKS, etc.)
            .add_source(
                Environment::with_prefix("FOOTPATH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        let sim: SimConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        sim.validate()?;
        Ok(sim)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let physics = &self.movement.physics;
        anyhow::ensure!(
            physics.reference_frame_ms > 0.0,
            "movement.physics.reference_frame_ms must be positive (got {})",
            physics.reference_frame_ms
        );
        anyhow::ensure!(
            self.run.dt_ms.is_finite() && self.run.dt_ms > 0.0,
            "run.dt_ms must be positive (got {})",
            self.run.dt_ms
        );
        Ok(())
    }
}
