//! engine settings for polyga
//! every construction parameter of `GaEngine`, persisted as pretty JSON
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::crossover::CrossoverKind;
use crate::error::{ConfigError, SettingsError};
use crate::fitness::{ColorSpace, FitnessMetric};
use crate::mutation_config::MutationConfig;
use crate::replacement::ReplacementStrategy;
use crate::selection::SelectionStrategy;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    // population
    pub pop_size: usize,
    pub n_poly: usize,
    pub n_vertex: usize,

    // policies
    pub selection: SelectionStrategy,
    pub replacement: ReplacementStrategy,
    pub crossover: CrossoverKind,
    pub mutation: MutationConfig,

    /// fitness-sharing radius in genome-distance units; 0 disables niching
    pub niche_size: f64,

    // fitness evaluation
    /// longest side of the evaluation raster in pixels
    pub internal_resolution: u32,
    pub color_space: ColorSpace,
    pub metric: FitnessMetric,

    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pop_size: 50,
            n_poly: 100,
            n_vertex: 4,

            selection: SelectionStrategy::TruncatedRank { cutoff: 0.1 },
            replacement: ReplacementStrategy::Comma,
            crossover: CrossoverKind::Uniform,
            mutation: MutationConfig::default(),

            niche_size: 0.0,

            internal_resolution: 75,
            color_space: ColorSpace::Rgb,
            metric: FitnessMetric::Absolute,

            seed: 0xDEAD_BEEF,
        }
    }
}

impl EngineConfig {
    /// fail-fast checks run before any genome is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pop_size < 2 {
            return Err(ConfigError::PopulationSize(self.pop_size));
        }
        if self.n_poly == 0 {
            return Err(ConfigError::PolygonCount);
        }
        if self.n_vertex < 3 {
            return Err(ConfigError::VertexCount(self.n_vertex));
        }
        if !self.niche_size.is_finite() || self.niche_size < 0.0 {
            return Err(ConfigError::NicheSize(self.niche_size));
        }
        if self.internal_resolution == 0 {
            return Err(ConfigError::InternalResolution);
        }
        self.selection.validate(self.pop_size)?;
        self.mutation.validate()?;
        Ok(())
    }

    #[inline]
    pub fn niching_enabled(&self) -> bool {
        self.niche_size > 0.0
    }

    /// save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// load and validate settings from a JSON file. unknown fields and policy names are errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// like `load`, but a missing file means defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("{} not found, using default settings", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
