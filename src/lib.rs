//! Generational evolutionary algorithm that approximates a target image with
//! translucent colored polygons.
//!
//! `GaEngine` owns the population; each call to `GaEngine::next` runs one
//! select → recombine → mutate → score → rank → truncate cycle.

pub mod crossover;
pub mod dna;
pub mod engine;
pub mod error;
pub mod fitness;
pub mod geom;
pub mod mutate;
pub mod mutation_config;
pub mod problem;
pub mod raster;
pub mod render;
pub mod replacement;
pub mod selection;
pub mod settings;

pub use crossover::CrossoverKind;
pub use dna::{GeneId, Genome, Polygon};
pub use engine::metrics::{GenerationStats, History};
pub use engine::{GaEngine, Generation};
pub use error::{ConfigError, SettingsError};
pub use fitness::{ColorSpace, FitnessMetric, MetricsSnapshot};
pub use mutation_config::{MutationChannel, MutationConfig};
pub use problem::Problem;
pub use raster::Raster;
pub use replacement::ReplacementStrategy;
pub use selection::{SelectionPlan, SelectionStrategy};
pub use settings::EngineConfig;
