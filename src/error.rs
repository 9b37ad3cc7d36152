// error types for engine construction and settings persistence

use thiserror::Error;

/// raised while validating an engine configuration or a target raster.
/// never produced mid-generation: every check runs before the population exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("population size must be at least 2, got {0}")]
    PopulationSize(usize),

    #[error("polygon count must be at least 1")]
    PolygonCount,

    #[error("vertex count must be at least 3, got {0}")]
    VertexCount(usize),

    #[error("niche size must be a finite non-negative number, got {0}")]
    NicheSize(f64),

    #[error("truncation cutoff must lie in (0, 1], got {0}")]
    Cutoff(f64),

    #[error("tournament size {k} needs {needed} distinct individuals but the population holds {pop_size}")]
    TournamentSize { k: usize, needed: usize, pop_size: usize },

    #[error("mutation rate {0} is outside [0, 1]")]
    MutationRate(f32),

    #[error("mutation step size {0} must be finite and non-negative")]
    StepSize(f32),

    #[error("internal resolution must be at least 1 pixel")]
    InternalResolution,

    #[error("raster is {width}x{height} with {len} bytes, expected {expected} RGBA bytes")]
    MalformedRaster { width: u32, height: u32, len: usize, expected: usize },

    #[error("replacement target is {got_width}x{got_height}, expected {width}x{height}")]
    TargetDimensions { width: u32, height: u32, got_width: u32, got_height: u32 },

    #[error("seeded population holds {got} genomes, expected {expected}")]
    SeedCount { expected: usize, got: usize },

    #[error("seeded genome {index} does not match the configured shape: {reason}")]
    SeedGenome { index: usize, reason: String },

    #[error("unknown selection strategy \"{0}\"")]
    UnknownSelection(String),

    #[error("unknown replacement strategy \"{0}\"")]
    UnknownReplacement(String),

    #[error("unknown crossover mode \"{0}\"")]
    UnknownCrossover(String),

    #[error("unknown color space \"{0}\"")]
    UnknownColorSpace(String),
}

/// raised while loading or saving settings files
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),
}
