use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::dna::Genome;
use crate::error::ConfigError;

/// survivor policy applied before ranking and truncation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementStrategy {
    /// (μ, λ): only the offspring compete for the next generation
    #[default]
    Comma,
    /// (μ + λ): parents and offspring compete together
    Plus,
}

impl FromStr for ReplacementStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "comma" | "," => Ok(ReplacementStrategy::Comma),
            "plus" | "+" => Ok(ReplacementStrategy::Plus),
            _ => Err(ConfigError::UnknownReplacement(s.to_string())),
        }
    }
}

impl ReplacementStrategy {
    /// every genome that competes for a place in the next generation (unsorted)
    pub fn survivor_pool(&self, parents: &[Genome], offspring: Vec<Genome>) -> Vec<Genome> {
        match self {
            ReplacementStrategy::Comma => offspring,
            ReplacementStrategy::Plus => {
                let mut pool = Vec::with_capacity(parents.len() + offspring.len());
                pool.extend_from_slice(parents);
                pool.extend(offspring);
                pool
            }
        }
    }
}
