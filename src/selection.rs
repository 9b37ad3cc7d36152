use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::dna::Genome;
use crate::error::ConfigError;

/// parent selection policy. every variant except `Tournament` turns the ranked population
/// into a probability distribution and draws two distinct parents from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// weight ∝ raw fitness value (fitness-proportionate)
    RouletteWheel,
    /// weight = pop_size - rank
    RankBased,
    /// weight 1 for the top max(pop_size * cutoff, 2) individuals, 0 for the rest
    TruncatedRank { cutoff: f64 },
    /// best of k vs best of k, drawn from 2k distinct individuals
    Tournament { k: usize },
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        SelectionStrategy::TruncatedRank { cutoff: 0.1 }
    }
}

impl FromStr for SelectionStrategy {
    type Err = ConfigError;

    /// `roulette`, `rank`, `truncated[:cutoff]`, `tournament[:k]` (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigError::UnknownSelection(s.to_string());
        let lowered = s.to_ascii_lowercase().replace('-', "_");
        let (name, param) = match lowered.split_once(':') {
            Some((name, param)) => (name.trim().to_string(), Some(param.trim().to_string())),
            None => (lowered.trim().to_string(), None),
        };
        match (name.as_str(), param) {
            ("roulette" | "roulette_wheel", None) => Ok(SelectionStrategy::RouletteWheel),
            ("rank" | "rank_based", None) => Ok(SelectionStrategy::RankBased),
            ("truncated" | "truncated_rank", None) => Ok(SelectionStrategy::default()),
            ("truncated" | "truncated_rank", Some(p)) => {
                let cutoff = p.parse::<f64>().map_err(|_| unknown())?;
                Ok(SelectionStrategy::TruncatedRank { cutoff })
            }
            ("tournament", None) => Ok(SelectionStrategy::Tournament { k: 2 }),
            ("tournament", Some(p)) => {
                let k = p.parse::<usize>().map_err(|_| unknown())?;
                Ok(SelectionStrategy::Tournament { k })
            }
            _ => Err(unknown()),
        }
    }
}

/// number of individuals a truncated-rank cutoff keeps: at least two, at most the population
#[inline]
pub fn truncation_count(pop_size: usize, cutoff: f64) -> usize {
    let kept = (pop_size as f64 * cutoff).floor() as usize;
    kept.max(2).min(pop_size)
}

impl SelectionStrategy {
    pub fn validate(&self, pop_size: usize) -> Result<(), ConfigError> {
        match *self {
            SelectionStrategy::RouletteWheel | SelectionStrategy::RankBased => Ok(()),
            SelectionStrategy::TruncatedRank { cutoff } => {
                if cutoff.is_finite() && cutoff > 0.0 && cutoff <= 1.0 {
                    Ok(())
                } else {
                    Err(ConfigError::Cutoff(cutoff))
                }
            }
            SelectionStrategy::Tournament { k } => {
                let needed = 2 * k.max(1);
                if k == 0 || needed > pop_size {
                    Err(ConfigError::TournamentSize { k, needed, pop_size })
                } else {
                    Ok(())
                }
            }
        }
    }

    /// per-generation selection state for a population ranked best-first
    pub fn plan(&self, population: &[Genome]) -> SelectionPlan {
        profiling::scope!("SelectionStrategy::plan");
        let n = population.len();
        let weights: Vec<f64> = match *self {
            SelectionStrategy::Tournament { k } => return SelectionPlan::Tournament { k },
            SelectionStrategy::RouletteWheel => population.iter()
                .map(|g| g.fitness.max(0.0))
                .collect(),
            SelectionStrategy::RankBased => (0..n).map(|i| (n - i) as f64).collect(),
            SelectionStrategy::TruncatedRank { cutoff } => {
                let kept = truncation_count(n, cutoff);
                (0..n).map(|i| if i < kept { 1.0 } else { 0.0 }).collect()
            }
        };
        SelectionPlan::Weighted(normalize(weights))
    }
}

// normalize to a probability distribution; degenerate weights fall back to uniform
fn normalize(mut weights: Vec<f64>) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 || weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        let uniform = 1.0 / weights.len().max(1) as f64;
        weights.iter_mut().for_each(|w| *w = uniform);
        return weights;
    }
    weights.iter_mut().for_each(|w| *w /= total);
    weights
}

/// what a generation draws its mating pairs from
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionPlan {
    /// probability per ranked individual, summing to 1
    Weighted(Vec<f64>),
    /// no weights: each mating event runs two disjoint tournaments of size k
    Tournament { k: usize },
}

impl SelectionPlan {
    /// the selection distribution, None for tournaments
    pub fn probabilities(&self) -> Option<&[f64]> {
        match self {
            SelectionPlan::Weighted(p) => Some(p),
            SelectionPlan::Tournament { .. } => None,
        }
    }

    /// indices of two distinct parents in `population`
    pub fn select_pair<R: Rng>(&self, population: &[Genome], rng: &mut R) -> (usize, usize) {
        match self {
            SelectionPlan::Weighted(p) => {
                let first = draw(p, None, rng);
                let second = draw(p, Some(first), rng);
                (first, second)
            }
            SelectionPlan::Tournament { k } => tournament_pair(population, *k, rng),
        }
    }
}

// inverse-CDF draw over `probs`, optionally excluding one index
fn draw<R: Rng>(probs: &[f64], exclude: Option<usize>, rng: &mut R) -> usize {
    let n = probs.len();
    let total: f64 = probs.iter()
        .enumerate()
        .filter(|&(i, _)| Some(i) != exclude)
        .map(|(_, p)| p)
        .sum();

    // the excluded individual held all the mass; any other one will do
    if total <= 0.0 {
        let offset = rng.random_range(1..n.max(2));
        return (exclude.unwrap_or(0) + offset) % n.max(1);
    }

    let mut remaining = rng.random::<f64>() * total;
    let mut last = None;
    for (i, &p) in probs.iter().enumerate() {
        if Some(i) == exclude || p <= 0.0 {
            continue;
        }
        if remaining < p {
            return i;
        }
        remaining -= p;
        last = Some(i);
    }
    // float round-off at the top of the range
    last.unwrap_or(0)
}

fn tournament_pair<R: Rng>(population: &[Genome], k: usize, rng: &mut R) -> (usize, usize) {
    let drawn = rand::seq::index::sample(rng, population.len(), 2 * k);
    let mut best = [None::<usize>; 2];
    for (pos, idx) in drawn.iter().enumerate() {
        // even draws form the first group, odd draws the second
        let better = match best[pos % 2] {
            Some(cur) => population[idx].fitness < population[cur].fitness,
            None => true,
        };
        if better {
            best[pos % 2] = Some(idx);
        }
    }
    match best {
        [Some(a), Some(b)] => (a, b),
        // validation guarantees k >= 1 and 2k <= population size
        _ => (0, 1),
    }
}
