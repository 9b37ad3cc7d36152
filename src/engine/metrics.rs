use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SettingsError;
use crate::fitness::MetricsSnapshot;

use super::GaEngine;

/// summary of one ranked population
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    // raw fitness, independent of niching
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub worst_fitness: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diversity: Option<f64>,
    /// population mean of the self-adaptive step sizes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_step_sizes: Option<[f32; 3]>,
}

/// per-generation statistics of a run, in order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub generations: Vec<GenerationStats>,
}

impl History {
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn last(&self) -> Option<&GenerationStats> {
        self.generations.last()
    }

    /// write the history as pretty JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl GaEngine {
    pub fn stats(&self) -> GenerationStats {
        profiling::scope!("GaEngine::stats");
        let n = self.population.len().max(1) as f64;
        let mut best = f64::INFINITY;
        let mut worst = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for g in &self.population {
            best = best.min(g.fitness);
            worst = worst.max(g.fitness);
            sum += g.fitness;
        }

        let mut msp_sum = [0.0f32; 3];
        let mut msp_count = 0usize;
        for msp in self.population.iter().filter_map(|g| g.mean_step_sizes()) {
            for (s, v) in msp_sum.iter_mut().zip(msp) {
                *s += v;
            }
            msp_count += 1;
        }

        GenerationStats {
            generation: self.generation,
            best_fitness: best,
            mean_fitness: sum / n,
            worst_fitness: worst,
            diversity: self.diversity,
            mean_step_sizes: (msp_count > 0).then(|| msp_sum.map(|s| s / msp_count as f32)),
        }
    }

    /// error per channel and PSNR of the rank-0 genome
    pub fn best_metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::from_fitness(self.best().fitness, self.problem.metric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation_config::MutationConfig;
    use crate::raster::Raster;
    use crate::settings::EngineConfig;

    fn engine(self_adaptive: bool) -> GaEngine {
        let cfg = EngineConfig {
            pop_size: 4,
            n_poly: 3,
            n_vertex: 3,
            internal_resolution: 8,
            mutation: MutationConfig { self_adaptive, ..Default::default() },
            ..Default::default()
        };
        GaEngine::new(Raster::filled(8, 8, [30, 60, 90, 255]), cfg).unwrap()
    }

    #[test]
    fn test_stats_bracket_the_population() {
        let e = engine(false);
        let s = e.stats();
        assert_eq!(s.generation, 0);
        assert!(s.best_fitness <= s.mean_fitness && s.mean_fitness <= s.worst_fitness);
        assert_eq!(s.best_fitness, e.best().fitness);
        assert!(s.mean_step_sizes.is_none());
    }

    #[test]
    fn test_stats_report_step_sizes_when_adaptive() {
        let mut e = engine(true);
        e.next();
        let s = e.stats();
        assert_eq!(s.generation, 1);
        assert!(s.mean_step_sizes.is_some());
    }

    #[test]
    fn test_history_json() {
        let mut e = engine(false);
        let mut history = History::default();
        history.record(e.stats());
        e.next();
        history.record(e.stats());
        assert_eq!(history.len(), 2);

        let path = std::env::temp_dir().join(format!("polyga-{}-history.json", std::process::id()));
        history.save_json(&path).unwrap();
        let back: History = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.len(), 2);
        assert_eq!(back.last().map(|s| s.generation), Some(1));
        assert!((back.generations[0].best_fitness - history.generations[0].best_fitness).abs() < 1e-9);
    }

    #[test]
    fn test_best_metrics() {
        let e = engine(false);
        let m = e.best_metrics();
        assert_eq!(m.error_per_channel, e.best().fitness);
        assert!(m.psnr.is_finite());
    }
}
