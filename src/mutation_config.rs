use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// bounds for self-adaptive step sizes so they can neither vanish nor explode
pub const STEP_MIN: f32 = 1e-3;
pub const STEP_MAX: f32 = 1.0;

/// the three independently rated mutation channels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationChannel {
    /// vertex positions, step = std dev as a fraction of the canvas side
    Vertex,
    /// color and alpha components, step = std dev in 0..1 color units
    Color,
    /// polygon replacement / z-order moves, step = std dev of a move as a fraction of the polygon count
    Topology,
}

impl MutationChannel {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            MutationChannel::Vertex => 0,
            MutationChannel::Color => 1,
            MutationChannel::Topology => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MutationConfig {
    // per-gene mutation probabilities, indexed by MutationChannel
    pub rates: [f32; 3],
    // fixed step sizes; with self_adaptive on they only seed the evolved per-polygon steps
    pub step_sizes: [f32; 3],
    // co-evolve per-polygon step sizes (log-normal self-adaptation)
    pub self_adaptive: bool,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            rates: [0.02, 0.02, 0.02],
            step_sizes: [0.2, 0.2, 0.2],
            self_adaptive: false,
        }
    }
}

impl MutationConfig {
    #[inline]
    pub fn rate(&self, channel: MutationChannel) -> f32 {
        self.rates[channel.index()]
    }

    /// starting per-polygon steps for new genomes, None when self-adaptation is off
    pub fn initial_step_sizes(&self) -> Option<[f32; 3]> {
        self.self_adaptive
            .then(|| self.step_sizes.map(|s| s.clamp(STEP_MIN, STEP_MAX)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for &r in &self.rates {
            if !(0.0..=1.0).contains(&r) {
                return Err(ConfigError::MutationRate(r));
            }
        }
        for &s in &self.step_sizes {
            if !s.is_finite() || s < 0.0 {
                return Err(ConfigError::StepSize(s));
            }
        }
        Ok(())
    }
}

/// learning rates (global, per-step) for log-normal self-adaptation over `n` step sizes:
/// τ' = 1/√(2n), τ = 1/√(2√n)
#[inline]
pub fn learning_rates(n: usize) -> (f32, f32) {
    let n = n.max(1) as f32;
    (1.0 / (2.0 * n).sqrt(), 1.0 / (2.0 * n.sqrt()).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MutationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rate_out_of_range() {
        let cfg = MutationConfig { rates: [0.1, 1.5, 0.0], ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::MutationRate(1.5)));
    }

    #[test]
    fn test_negative_step() {
        let cfg = MutationConfig { step_sizes: [0.1, -0.5, 0.0], ..Default::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::StepSize(-0.5)));
    }

    #[test]
    fn test_initial_steps_are_clamped() {
        let cfg = MutationConfig { step_sizes: [0.0, 0.3, 5.0], self_adaptive: true, ..Default::default() };
        assert_eq!(cfg.initial_step_sizes(), Some([STEP_MIN, 0.3, STEP_MAX]));
        let fixed = MutationConfig::default();
        assert_eq!(fixed.initial_step_sizes(), None);
    }

    #[test]
    fn test_learning_rates() {
        let (global, local) = learning_rates(8);
        assert!((global - 0.25).abs() < 1e-6);
        assert!(local > global);
    }

    #[test]
    fn test_channel_indices() {
        let channels = [MutationChannel::Vertex, MutationChannel::Color, MutationChannel::Topology];
        let idx: Vec<usize> = channels.iter().map(|c| c.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
