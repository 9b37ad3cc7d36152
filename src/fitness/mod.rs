// fitness module organization
// each submodule handles a specific aspect of fitness computation

pub mod color;
pub mod metrics;
pub mod sad;

use serde::{Deserialize, Serialize};

pub use color::ColorSpace;
pub use metrics::MetricsSnapshot;
pub use sad::{sum_abs_diff, sum_sq_diff};

/// how per-channel differences are accumulated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMetric {
    /// mean absolute difference per channel (0..255)
    #[default]
    Absolute,
    /// mean squared difference per channel (0..65025)
    Squared,
}

/// average per-channel dissimilarity between two packed channel buffers.
/// lower is better, zero means identical.
#[inline]
pub fn channel_error(target: &[u8], current: &[u8], metric: FitnessMetric) -> f64 {
    if target.is_empty() {
        return 0.0;
    }
    let total = match metric {
        FitnessMetric::Absolute => sum_abs_diff(target, current),
        FitnessMetric::Squared => sum_sq_diff(target, current),
    };
    total as f64 / target.len() as f64
}
