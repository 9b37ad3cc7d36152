//─────────────────────────────────────────────────────────────────────────────
// resolution-invariant metrics (error per channel, PSNR) for reporting
//─────────────────────────────────────────────────────────────────────────────

use super::FitnessMetric;

/// PSNR (peak signal-to-noise ratio) in decibels.
/// - `mse`: mean squared error (or pseudo-MSE from a mean absolute error)
/// - `peak`: 255.0 for 8-bit images
/// higher PSNR = better quality. typical ranges:
///   - 30 dB = acceptable
///   - 35 dB = good
///   - 40+ dB = very good
#[inline]
pub fn psnr_from_mse(mse: f64, peak: f64) -> f64 {
    let mse = mse.max(1e-12);
    10.0 * ((peak * peak) / mse).log10()
}

/// snapshot of reporting metrics derived from a genome's fitness value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// typical error per pixel per channel in intensity units (mean abs or RMS)
    pub error_per_channel: f64,
    pub psnr: f64,
}

impl MetricsSnapshot {
    /// fitness is already averaged over pixels and channels.
    /// for the absolute metric we keep the L1-as-MSE convention for PSNR.
    #[inline]
    pub fn from_fitness(fitness: f64, metric: FitnessMetric) -> Self {
        match metric {
            FitnessMetric::Absolute => Self {
                error_per_channel: fitness,
                psnr: psnr_from_mse(fitness, 255.0),
            },
            FitnessMetric::Squared => Self {
                error_per_channel: fitness.max(0.0).sqrt(),
                psnr: psnr_from_mse(fitness, 255.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psnr_perfect_match_is_capped() {
        // mse clamps at 1e-12 instead of dividing by zero
        let p = psnr_from_mse(0.0, 255.0);
        assert!(p.is_finite());
        assert!(p > 100.0);
    }

    #[test]
    fn test_psnr_known_value() {
        // mse = 255² → 0 dB
        assert!((psnr_from_mse(255.0 * 255.0, 255.0)).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_from_fitness() {
        let m = MetricsSnapshot::from_fitness(2.0, FitnessMetric::Absolute);
        assert_eq!(m.error_per_channel, 2.0);
        assert!(m.psnr > 40.0);
    }

    #[test]
    fn test_snapshot_squared_reports_rms() {
        let m = MetricsSnapshot::from_fitness(16.0, FitnessMetric::Squared);
        assert_eq!(m.error_per_channel, 4.0);
    }
}
