use serde::Serialize;

/// Descriptive statistics for one metric over the 6-hour window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation (divides by N)
    pub std: f64,
}

// Samples beyond this magnitude are scaled down by a power of two so the
// squared deviations stay finite
const LARGE_MAGNITUDE: f64 = 1e150;

impl MetricStats {
    /// Compute statistics over the samples. An empty slice yields all zeros.
    ///
    /// Mean and variance use Welford's running update, so repeated values
    /// average to exactly themselves and `min <= avg <= max` holds.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let scale = if min.abs().max(max.abs()) > LARGE_MAGNITUDE {
            2f64.powi(-600)
        } else {
            1.0
        };

        let mut mean = 0.0;
        let mut m2 = 0.0;
        for (i, v) in samples.iter().map(|v| v * scale).enumerate() {
            let delta = v - mean;
            mean += delta / (i + 1) as f64;
            m2 += delta * (v - mean);
        }
        let variance = (m2 / samples.len() as f64).max(0.0);

        Self {
            avg: (mean / scale).max(min).min(max),
            min,
            max,
            std: variance.sqrt() / scale,
        }
    }
}
