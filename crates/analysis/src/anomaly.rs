//! Residual-based anomaly detection.
//!
//! A day is anomalous when its residual falls at least `threshold` sample
//! standard deviations below the mean residual. Only low-side deviations are
//! flagged: the signal of interest is a kiosk or product selling less than
//! its trend and weekly pattern predict.

use kiosk_anomaly_core::{AnalysisError, AnomalySet, DecompositionResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative tolerance below which a residual spread is treated as zero.
///
/// Residuals of a perfectly explained series are constant up to rounding,
/// and that rounding grows with the counts: roughly `1e-16` of the largest
/// observation. The cutoff is this fraction of the largest absolute
/// observation, and never less than this value itself.
pub const ZERO_STD_TOLERANCE: f64 = 1e-9;

/// Summary statistics over the defined residuals of one decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualStats {
    pub mean: f64,
    /// Sample standard deviation (divides by `n - 1`)
    pub std_dev: f64,
    pub count: usize,
    /// Largest absolute observation, used to scale the zero-spread check
    pub scale: f64,
}

impl ResidualStats {
    /// Residual value at or below which a day is flagged.
    #[must_use]
    pub fn cutoff(&self, threshold: f64) -> f64 {
        self.mean - threshold * self.std_dev
    }

    /// True when the spread is indistinguishable from rounding noise at the
    /// magnitude of the observations.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.std_dev <= ZERO_STD_TOLERANCE * self.scale.max(1.0)
    }
}

/// Mean and sample standard deviation of the defined residuals.
///
/// Returns `None` when fewer than two residuals are defined.
#[must_use]
pub fn residual_stats(result: &DecompositionResult) -> Option<ResidualStats> {
    let values: Vec<f64> = result.resid.iter().flatten().copied().collect();
    let count = values.len();
    if count < 2 {
        return None;
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
    let scale = result.observed.iter().fold(0.0_f64, |acc, o| acc.max(o.abs()));

    Some(ResidualStats {
        mean,
        std_dev: variance.sqrt(),
        count,
        scale,
    })
}

/// Flags days whose residual is at least `threshold` standard deviations
/// below the mean residual.
///
/// Returns an empty set when the residual spread is zero or there are too
/// few defined residuals to estimate it.
///
/// # Errors
///
/// Returns `InvalidThreshold` if `threshold` is negative or not finite.
pub fn detect(result: &DecompositionResult, threshold: f64) -> Result<AnomalySet, AnalysisError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(AnalysisError::InvalidThreshold { threshold });
    }

    let Some(stats) = residual_stats(result) else {
        return Ok(AnomalySet::new());
    };
    if stats.is_degenerate() {
        debug!(mean = stats.mean, "Constant residual, no anomalies");
        return Ok(AnomalySet::new());
    }

    let cutoff = stats.cutoff(threshold);
    let anomalies: AnomalySet = result
        .defined_residuals()
        .filter(|&(_, r)| r <= cutoff)
        .map(|(date, _)| date)
        .collect();

    debug!(
        mean = stats.mean,
        std_dev = stats.std_dev,
        cutoff,
        flagged = anomalies.len(),
        "Scanned residuals"
    );

    Ok(anomalies)
}
