//! Classical additive seasonal decomposition.
//!
//! Models a daily series as `observed = trend + seasonal + resid`:
//! the trend is a moving average of one full period, the seasonal part is
//! the mean detrended value at each position of the cycle (centered to sum
//! to zero), and the residual is whatever remains.

use kiosk_anomaly_core::{AnalysisError, DailyCountSeries, DecompositionResult};
use tracing::debug;

/// Decomposes a daily count series into trend, seasonal, and residual parts.
///
/// # Arguments
/// * `series` - Dense daily counts for one entity
/// * `period` - Cycle length in days (7 for weekly seasonality)
/// * `causal` - Use a trailing window so the trend never sees future days
///
/// # Errors
///
/// Returns `InvalidPeriod` unless `2 <= period <= series.len() / 2`.
pub fn decompose(
    series: &DailyCountSeries,
    period: usize,
    causal: bool,
) -> Result<DecompositionResult, AnalysisError> {
    check_period(period, series.len())?;

    let observed = series.observed();
    let trend = moving_average(&observed, period, causal);
    let seasonal = seasonal_component(&observed, &trend, period);

    let resid = observed
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((o, t), s)| t.map(|t| o - t - s))
        .collect();

    debug!(
        len = series.len(),
        period,
        causal,
        start = %series.start(),
        "Decomposed daily series"
    );

    Ok(DecompositionResult {
        dates: series.dates(),
        observed,
        trend,
        seasonal,
        resid,
        period,
        causal,
    })
}

/// Validates a seasonal period against a series length.
///
/// Two full cycles are needed so every cycle position sees at least one
/// detrended value.
pub(crate) fn check_period(period: usize, len: usize) -> Result<(), AnalysisError> {
    if period < 2 || period > len / 2 {
        return Err(AnalysisError::InvalidPeriod { period, len });
    }
    Ok(())
}

/// Moving average of `window` observations.
///
/// With `causal`, `trend[i]` averages `observed[i + 1 - window ..= i]` and the
/// first `window - 1` entries are `None`. Otherwise the window is centered;
/// an even window uses the classical 2x`window` weighting
/// `[0.5, 1, ..., 1, 0.5] / window`, and `window / 2` entries are `None` at
/// each end.
///
/// # Examples
/// ```
/// use kiosk_anomaly_analysis::moving_average;
///
/// let trend = moving_average(&[1.0, 2.0, 3.0, 4.0], 2, true);
/// assert_eq!(trend, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
/// ```
#[must_use]
pub fn moving_average(observed: &[f64], window: usize, causal: bool) -> Vec<Option<f64>> {
    let n = observed.len();
    let mut trend = vec![None; n];
    if window == 0 {
        return trend;
    }

    if causal {
        if window > n {
            return trend;
        }
        let w = window as f64;
        for i in window - 1..n {
            let sum: f64 = observed[i + 1 - window..=i].iter().sum();
            trend[i] = Some(sum / w);
        }
        return trend;
    }

    let weights = centered_weights(window);
    let half = weights.len() / 2;
    if weights.len() > n {
        return trend;
    }
    for i in half..n - half {
        let value = weights
            .iter()
            .zip(&observed[i - half..=i + half])
            .map(|(w, x)| w * x)
            .sum();
        trend[i] = Some(value);
    }
    trend
}

fn centered_weights(window: usize) -> Vec<f64> {
    let w = window as f64;
    if window % 2 == 1 {
        vec![1.0 / w; window]
    } else {
        let mut weights = vec![1.0 / w; window + 1];
        weights[0] = 0.5 / w;
        weights[window] = 0.5 / w;
        weights
    }
}

/// Per-position mean of the detrended series, centered and broadcast back
/// to full length.
fn seasonal_component(observed: &[f64], trend: &[Option<f64>], period: usize) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, (o, t)) in observed.iter().zip(trend).enumerate() {
        if let Some(t) = t {
            sums[i % period] += o - t;
            counts[i % period] += 1;
        }
    }

    let mut averages: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c == 0 { 0.0 } else { s / c as f64 })
        .collect();

    let center = averages.iter().sum::<f64>() / period as f64;
    for avg in &mut averages {
        *avg -= center;
    }

    (0..observed.len()).map(|i| averages[i % period]).collect()
}
