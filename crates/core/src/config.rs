use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
}

/// Where the purchase log lives and how its columns are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: String,
    pub timestamp_column: String,
    pub kiosk_column: String,
    pub product_column: String,
    /// Log and skip malformed rows instead of failing the load.
    pub skip_invalid_rows: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Seasonal cycle length in days.
    pub period: usize,
    /// Standard deviations below the mean residual that mark an anomaly.
    pub threshold: f64,
    /// Trailing (one-sided) trend window when true, centered otherwise.
    pub causal: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: "data/items_purchased.csv".to_string(),
            timestamp_column: "date_time".to_string(),
            kiosk_column: "kiosk_id".to_string(),
            product_column: "product_id".to_string(),
            skip_invalid_rows: false,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period: 7,
            threshold: 2.0,
            causal: true,
        }
    }
}

impl AnalysisConfig {
    /// Checks the values that can be validated without seeing the data.
    ///
    /// The upper bound on `period` depends on the series length and is
    /// enforced by the decomposer.
    ///
    /// # Errors
    ///
    /// Returns an error if `period < 2` or `threshold` is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.period < 2 {
            bail!("analysis.period must be at least 2, got {}", self.period);
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            bail!(
                "analysis.threshold must be a finite non-negative number, got {}",
                self.threshold
            );
        }
        Ok(())
    }
}
