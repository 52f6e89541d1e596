//! Config resolution and pipeline construction shared by every command.

use anyhow::{Context, Result};
use kiosk_anomaly_analysis::AnomalyPipeline;
use kiosk_anomaly_core::{AppConfig, ConfigLoader};
use kiosk_anomaly_data::EventLoader;

/// Command-line values that take precedence over file and env config.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub data: Option<String>,
    pub period: Option<usize>,
    pub threshold: Option<f64>,
    pub two_sided: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.data {
            config.data.path = path.clone();
        }
        if let Some(period) = self.period {
            config.analysis.period = period;
        }
        if let Some(threshold) = self.threshold {
            config.analysis.threshold = threshold;
        }
        if self.two_sided {
            config.analysis.causal = false;
        }
    }
}

pub fn load_config(path: &str, overrides: &Overrides) -> Result<AppConfig> {
    let mut config = ConfigLoader::load_from(path)
        .with_context(|| format!("Failed to load configuration from {path}"))?;
    overrides.apply(&mut config);
    config.analysis.validate()?;
    Ok(config)
}

pub fn build_pipeline(config: &AppConfig) -> Result<AnomalyPipeline> {
    tracing::info!("Loading purchase log from {}", config.data.path);
    let feed = EventLoader::from_path(&config.data.path, &config.data)
        .with_context(|| format!("Failed to load purchase log {}", config.data.path))?;

    if let Some((start, end)) = feed.time_span() {
        tracing::info!("Processing samples from {} to {}", start, end);
    }

    let pipeline = AnomalyPipeline::run(feed.events(), &config.analysis)
        .context("Failed to analyze purchase log")?;
    Ok(pipeline)
}
