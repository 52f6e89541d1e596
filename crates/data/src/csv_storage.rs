use anyhow::{Context, Result};
use csv::Writer;
use kiosk_anomaly_core::{AnomalySet, DecompositionResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const DECOMPOSITION_HEADER: [&str; 6] =
    ["date", "observed", "trend", "seasonal", "resid", "anomaly"];

pub struct CsvStorage;

impl CsvStorage {
    /// Writes a decomposition and its anomaly flags to a CSV file.
    ///
    /// Format: date,observed,trend,seasonal,resid,anomaly
    ///
    /// Undefined trend/residual values are written as empty cells.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_decomposition(
        path: impl AsRef<Path>,
        result: &DecompositionResult,
        anomalies: &AnomalySet,
    ) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        Self::write_decomposition_to(file, result, anomalies)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))
    }

    /// Writes a decomposition to any writer, e.g. stdout.
    ///
    /// # Errors
    /// Returns error if writing fails
    pub fn write_decomposition_to<W: Write>(
        writer: W,
        result: &DecompositionResult,
        anomalies: &AnomalySet,
    ) -> Result<()> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(DECOMPOSITION_HEADER)?;

        for point in result.points() {
            writer.write_record(&[
                point.date.format("%Y-%m-%d").to_string(),
                point.observed.to_string(),
                optional(point.trend),
                point.seasonal.to_string(),
                optional(point.resid),
                anomalies.contains(&point.date).to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
