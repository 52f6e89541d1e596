//! Export command: decomposition and anomaly flags as CSV.

use anyhow::Result;
use clap::Args;
use kiosk_anomaly_analysis::AnomalyPipeline;
use kiosk_anomaly_core::{EntityKind, EntityRef};
use kiosk_anomaly_data::CsvStorage;

/// Arguments for the export command.
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Entity kind: kiosk or product
    #[arg(short, long)]
    pub kind: EntityKind,

    /// Kiosk or product id
    #[arg(short, long)]
    pub id: i64,

    /// Output CSV file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Runs the export command.
pub fn run_export(pipeline: &AnomalyPipeline, threshold: f64, args: &ExportArgs) -> Result<()> {
    let entity = EntityRef::new(args.kind, args.id);
    let result = pipeline.get_decomposition(entity)?;
    let anomalies = pipeline.get_anomalies(entity, threshold)?;

    match &args.output {
        Some(path) => {
            CsvStorage::write_decomposition(path, result, &anomalies)?;
            tracing::info!(%entity, path = %path, rows = result.len(), "Exported decomposition");
        }
        None => {
            CsvStorage::write_decomposition_to(std::io::stdout().lock(), result, &anomalies)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::pipeline;
    use tempfile::TempDir;

    #[test]
    fn writes_every_day_with_flags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kiosk_1.csv");
        let args = ExportArgs {
            kind: EntityKind::Kiosk,
            id: 1,
            output: Some(path.to_string_lossy().into_owned()),
        };

        run_export(&pipeline(), 2.0, &args).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 29);
        assert!(lines[22].starts_with("2024-01-22,0,"));
        assert!(lines[22].ends_with(",true"));
        assert_eq!(lines.iter().filter(|l| l.ends_with(",true")).count(), 1);
    }

    #[test]
    fn unknown_entity_fails() {
        let args = ExportArgs {
            kind: EntityKind::Product,
            id: 404,
            output: None,
        };
        assert!(run_export(&pipeline(), 2.0, &args).is_err());
    }
}
