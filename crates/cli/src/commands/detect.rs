//! Detect command: anomalous dates for a single kiosk or product.

use anyhow::Result;
use clap::Args;
use kiosk_anomaly_analysis::AnomalyPipeline;
use kiosk_anomaly_core::{AnalysisError, EntityKind, EntityRef};
use std::io::Write;

use super::{title, OutputFormat};

/// Arguments for the detect command.
#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    /// Entity kind: kiosk or product
    #[arg(short, long)]
    pub kind: EntityKind,

    /// Kiosk or product id
    #[arg(short, long)]
    pub id: i64,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Runs the detect command.
pub fn run_detect(pipeline: &AnomalyPipeline, threshold: f64, args: &DetectArgs) -> Result<()> {
    let entity = EntityRef::new(args.kind, args.id);
    let stdout = std::io::stdout();
    write_detect(&mut stdout.lock(), pipeline, entity, threshold, args.format)
}

fn write_detect<W: Write>(
    out: &mut W,
    pipeline: &AnomalyPipeline,
    entity: EntityRef,
    threshold: f64,
    format: OutputFormat,
) -> Result<()> {
    let anomalies = match pipeline.get_anomalies(entity, threshold) {
        Ok(anomalies) => anomalies,
        Err(AnalysisError::NotFound { .. }) => {
            anyhow::bail!("{} ID {} not found.", title(entity.kind()), entity.raw_id())
        }
        Err(err) => return Err(err.into()),
    };
    tracing::info!(%entity, count = anomalies.len(), "Detected anomalies");

    match format {
        OutputFormat::Text => {
            writeln!(out, "{} {} Anomaly Events:", title(entity.kind()), entity.raw_id())?;
            for date in &anomalies {
                writeln!(out, "{date}")?;
            }
        }
        OutputFormat::Json => {
            let body = serde_json::json!({
                "entity": entity,
                "threshold": threshold,
                "anomalies": anomalies,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
        }
    }
    Ok(())
}
