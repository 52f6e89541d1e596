//! Scan command: one summary line per kiosk and product.

use anyhow::Result;
use clap::Args;
use kiosk_anomaly_analysis::{AnomalyPipeline, EntityReport};
use std::io::Write;

use super::{title, OutputFormat};

/// Arguments for the scan command.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Only list entities with at least one anomaly
    #[arg(long)]
    pub only_anomalous: bool,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Runs the scan command.
pub fn run_scan(pipeline: &AnomalyPipeline, threshold: f64, args: &ScanArgs) -> Result<()> {
    let mut reports = pipeline.scan(threshold)?;
    if args.only_anomalous {
        reports.retain(EntityReport::has_anomalies);
    }

    let flagged = reports.iter().filter(|r| r.has_anomalies()).count();
    tracing::info!(entities = reports.len(), flagged, "Scan complete");

    let stdout = std::io::stdout();
    write_reports(&mut stdout.lock(), &reports, args.format)
}

fn write_reports<W: Write>(out: &mut W, reports: &[EntityReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(reports)?)?;
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "{:<8} {:>10} {:>8} {:>6} {:>10} {:>10}  dates",
                "kind", "id", "events", "days", "mean", "std"
            )?;
            for report in reports {
                let dates: Vec<String> = report.anomalies.iter().map(ToString::to_string).collect();
                writeln!(
                    out,
                    "{:<8} {:>10} {:>8} {:>6} {:>10} {:>10}  {}",
                    title(report.entity.kind()),
                    report.entity.raw_id(),
                    report.total_events,
                    report.defined_days,
                    fmt_stat(report.residual_mean),
                    fmt_stat(report.residual_std),
                    dates.join(" ")
                )?;
            }
        }
    }
    Ok(())
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}
