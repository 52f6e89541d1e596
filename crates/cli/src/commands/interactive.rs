//! Interactive prompt: ask for an entity kind and id, print its anomalies.

use anyhow::Result;
use kiosk_anomaly_analysis::AnomalyPipeline;
use kiosk_anomaly_core::{AnalysisError, EntityKind, EntityRef};
use std::io::{BufRead, Write};

use super::title;

/// Runs the prompt loop until EOF or `quit`.
pub fn run_interactive<R: BufRead, W: Write>(
    pipeline: &AnomalyPipeline,
    threshold: f64,
    mut input: R,
    mut out: W,
) -> Result<()> {
    let (start, end) = pipeline.date_range();
    writeln!(out, "Loaded purchases from {start} to {end}")?;

    loop {
        writeln!(out, "\nEnter quit or Ctrl+D to exit")?;
        writeln!(out, "Do you want to detect kiosk anomalies or product anomalies?")?;
        writeln!(out, "Enter kiosk or product:")?;
        out.flush()?;
        let Some(answer) = read_line(&mut input)? else {
            break;
        };
        if is_quit(&answer) {
            break;
        }
        let Ok(kind) = answer.parse::<EntityKind>() else {
            writeln!(out, "Please enter the correct selection.")?;
            continue;
        };

        writeln!(out, "Enter the {kind} ID you want to analyze:")?;
        out.flush()?;
        let Some(answer) = read_line(&mut input)? else {
            break;
        };
        if is_quit(&answer) {
            break;
        }
        let Some(id) = parse_id(&answer) else {
            writeln!(out, "Enter only integers for {kind} ID.")?;
            continue;
        };

        let entity = EntityRef::new(kind, id);
        match pipeline.get_anomalies(entity, threshold) {
            Ok(anomalies) => {
                writeln!(out, "{} {} Anomaly Events:", title(kind), id)?;
                for date in &anomalies {
                    writeln!(out, "{date}")?;
                }
                if anomalies.is_empty() {
                    writeln!(out, "(none)")?;
                }
            }
            Err(AnalysisError::NotFound { .. }) => {
                writeln!(out, "{} ID not found.", title(kind))?;
            }
            Err(AnalysisError::NoEntities { .. }) => {
                writeln!(out, "No {kind} IDs in the purchase log.")?;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_quit(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "quit" | "exit" | "q")
}

/// Digits only, as typed at the prompt.
fn parse_id(answer: &str) -> Option<i64> {
    if answer.is_empty() || !answer.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    answer.parse().ok()
}
