//! CLI commands for the kiosk purchase anomaly detector.

pub mod detect;
pub mod export;
pub mod interactive;
pub mod scan;

pub use detect::{run_detect, DetectArgs};
pub use export::{run_export, ExportArgs};
pub use interactive::run_interactive;
pub use scan::{run_scan, ScanArgs};

use anyhow::{anyhow, Result};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

/// Capitalized entity kind for console messages.
pub(crate) fn title(kind: kiosk_anomaly_core::EntityKind) -> &'static str {
    match kind {
        kiosk_anomaly_core::EntityKind::Kiosk => "Kiosk",
        kiosk_anomaly_core::EntityKind::Product => "Product",
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
