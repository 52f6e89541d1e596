//! CSV loader for the raw purchase log.
//!
//! Expected layout is a headered CSV with at least a timestamp, a kiosk id,
//! and a product id column (names configurable via [`DataConfig`]). Extra
//! columns are ignored.

use chrono::NaiveDateTime;
use csv::StringRecord;
use kiosk_anomaly_core::{DataConfig, Event, KioskId, ProductId};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::timestamp::parse_naive_timestamp;

/// Errors from loading the purchase log.
#[derive(Error, Debug)]
pub enum LoadError {
    /// IO error opening the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configured column is absent from the header row.
    #[error("missing column '{0}' in header")]
    MissingColumn(String),

    #[error("line {line}: invalid timestamp '{value}'")]
    InvalidTimestamp { line: u64, value: String },

    #[error("line {line}: invalid {column} '{value}'")]
    InvalidId {
        line: u64,
        column: String,
        value: String,
    },
}

impl LoadError {
    /// Returns true for errors confined to a single row.
    #[must_use]
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTimestamp { .. } | Self::InvalidId { .. } | Self::Csv(_)
        )
    }
}

/// Events read from the purchase log, sorted by timestamp.
#[derive(Debug, Clone, Default)]
pub struct EventFeed {
    events: Vec<Event>,
    skipped: usize,
}

impl EventFeed {
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Rows dropped because `skip_invalid_rows` was set.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Earliest and latest event timestamps.
    #[must_use]
    pub fn time_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.events.first()?.timestamp, self.events.last()?.timestamp))
    }
}

struct Columns {
    timestamp: usize,
    kiosk: usize,
    product: usize,
}

impl Columns {
    fn locate(headers: &StringRecord, config: &DataConfig) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            timestamp: find(&config.timestamp_column)?,
            kiosk: find(&config.kiosk_column)?,
            product: find(&config.product_column)?,
        })
    }
}

pub struct EventLoader;

impl EventLoader {
    /// Loads events from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, a configured column is
    /// missing, or a row is malformed and `skip_invalid_rows` is off.
    pub fn from_path(path: impl AsRef<Path>, config: &DataConfig) -> Result<EventFeed, LoadError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let feed = Self::from_reader(file, config)?;
        info!(
            path = %path.display(),
            events = feed.len(),
            skipped = feed.skipped(),
            "Loaded purchase log"
        );
        Ok(feed)
    }

    /// Loads events from any CSV source.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_path`], minus file opening.
    pub fn from_reader<R: Read>(reader: R, config: &DataConfig) -> Result<EventFeed, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let columns = Columns::locate(reader.headers()?, config)?;

        let mut feed = EventFeed::default();
        for result in reader.records() {
            let parsed = result
                .map_err(LoadError::from)
                .and_then(|record| parse_record(&record, &columns, config));
            match parsed {
                Ok(event) => feed.events.push(event),
                Err(err) if config.skip_invalid_rows && err.is_row_error() => {
                    warn!(error = %err, "Skipping invalid row");
                    feed.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        feed.events.sort_by_key(|e| e.timestamp);
        Ok(feed)
    }
}

fn parse_record(
    record: &StringRecord,
    columns: &Columns,
    config: &DataConfig,
) -> Result<Event, LoadError> {
    let line = record.position().map_or(0, csv::Position::line);
    let field = |i: usize| record.get(i).unwrap_or("");

    let raw_ts = field(columns.timestamp);
    let timestamp = parse_naive_timestamp(raw_ts).ok_or_else(|| LoadError::InvalidTimestamp {
        line,
        value: raw_ts.to_string(),
    })?;

    let kiosk_id = parse_id(field(columns.kiosk), line, &config.kiosk_column)?.map(KioskId);
    let product_id = parse_id(field(columns.product), line, &config.product_column)?.map(ProductId);

    Ok(Event::with_ids(timestamp, kiosk_id, product_id))
}

/// Exclusive upper bound of `i64` as a float (2^63).
const ID_FLOAT_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Parses a non-negative integer id. Blank cells are `None`; integral
/// floats such as `12.0` are accepted since spreadsheet exports produce them.
/// Floats outside the `i64` range are rejected rather than saturated.
fn parse_id(raw: &str, line: u64, column: &str) -> Result<Option<i64>, LoadError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let invalid = || LoadError::InvalidId {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    };

    let id = match raw.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            let float: f64 = raw.parse().map_err(|_| invalid())?;
            if !float.is_finite() || float.fract() != 0.0 || float.abs() >= ID_FLOAT_LIMIT {
                return Err(invalid());
            }
            float as i64
        }
    };
    if id < 0 {
        return Err(invalid());
    }
    Ok(Some(id))
}
