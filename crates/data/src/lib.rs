//! Input and output for the kiosk purchase anomaly detector.
//!
//! This crate provides:
//! - A CSV loader that normalizes timestamps and ids into [`Event`]s
//! - CSV export of decomposition results and anomaly flags
//!
//! [`Event`]: kiosk_anomaly_core::Event

pub mod csv_storage;
pub mod loader;
pub mod timestamp;

pub use csv_storage::CsvStorage;
pub use loader::{EventFeed, EventLoader, LoadError};
pub use timestamp::parse_naive_timestamp;
