//! Analytical core of the kiosk purchase anomaly detector.
//!
//! Raw events flow through three stages:
//! - [`aggregate`] turns events into dense per-entity daily counts
//! - [`decompose`] splits each series into trend, seasonal, and residual parts
//! - [`detect`] flags days whose residual sits far below the mean
//!
//! [`AnomalyPipeline`] wires the stages together for a single batch run.

mod aggregator;
mod anomaly;
mod decomposition;
mod pipeline;

pub use aggregator::{aggregate, DailyAggregate, EntitySeries};
pub use anomaly::{detect, residual_stats, ResidualStats, ZERO_STD_TOLERANCE};
pub use decomposition::{decompose, moving_average};
pub use pipeline::{AnomalyPipeline, EntityReport};
pub use kiosk_anomaly_core::AnalysisError;
