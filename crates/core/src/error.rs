//! Error taxonomy shared by the aggregation, decomposition, and detection stages.

use crate::events::{EntityKind, EntityRef};
use thiserror::Error;

/// Errors raised by the analysis pipeline.
///
/// None of these are retried; each one aborts the computation for the
/// entity (or the whole batch) that raised it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Fewer than two events were supplied.
    #[error("need at least two events, got {count}")]
    EmptyInput { count: usize },

    /// No identifiers of the requested kind were present in the input.
    #[error("no {kind} identifiers found in input")]
    NoEntities { kind: EntityKind },

    /// Seasonal period outside `2..=len / 2`.
    #[error("invalid period {period} for series of length {len}")]
    InvalidPeriod { period: usize, len: usize },

    /// Query for an entity that was never aggregated.
    #[error("{entity} not found")]
    NotFound { entity: EntityRef },

    /// Detection threshold is negative or not finite.
    #[error("invalid threshold {threshold}")]
    InvalidThreshold { threshold: f64 },
}

impl AnalysisError {
    /// Returns true if this error refers to a missing entity.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
