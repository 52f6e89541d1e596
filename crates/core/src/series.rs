//! Daily count series and decomposition results.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dates flagged as anomalous for one entity, ascending.
pub type AnomalySet = BTreeSet<NaiveDate>;

/// Dense, zero-filled daily purchase counts for one entity.
///
/// Day `i` of the series is `start + i days`; there are no gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCountSeries {
    start: NaiveDate,
    counts: Vec<u64>,
}

impl DailyCountSeries {
    #[must_use]
    pub fn new(start: NaiveDate, counts: Vec<u64>) -> Self {
        Self { start, counts }
    }

    /// Builds a series from integer counts starting at `start`.
    #[must_use]
    pub fn from_counts(start: NaiveDate, counts: &[u64]) -> Self {
        Self::new(start, counts.to_vec())
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day covered by the series, or `None` when empty.
    #[must_use]
    pub fn end(&self) -> Option<NaiveDate> {
        self.counts.len().checked_sub(1).map(|i| self.date_at(i))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[must_use]
    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// Total number of events across all days.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterates `(date, count)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(move |(i, &count)| (self.date_at(i), count))
    }

    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.counts.len()).map(|i| self.date_at(i)).collect()
    }

    /// Counts as floating-point observations for decomposition.
    #[must_use]
    pub fn observed(&self) -> Vec<f64> {
        self.counts.iter().map(|&c| c as f64).collect()
    }
}

/// Additive decomposition of one entity's daily series.
///
/// All vectors are aligned with `dates`. `trend` and `resid` are `None`
/// wherever the moving-average window is incomplete; `seasonal` is always
/// defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionResult {
    pub dates: Vec<NaiveDate>,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub resid: Vec<Option<f64>>,
    pub period: usize,
    pub causal: bool,
}

/// One aligned row of a decomposition, for export and display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecompositionPoint {
    pub date: NaiveDate,
    pub observed: f64,
    pub trend: Option<f64>,
    pub seasonal: f64,
    pub resid: Option<f64>,
}

impl DecompositionResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Iterates `(date, resid)` for every index where the residual is defined.
    pub fn defined_residuals(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates
            .iter()
            .zip(self.resid.iter())
            .filter_map(|(&date, r)| r.map(|r| (date, r)))
    }

    /// Number of indices with a defined residual.
    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.resid.iter().filter(|r| r.is_some()).count()
    }

    pub fn points(&self) -> impl Iterator<Item = DecompositionPoint> + '_ {
        (0..self.len()).map(move |i| DecompositionPoint {
            date: self.dates[i],
            observed: self.observed[i],
            trend: self.trend[i],
            seasonal: self.seasonal[i],
            resid: self.resid[i],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn series_dates_are_contiguous() {
        let series = DailyCountSeries::from_counts(day(2024, 2, 27), &[1, 0, 2, 0]);
        assert_eq!(
            series.dates(),
            vec![day(2024, 2, 27), day(2024, 2, 28), day(2024, 2, 29), day(2024, 3, 1)]
        );
        assert_eq!(series.end(), Some(day(2024, 3, 1)));
        assert_eq!(series.total(), 3);
    }

    #[test]
    fn empty_series_has_no_end() {
        let series = DailyCountSeries::new(day(2024, 1, 1), vec![]);
        assert!(series.is_empty());
        assert_eq!(series.end(), None);
    }

    #[test]
    fn defined_residuals_skip_leading_gaps() {
        let result = DecompositionResult {
            dates: vec![day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)],
            observed: vec![1.0, 2.0, 3.0],
            trend: vec![None, Some(1.5), Some(2.5)],
            seasonal: vec![0.0, 0.0, 0.0],
            resid: vec![None, Some(0.5), Some(0.5)],
            period: 2,
            causal: true,
        };

        let defined: Vec<_> = result.defined_residuals().collect();
        assert_eq!(defined, vec![(day(2024, 1, 2), 0.5), (day(2024, 1, 3), 0.5)]);
        assert_eq!(result.defined_count(), 2);
        assert_eq!(result.points().count(), 3);
    }
}
