//! Batch orchestration: aggregate once, decompose every entity, answer queries.

use crate::aggregator::{aggregate, DailyAggregate, EntitySeries};
use crate::anomaly::{detect, residual_stats};
use crate::decomposition::{check_period, decompose};
use chrono::NaiveDate;
use kiosk_anomaly_core::{
    AnalysisConfig, AnalysisError, AnomalySet, DailyCountSeries, DecompositionResult, EntityKind,
    EntityRef, Event, KioskId, ProductId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::info;

/// Per-entity summary produced by [`AnomalyPipeline::scan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity: EntityRef,
    /// Events attributed to this entity over the whole range
    pub total_events: u64,
    /// Days with a defined residual
    pub defined_days: usize,
    pub residual_mean: Option<f64>,
    pub residual_std: Option<f64>,
    pub anomalies: Vec<NaiveDate>,
}

impl EntityReport {
    #[must_use]
    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

/// Immutable results of one batch run over a static event snapshot.
#[derive(Debug, Clone)]
pub struct AnomalyPipeline {
    aggregate: DailyAggregate,
    kiosks: HashMap<KioskId, DecompositionResult>,
    products: HashMap<ProductId, DecompositionResult>,
    period: usize,
    causal: bool,
}

impl AnomalyPipeline {
    /// Aggregates `events` and decomposes every kiosk and product series.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` / `NoEntities` from aggregation
    /// - `InvalidPeriod` if `config.period` does not fit the observed date range
    pub fn run(events: &[Event], config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let aggregate = aggregate(events)?;
        check_period(config.period, aggregate.days())?;

        let kiosks = decompose_kind(aggregate.kiosks().ok(), config)?;
        let products = decompose_kind(aggregate.products().ok(), config)?;

        info!(
            kiosks = kiosks.len(),
            products = products.len(),
            period = config.period,
            causal = config.causal,
            "Decomposed all entity series"
        );

        Ok(Self {
            aggregate,
            kiosks,
            products,
            period: config.period,
            causal: config.causal,
        })
    }

    #[must_use]
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        self.aggregate.date_range()
    }

    #[must_use]
    pub fn period(&self) -> usize {
        self.period
    }

    #[must_use]
    pub fn causal(&self) -> bool {
        self.causal
    }

    /// Daily counts behind a decomposition.
    ///
    /// # Errors
    ///
    /// Returns `NoEntities` or `NotFound` as for [`Self::get_decomposition`].
    pub fn series(&self, entity: EntityRef) -> Result<&DailyCountSeries, AnalysisError> {
        self.aggregate.series(entity)
    }

    /// Decomposition for one kiosk or product.
    ///
    /// # Errors
    ///
    /// Returns `NoEntities` if the input held no ids of that kind, or
    /// `NotFound` if this id was never seen.
    pub fn get_decomposition(
        &self,
        entity: EntityRef,
    ) -> Result<&DecompositionResult, AnalysisError> {
        let found = match entity {
            EntityRef::Kiosk(id) => lookup(&self.kiosks, EntityKind::Kiosk)?.get(&id),
            EntityRef::Product(id) => lookup(&self.products, EntityKind::Product)?.get(&id),
        };
        found.ok_or(AnalysisError::NotFound { entity })
    }

    /// Anomalous dates for one kiosk or product.
    ///
    /// # Errors
    ///
    /// Returns the lookup errors of [`Self::get_decomposition`], or
    /// `InvalidThreshold`.
    pub fn get_anomalies(
        &self,
        entity: EntityRef,
        threshold: f64,
    ) -> Result<AnomalySet, AnalysisError> {
        detect(self.get_decomposition(entity)?, threshold)
    }

    /// All entities of one kind, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns `NoEntities` if the input held no ids of that kind.
    pub fn entities(&self, kind: EntityKind) -> Result<Vec<EntityRef>, AnalysisError> {
        let mut entities: Vec<EntityRef> = match kind {
            EntityKind::Kiosk => lookup(&self.kiosks, kind)?
                .keys()
                .map(|&id| id.into())
                .collect(),
            EntityKind::Product => lookup(&self.products, kind)?
                .keys()
                .map(|&id| id.into())
                .collect(),
        };
        entities.sort();
        Ok(entities)
    }

    /// Runs detection over every entity of both kinds, kiosks first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` if `threshold` is negative or not finite.
    pub fn scan(&self, threshold: f64) -> Result<Vec<EntityReport>, AnalysisError> {
        let mut reports = Vec::with_capacity(self.kiosks.len() + self.products.len());
        for kind in [EntityKind::Kiosk, EntityKind::Product] {
            let Ok(entities) = self.entities(kind) else {
                continue;
            };
            for entity in entities {
                reports.push(self.report(entity, threshold)?);
            }
        }
        Ok(reports)
    }

    fn report(&self, entity: EntityRef, threshold: f64) -> Result<EntityReport, AnalysisError> {
        let result = self.get_decomposition(entity)?;
        let stats = residual_stats(result);
        Ok(EntityReport {
            entity,
            total_events: self.series(entity)?.total(),
            defined_days: result.defined_count(),
            residual_mean: stats.map(|s| s.mean),
            residual_std: stats.map(|s| s.std_dev),
            anomalies: detect(result, threshold)?.into_iter().collect(),
        })
    }
}

fn decompose_kind<K>(
    series: Option<&EntitySeries<K>>,
    config: &AnalysisConfig,
) -> Result<HashMap<K, DecompositionResult>, AnalysisError>
where
    K: Copy + Eq + Hash,
{
    series
        .into_iter()
        .flatten()
        .map(|(&id, s)| Ok((id, decompose(s, config.period, config.causal)?)))
        .collect()
}

fn lookup<K>(
    results: &HashMap<K, DecompositionResult>,
    kind: EntityKind,
) -> Result<&HashMap<K, DecompositionResult>, AnalysisError> {
    if results.is_empty() {
        Err(AnalysisError::NoEntities { kind })
    } else {
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    }

    fn at(offset: i64, hour: u32) -> NaiveDateTime {
        day(offset).and_hms_opt(hour, 0, 0).unwrap()
    }

    /// Expands daily counts into that many events per day for one kiosk/product pair.
    fn events_for(kiosk: i64, product: i64, counts: &[u64]) -> Vec<Event> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(d, &n)| {
                (0..n).map(move |k| {
                    Event::new(at(d as i64, 8 + k as u32 % 12), KioskId(kiosk), ProductId(product))
                })
            })
            .collect()
    }

    fn flat_with_dip() -> Vec<u64> {
        let mut counts = vec![10; 28];
        counts[21] = 0;
        counts
    }

    fn weekly() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    // ============================================
    // Construction
    // ============================================

    #[test]
    fn decomposes_every_entity_of_both_kinds() {
        let mut events = events_for(1, 100, &flat_with_dip());
        events.extend(events_for(2, 200, &[3; 28]));

        let pipeline = AnomalyPipeline::run(&events, &weekly()).unwrap();

        assert_eq!(
            pipeline.entities(EntityKind::Kiosk).unwrap(),
            vec![EntityRef::Kiosk(KioskId(1)), EntityRef::Kiosk(KioskId(2))]
        );
        assert_eq!(
            pipeline.entities(EntityKind::Product).unwrap(),
            vec![
                EntityRef::Product(ProductId(100)),
                EntityRef::Product(ProductId(200))
            ]
        );
        assert_eq!(pipeline.date_range(), (day(0), day(27)));
        assert_eq!(pipeline.period(), 7);
        assert!(pipeline.causal());

        let result = pipeline.get_decomposition(KioskId(2).into()).unwrap();
        assert_eq!(result.len(), 28);
    }

    #[test]
    fn period_too_long_for_range_fails_whole_run() {
        let events = events_for(1, 100, &[1; 10]);
        let err = AnomalyPipeline::run(&events, &weekly()).unwrap_err();
        assert_eq!(err, AnalysisError::InvalidPeriod { period: 7, len: 10 });
    }

    #[test]
    fn single_event_is_empty_input() {
        let events = vec![Event::new(at(0, 9), KioskId(1), ProductId(1))];
        assert_eq!(
            AnomalyPipeline::run(&events, &weekly()).unwrap_err(),
            AnalysisError::EmptyInput { count: 1 }
        );
    }

    // ============================================
    // Queries
    // ============================================

    #[test]
    fn anomalies_for_kiosk_and_product_with_same_history() {
        let events = events_for(1, 100, &flat_with_dip());
        let pipeline = AnomalyPipeline::run(&events, &weekly()).unwrap();

        let expected: AnomalySet = [day(21)].into_iter().collect();
        assert_eq!(
            pipeline.get_anomalies(KioskId(1).into(), 2.0).unwrap(),
            expected
        );
        assert_eq!(
            pipeline.get_anomalies(ProductId(100).into(), 2.0).unwrap(),
            expected
        );
    }

    #[test]
    fn unknown_entity_is_not_found() {
        let events = events_for(1, 100, &flat_with_dip());
        let pipeline = AnomalyPipeline::run(&events, &weekly()).unwrap();

        let missing = EntityRef::Kiosk(KioskId(100));
        assert_eq!(
            pipeline.get_decomposition(missing).unwrap_err(),
            AnalysisError::NotFound { entity: missing }
        );
        assert!(pipeline.get_anomalies(missing, 2.0).unwrap_err().is_not_found());
    }

    #[test]
    fn kind_without_ids_reports_no_entities() {
        let events: Vec<Event> = (0..14)
            .map(|d| Event::with_ids(at(d, 12), Some(KioskId(5)), None))
            .collect();
        let pipeline = AnomalyPipeline::run(&events, &weekly()).unwrap();

        assert!(pipeline.get_decomposition(KioskId(5).into()).is_ok());
        assert_eq!(
            pipeline
                .get_decomposition(ProductId(5).into())
                .unwrap_err(),
            AnalysisError::NoEntities {
                kind: EntityKind::Product
            }
        );
        assert!(pipeline.entities(EntityKind::Product).is_err());
    }

    #[test]
    fn series_exposes_daily_counts() {
        let events = events_for(3, 30, &flat_with_dip());
        let pipeline = AnomalyPipeline::run(&events, &weekly()).unwrap();

        let series = pipeline.series(KioskId(3).into()).unwrap();
        assert_eq!(series.counts(), flat_with_dip().as_slice());
        assert_eq!(series.total(), 270);
    }

    // ============================================
    // Scan
    // ============================================

    #[test]
    fn scan_reports_every_entity() {
        let mut events = events_for(1, 100, &flat_with_dip());
        events.extend(events_for(2, 200, &[3; 28]));
        let pipeline = AnomalyPipeline::run(&events, &weekly()).unwrap();

        let reports = pipeline.scan(2.0).unwrap();
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].entity, EntityRef::Kiosk(KioskId(1)));
        assert_eq!(reports[0].anomalies, vec![day(21)]);
        assert_eq!(reports[0].total_events, 270);
        assert_eq!(reports[0].defined_days, 22);
        assert!(reports[0].has_anomalies());

        // Constant series: no spread, no anomalies.
        assert_eq!(reports[1].entity, EntityRef::Kiosk(KioskId(2)));
        assert!(!reports[1].has_anomalies());
        assert_eq!(reports[2].entity, EntityRef::Product(ProductId(100)));
    }

    #[test]
    fn scan_rejects_invalid_threshold() {
        let events = events_for(1, 100, &flat_with_dip());
        let pipeline = AnomalyPipeline::run(&events, &weekly()).unwrap();
        assert!(matches!(
            pipeline.scan(-1.0),
            Err(AnalysisError::InvalidThreshold { .. })
        ));
    }
}
