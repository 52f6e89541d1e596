//! Daily aggregation of raw purchase events into dense per-entity series.

use chrono::NaiveDate;
use kiosk_anomaly_core::{
    AnalysisError, DailyCountSeries, EntityKind, EntityRef, Event, KioskId, ProductId,
};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::info;

/// Daily count series keyed by entity identifier.
pub type EntitySeries<K> = HashMap<K, DailyCountSeries>;

/// Output of [`aggregate`]: one zero-filled series per kiosk and per product,
/// all spanning the same global date range.
#[derive(Debug, Clone)]
pub struct DailyAggregate {
    start: NaiveDate,
    end: NaiveDate,
    kiosks: EntitySeries<KioskId>,
    products: EntitySeries<ProductId>,
}

impl DailyAggregate {
    /// First and last observed day, inclusive.
    #[must_use]
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    /// Number of days every series spans.
    #[must_use]
    pub fn days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Kiosk series.
    ///
    /// # Errors
    ///
    /// Returns `NoEntities` if no event carried a kiosk id.
    pub fn kiosks(&self) -> Result<&EntitySeries<KioskId>, AnalysisError> {
        non_empty(&self.kiosks, EntityKind::Kiosk)
    }

    /// Product series.
    ///
    /// # Errors
    ///
    /// Returns `NoEntities` if no event carried a product id.
    pub fn products(&self) -> Result<&EntitySeries<ProductId>, AnalysisError> {
        non_empty(&self.products, EntityKind::Product)
    }

    /// Series for a single entity.
    ///
    /// # Errors
    ///
    /// Returns `NoEntities` if the entity's kind is absent from the input,
    /// or `NotFound` if this particular id is.
    pub fn series(&self, entity: EntityRef) -> Result<&DailyCountSeries, AnalysisError> {
        let found = match entity {
            EntityRef::Kiosk(id) => self.kiosks()?.get(&id),
            EntityRef::Product(id) => self.products()?.get(&id),
        };
        found.ok_or(AnalysisError::NotFound { entity })
    }
}

fn non_empty<K>(
    series: &EntitySeries<K>,
    kind: EntityKind,
) -> Result<&EntitySeries<K>, AnalysisError> {
    if series.is_empty() {
        Err(AnalysisError::NoEntities { kind })
    } else {
        Ok(series)
    }
}

/// Aggregates events into daily counts per kiosk and per product.
///
/// Every series covers each calendar day between the earliest and latest
/// event (inclusive); days without purchases count zero.
///
/// # Errors
///
/// - `EmptyInput` if fewer than two events are supplied
/// - `NoEntities` if no event carries either kind of identifier. The error
///   then names `EntityKind::Kiosk`, the first kind checked. When only one
///   kind is missing, aggregation succeeds and the error surfaces when that
///   kind is accessed.
pub fn aggregate(events: &[Event]) -> Result<DailyAggregate, AnalysisError> {
    if events.len() < 2 {
        return Err(AnalysisError::EmptyInput {
            count: events.len(),
        });
    }

    let first = events[0].date();
    let (start, end) = events
        .iter()
        .map(Event::date)
        .fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    let days = (end - start).num_days() as usize + 1;

    let kiosks = tally(events, start, days, |e| e.kiosk_id);
    let products = tally(events, start, days, |e| e.product_id);

    // Kiosks are reported first when both kinds are absent.
    if kiosks.is_empty() && products.is_empty() {
        return Err(AnalysisError::NoEntities {
            kind: EntityKind::Kiosk,
        });
    }

    info!(
        %start,
        %end,
        days,
        kiosks = kiosks.len(),
        products = products.len(),
        "Aggregated {} events into daily counts",
        events.len()
    );

    Ok(DailyAggregate {
        start,
        end,
        kiosks,
        products,
    })
}

fn tally<K, F>(events: &[Event], start: NaiveDate, days: usize, key: F) -> EntitySeries<K>
where
    K: Copy + Eq + Hash,
    F: Fn(&Event) -> Option<K>,
{
    let mut counts: HashMap<K, Vec<u64>> = HashMap::new();
    for event in events {
        if let Some(id) = key(event) {
            let offset = (event.date() - start).num_days() as usize;
            counts.entry(id).or_insert_with(|| vec![0; days])[offset] += 1;
        }
    }

    counts
        .into_iter()
        .map(|(id, counts)| (id, DailyCountSeries::new(start, counts)))
        .collect()
}
