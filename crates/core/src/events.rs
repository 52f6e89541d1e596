use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a physical kiosk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KioskId(pub i64);

/// Identifier of a product sold through the kiosks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for KioskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single purchase, tagged with the kiosk and product involved.
///
/// Timestamps are naive wall-clock times; any UTC offset in the source
/// feed has already been stripped by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: NaiveDateTime,
    pub kiosk_id: Option<KioskId>,
    pub product_id: Option<ProductId>,
}

impl Event {
    /// Creates a fully tagged event.
    #[must_use]
    pub fn new(timestamp: NaiveDateTime, kiosk_id: KioskId, product_id: ProductId) -> Self {
        Self {
            timestamp,
            kiosk_id: Some(kiosk_id),
            product_id: Some(product_id),
        }
    }

    /// Creates an event where either identifier may be missing.
    #[must_use]
    pub fn with_ids(
        timestamp: NaiveDateTime,
        kiosk_id: Option<KioskId>,
        product_id: Option<ProductId>,
    ) -> Self {
        Self {
            timestamp,
            kiosk_id,
            product_id,
        }
    }

    /// Calendar day of the event.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// The two axes over which purchases are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Kiosk,
    Product,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Kiosk => "kiosk",
            EntityKind::Product => "product",
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kiosk" | "k" => Ok(EntityKind::Kiosk),
            "product" | "p" => Ok(EntityKind::Product),
            _ => Err(anyhow!(
                "Invalid entity kind: '{}'. Valid values: kiosk, product",
                s
            )),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed reference to one kiosk or one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Kiosk(KioskId),
    Product(ProductId),
}

impl EntityRef {
    /// Builds a reference from an untyped id, e.g. one typed at a prompt.
    #[must_use]
    pub fn new(kind: EntityKind, id: i64) -> Self {
        match kind {
            EntityKind::Kiosk => EntityRef::Kiosk(KioskId(id)),
            EntityKind::Product => EntityRef::Product(ProductId(id)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Kiosk(_) => EntityKind::Kiosk,
            EntityRef::Product(_) => EntityKind::Product,
        }
    }

    #[must_use]
    pub fn raw_id(&self) -> i64 {
        match self {
            EntityRef::Kiosk(id) => id.0,
            EntityRef::Product(id) => id.0,
        }
    }
}

impl From<KioskId> for EntityRef {
    fn from(id: KioskId) -> Self {
        EntityRef::Kiosk(id)
    }
}

impl From<ProductId> for EntityRef {
    fn from(id: ProductId) -> Self {
        EntityRef::Product(id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw_id())
    }
}
