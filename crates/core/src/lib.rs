pub mod config;
pub mod config_loader;
pub mod error;
pub mod events;
pub mod series;

pub use config::{AnalysisConfig, AppConfig, DataConfig};
pub use config_loader::ConfigLoader;
pub use error::AnalysisError;
pub use events::{EntityKind, EntityRef, Event, KioskId, ProductId};
pub use series::{AnomalySet, DailyCountSeries, DecompositionPoint, DecompositionResult};
