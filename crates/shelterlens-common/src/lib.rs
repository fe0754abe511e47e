//! shelterlens-common: Shared types, errors, configuration and the
//! allow-listed HTTP client used across all shelterlens crates.

pub mod error;
pub mod models;
pub mod config;
pub mod sandbox;

// Re-export commonly used types
pub use config::{LocatorConfig, RankingConfig, ReferenceConfig, SampleRecordConfig, SourcesConfig};
pub use models::{
    Category, Position, RawCoordinates, RawShelter, ReferencePoint, ShelterRecord, SourceBatch,
    SourceKind,
};
