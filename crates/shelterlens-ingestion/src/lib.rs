//! shelterlens-ingestion: shelter data sources.
//!
//! - ArcGIS feature-service fetch (remote, State Plane coordinates)
//! - Local `Location,Latitude,Longitude` CSV file
//! - A single configured sample record
//! - TTL memo around the remote fetch
//!
//! Every source yields raw rows; a failing source degrades to an empty
//! batch plus a warning and never aborts collection.

pub mod cache;
pub mod collect;
pub mod sources;

pub use cache::FetchCache;
pub use collect::{collect_batches, Collected, SourceWarning};
pub use sources::{ShelterSource, SourceSet};
