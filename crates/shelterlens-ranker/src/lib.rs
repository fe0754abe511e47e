//! shelterlens-ranker: distance ranking and filtering of shelter records.
//!
//! Takes raw rows from any number of sources, places them on the WGS84
//! ellipsoid and orders them by distance from a reference point.

pub mod categories;
pub mod distance;
pub mod merge;
pub mod normalise;
pub mod pipeline;
pub mod projection;

pub use categories::CategoryMap;
pub use distance::{format_miles, geodesic_miles, round_miles, METRES_PER_MILE};
pub use normalise::{ConversionError, Diagnostic};
pub use pipeline::{RankedShelter, RankedShelters, RankingPipeline, RankingQuery, DEFAULT_THRESHOLD_MILES};
pub use projection::StatePlane;
