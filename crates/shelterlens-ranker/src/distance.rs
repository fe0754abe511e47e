//! Geodesic distance on the WGS84 ellipsoid, in statute miles.

use geo::{Distance, Geodesic, Point};
use shelterlens_common::Position;

/// International statute mile in metres.
pub const METRES_PER_MILE: f64 = 1609.344;

/// Shortest ellipsoidal distance between two positions (Karney's geodesic
/// algorithm), in miles. Not a spherical approximation.
pub fn geodesic_miles(from: Position, to: Position) -> f64 {
    // geo points are (x = longitude, y = latitude)
    let a = Point::new(from.longitude, from.latitude);
    let b = Point::new(to.longitude, to.latitude);
    Geodesic::distance(a, b) / METRES_PER_MILE
}

/// Two-decimal rounding used for display only; ranking uses the raw value.
pub fn round_miles(miles: f64) -> f64 {
    (miles * 100.0).round() / 100.0
}

/// "0.47 miles"
pub fn format_miles(miles: f64) -> String {
    format!("{:.2} miles", miles)
}
