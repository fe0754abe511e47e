//! shelterlens-web: shelter locator dashboard.
//! Serves:
//!   - The HTML page (distance table, category filter, Leaflet map)
//!   - JSON views of the ranked shelters and their categories
//!   - Health and cache-refresh endpoints

pub mod filter;
pub mod handlers;
pub mod router;
pub mod state;
pub mod telemetry;
