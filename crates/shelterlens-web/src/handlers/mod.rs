//! HTTP handlers for all web routes.

pub mod dashboard;
pub mod shelters;
pub mod system;
