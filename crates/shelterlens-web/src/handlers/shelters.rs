//! Shelter API: JSON views of the ranking.

use axum::{extract::State, Json};
use axum_extra::extract::Query;
use serde::Serialize;
use shelterlens_common::error::ApiError;
use shelterlens_common::{Category, SourceKind};
use shelterlens_ingestion::SourceWarning;
use shelterlens_ranker::{Diagnostic, RankedShelter};

use crate::filter::ShelterFilter;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct ShelterView {
    pub name: String,
    pub address: String,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    /// Two decimals.
    pub distance_miles: f64,
    pub distance: String,
    pub source: SourceKind,
}

impl From<&RankedShelter> for ShelterView {
    fn from(r: &RankedShelter) -> Self {
        Self {
            name: r.shelter.name.clone(),
            address: r.shelter.address.clone(),
            category: r.shelter.category.clone(),
            latitude: r.shelter.position.latitude,
            longitude: r.shelter.position.longitude,
            distance_miles: r.rounded_miles(),
            distance: r.distance_label(),
            source: r.shelter.source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReferenceView {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct SheltersResponse {
    pub reference: ReferenceView,
    pub threshold_miles: f64,
    pub categories: Vec<Category>,
    pub shelters: Vec<ShelterView>,
    pub all: Vec<ShelterView>,
    pub diagnostics: Vec<Diagnostic>,
    pub warnings: Vec<SourceWarning>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub threshold_miles: f64,
    pub categories: Vec<Category>,
}

/// GET /api/shelters: Ranked shelters within the radius
pub async fn api_shelters(
    State(state): State<SharedState>,
    Query(filter): Query<ShelterFilter>,
) -> Result<Json<SheltersResponse>, ApiError> {
    let query = filter.to_query(state.config.ranking.threshold_miles)?;
    let snapshot = state.rank(&query).await;
    let reference = state.pipeline.reference();

    Ok(Json(SheltersResponse {
        reference: ReferenceView {
            name: reference.name.clone(),
            latitude: reference.position.latitude,
            longitude: reference.position.longitude,
        },
        threshold_miles: snapshot.ranked.threshold_miles,
        categories: snapshot.ranked.categories.clone(),
        shelters: snapshot.ranked.nearby.iter().map(ShelterView::from).collect(),
        all: snapshot.ranked.all.iter().map(ShelterView::from).collect(),
        diagnostics: snapshot.ranked.diagnostics,
        warnings: snapshot.warnings,
    }))
}

/// GET /api/categories: Distinct categories within the radius
pub async fn api_categories(
    State(state): State<SharedState>,
    Query(filter): Query<ShelterFilter>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let mut query = filter.to_query(state.config.ranking.threshold_miles)?;
    // The option list never depends on the current selection.
    query.categories = None;
    let snapshot = state.rank(&query).await;

    Ok(Json(CategoriesResponse {
        threshold_miles: query.threshold_miles,
        categories: snapshot.ranked.categories,
    }))
}
