//! Shelter ranking pipeline.
//!
//! merge → normalise → drop reference duplicates → distance → sort →
//! radius filter → category filter.
//!
//! Pure and synchronous: the same batches, query and table always produce
//! the same result, and nothing here logs or performs I/O.

use serde::{Deserialize, Serialize};
use shelterlens_common::{Category, ReferencePoint, ShelterRecord, SourceBatch};

use crate::categories::CategoryMap;
use crate::distance::{format_miles, geodesic_miles, round_miles};
use crate::merge::merge;
use crate::normalise::{normalise, Diagnostic};
use crate::projection::StatePlane;

pub const DEFAULT_THRESHOLD_MILES: f64 = 10.0;

/// Caller-selected filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingQuery {
    pub threshold_miles: f64,
    /// `None` allows every category observed within the radius.
    pub categories: Option<Vec<Category>>,
}

impl Default for RankingQuery {
    fn default() -> Self {
        Self {
            threshold_miles: DEFAULT_THRESHOLD_MILES,
            categories: None,
        }
    }
}

impl RankingQuery {
    pub fn within(threshold_miles: f64) -> Self {
        Self { threshold_miles, categories: None }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = Some(categories);
        self
    }
}

/// A record together with its distance to the reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedShelter {
    #[serde(flatten)]
    pub shelter: ShelterRecord,
    /// Unrounded; the sort key.
    pub distance_miles: f64,
}

impl RankedShelter {
    pub fn rounded_miles(&self) -> f64 {
        round_miles(self.distance_miles)
    }

    pub fn distance_label(&self) -> String {
        format_miles(self.distance_miles)
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedShelters {
    /// Every valid record, nearest first, before any filter.
    pub all: Vec<RankedShelter>,
    /// Records within the radius and in the allowed categories, nearest first.
    pub nearby: Vec<RankedShelter>,
    /// Distinct categories within the radius, in order of first appearance.
    pub categories: Vec<Category>,
    /// Rows dropped during normalisation.
    pub diagnostics: Vec<Diagnostic>,
    pub threshold_miles: f64,
}

impl RankedShelters {
    /// Nothing survived filtering; the dashboard shows its error state.
    pub fn is_empty(&self) -> bool {
        self.nearby.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RankingPipeline {
    reference: ReferencePoint,
    categories: CategoryMap,
    projection: StatePlane,
}

impl RankingPipeline {
    pub fn new(reference: ReferencePoint, categories: CategoryMap) -> Self {
        Self {
            reference,
            categories,
            projection: StatePlane::maryland(),
        }
    }

    pub fn with_projection(mut self, projection: StatePlane) -> Self {
        self.projection = projection;
        self
    }

    pub fn reference(&self) -> &ReferencePoint {
        &self.reference
    }

    pub fn category_map(&self) -> &CategoryMap {
        &self.categories
    }

    /// Normalise and rank without filtering. Returns the sorted records and
    /// the rows that were dropped.
    pub fn rank_all(&self, batches: Vec<SourceBatch>) -> (Vec<RankedShelter>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let mut ranked = Vec::new();

        for raw in merge(batches, &self.reference) {
            let shelter = match normalise(&raw, &self.projection, &self.categories) {
                Ok(shelter) => shelter,
                Err(e) => {
                    diagnostics.push(Diagnostic::new(&raw, &e));
                    continue;
                }
            };
            // The reference point is drawn on its own; never list it twice.
            if shelter.position == self.reference.position {
                continue;
            }
            let distance_miles = geodesic_miles(self.reference.position, shelter.position);
            ranked.push(RankedShelter { shelter, distance_miles });
        }

        // Stable: equal distances keep their merge order.
        ranked.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
        (ranked, diagnostics)
    }

    pub fn rank(&self, batches: Vec<SourceBatch>, query: &RankingQuery) -> RankedShelters {
        let (all, diagnostics) = self.rank_all(batches);

        let within: Vec<&RankedShelter> = all
            .iter()
            .filter(|r| r.distance_miles <= query.threshold_miles)
            .collect();

        let mut categories: Vec<Category> = Vec::new();
        for r in &within {
            if !categories.contains(&r.shelter.category) {
                categories.push(r.shelter.category.clone());
            }
        }

        let allowed = query.categories.as_ref().unwrap_or(&categories);
        let nearby = within
            .into_iter()
            .filter(|r| allowed.contains(&r.shelter.category))
            .cloned()
            .collect();

        RankedShelters {
            all,
            nearby,
            categories,
            diagnostics,
            threshold_miles: query.threshold_miles,
        }
    }
}
