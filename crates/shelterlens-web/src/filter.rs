//! Request query string → `RankingQuery`.
//!
//! `?radius=5&category=Youth&category=Legal+Aid`. The category key may
//! repeat, so handlers extract this with `axum_extra::extract::Query`.
//! The dashboard form also sends `applied=1`, which tells "nothing ticked"
//! apart from "no filter given".

use serde::Deserialize;
use shelterlens_common::error::ApiError;
use shelterlens_common::Category;
use shelterlens_ranker::RankingQuery;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShelterFilter {
    #[serde(default)]
    pub category: Vec<String>,
    pub radius: Option<f64>,
    pub applied: Option<String>,
}

impl ShelterFilter {
    pub fn to_query(&self, default_threshold: f64) -> Result<RankingQuery, ApiError> {
        let threshold_miles = match self.radius {
            Some(r) if r.is_finite() && r > 0.0 => r,
            Some(r) => {
                return Err(ApiError::BadRequest(format!(
                    "radius must be a positive number of miles, got {}",
                    r
                )))
            }
            None => default_threshold,
        };

        let categories = if !self.category.is_empty() {
            Some(self.category.iter().map(|c| Category::parse(c)).collect())
        } else if self.applied.is_some() {
            Some(Vec::new())
        } else {
            None
        };

        Ok(RankingQuery { threshold_miles, categories })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let query = ShelterFilter::default().to_query(10.0).unwrap();
        assert_eq!(query, RankingQuery::default());
    }

    #[test]
    fn test_categories_and_radius() {
        let filter = ShelterFilter {
            category: vec!["youth".to_string(), "Legal Aid".to_string()],
            radius: Some(2.5),
            applied: Some("1".to_string()),
        };
        let query = filter.to_query(10.0).unwrap();
        assert_eq!(query.threshold_miles, 2.5);
        assert_eq!(query.categories, Some(vec![Category::Youth, Category::LegalAid]));
    }

    #[test]
    fn test_applied_without_categories_selects_nothing() {
        let filter = ShelterFilter {
            applied: Some("1".to_string()),
            ..ShelterFilter::default()
        };
        assert_eq!(filter.to_query(10.0).unwrap().categories, Some(vec![]));
    }

    #[test]
    fn test_rejects_bad_radius() {
        for r in [0.0, -1.0, f64::NAN] {
            let filter = ShelterFilter { radius: Some(r), ..ShelterFilter::default() };
            assert!(matches!(filter.to_query(10.0), Err(ApiError::BadRequest(_))));
        }
    }
}
