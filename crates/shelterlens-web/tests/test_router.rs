//! Router behaviour with local sources only.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::Value;
use shelterlens_common::{LocatorConfig, SampleRecordConfig};
use shelterlens_web::{router::build_router, state::AppState};
use shelterlens_test_utils::{write_locations_csv, NEAR_SOUTH};
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_locations_csv(
        dir.path(),
        &[
            ("Our Daily Bread", "39.30", "-76.62"),
            ("Paul's Place", "39.2820504", "-76.6328439"),
            ("Far Away", "39.2820504", "-76.44"),
            ("Broken Row", "north", "-76.6"),
            ("Helping Up Mission", "39.29", "-76.61"),
        ],
    )
    .unwrap();

    let categories = dir.path().join("categories.toml");
    std::fs::write(
        &categories,
        "[categories]\n\"Our Daily Bread\" = \"Food & Meals\"\n\"Helping Up Mission\" = \"Emergency Shelters\"\n",
    )
    .unwrap();

    let mut config = LocatorConfig::default();
    config.ranking.categories_path = categories;
    config.sources.arcgis_enabled = false;
    config.sources.csv_path = Some(csv);
    config.sources.sample = Some(SampleRecordConfig {
        name: "Sample Shelter".to_string(),
        latitude: NEAR_SOUTH.latitude,
        longitude: NEAR_SOUTH.longitude,
        address: Some("100 Sample St".to_string()),
        category: Some("Youth".to_string()),
    });

    let state = AppState::from_config(config).unwrap();
    (build_router(state), dir)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_shelters_are_ranked_nearest_first() {
    let (app, _dir) = app();
    let (status, body) = get_json(app, "/api/shelters").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        names(&body["shelters"]),
        vec!["Sample Shelter", "Helping Up Mission", "Our Daily Bread"]
    );
    assert_eq!(body["shelters"][0]["distance_miles"], 0.47);
    assert_eq!(body["shelters"][0]["distance"], "0.47 miles");
    assert_eq!(body["shelters"][1]["address"], "Not Available");
    assert_eq!(names(&body["all"]).last().map(String::as_str), Some("Far Away"));
    assert_eq!(body["diagnostics"].as_array().unwrap().len(), 1);
    assert_eq!(body["diagnostics"][0]["name"], "Broken Row");
    assert_eq!(body["reference"]["name"], "Paul's Place");
}

#[tokio::test]
async fn test_category_and_radius_filters_apply() {
    let (app, _dir) = app();
    let (_, body) = get_json(app, "/api/shelters?category=Food+%26+Meals&category=Youth&radius=1.4").await;

    assert_eq!(names(&body["shelters"]), vec!["Sample Shelter"]);
    assert_eq!(body["threshold_miles"], 1.4);
    assert_eq!(body["categories"], serde_json::json!(["Youth", "Emergency Shelters"]));
}

#[tokio::test]
async fn test_categories_endpoint_lists_options_in_distance_order() {
    let (app, _dir) = app();
    let (status, body) = get_json(app, "/api/categories?category=Youth").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["categories"],
        serde_json::json!(["Youth", "Emergency Shelters", "Food & Meals"])
    );
}

#[tokio::test]
async fn test_bad_radius_is_rejected() {
    let (app, _dir) = app();
    let (status, body) = get_json(app, "/api/shelters?radius=-3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("radius"));
}

#[tokio::test]
async fn test_dashboard_renders_page() {
    let (app, _dir) = app();
    let (status, body) = get(app, "/").await;
    let html = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Homeless Shelter Locator Near Paul&#39;s Place"));
    assert!(html.contains("Shelters Within 10 Miles of Paul&#39;s Place"));
    assert!(html.contains("Sample Shelter"));
    assert!(html.contains("Error converting coordinates for shelter Broken Row"));
}

#[tokio::test]
async fn test_dashboard_with_nothing_selected_shows_error_state() {
    let (app, _dir) = app();
    let (status, body) = get(app, "/?applied=1&radius=10").await;
    let html = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Shelter data could not be processed."));
}

#[tokio::test]
async fn test_health_and_refresh() {
    let (app, _dir) = app();
    let (status, body) = get_json(app.clone(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sources"].as_array().unwrap().len(), 2);
    assert_eq!(body["categories_loaded"], 2);

    let resp = app
        .oneshot(Request::builder().method("POST").uri("/api/refresh").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["refreshed"], false);
}
