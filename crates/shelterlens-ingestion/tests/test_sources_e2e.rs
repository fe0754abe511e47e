//! Sources against an in-process fake ArcGIS endpoint and temp files.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shelterlens_common::sandbox::SandboxClient;
use shelterlens_common::{RawCoordinates, SourceKind};
use shelterlens_ingestion::sources::{ArcGisSource, CsvFileSource};
use shelterlens_ingestion::{collect_batches, FetchCache, ShelterSource};
use shelterlens_test_utils::{arcgis_error, arcgis_response, temp_dir, write_locations_csv, NEAR_SOUTH};

async fn spawn_fake_arcgis() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));

    async fn query(State(hits): State<Arc<AtomicUsize>>) -> Json<Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        Json(arcgis_response(&[
            ("Shelter A", Some("1 Main St"), json!(NEAR_SOUTH.x), json!(NEAR_SOUTH.y)),
            ("Shelter B", None, json!("n/a"), json!(1.0)),
        ]))
    }

    let app = Router::new()
        .route("/query", get(query))
        .route("/error", get(|| async { Json(arcgis_error(498, "Invalid token")) }))
        .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hits)
}

fn client() -> SandboxClient {
    SandboxClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetches_and_parses_features() {
    let (addr, _) = spawn_fake_arcgis().await;
    let source = ArcGisSource::new(client(), format!("http://{}/query", addr));

    let rows = source.fetch().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Shelter A");
    assert_eq!(rows[0].source, SourceKind::Remote);
    assert_eq!(rows[1].address, None);
    assert_eq!(
        rows[1].coordinates,
        RawCoordinates::Projected { x: Some("n/a".to_string()), y: Some("1.0".to_string()) }
    );
}

#[tokio::test]
async fn test_error_envelope_and_http_failure_are_errors() {
    let (addr, _) = spawn_fake_arcgis().await;

    let envelope = ArcGisSource::new(client(), format!("http://{}/error", addr));
    let err = envelope.fetch().await.unwrap_err();
    assert!(err.to_string().contains("Invalid token"));

    let down = ArcGisSource::new(client(), format!("http://{}/down", addr));
    assert!(down.fetch().await.is_err());
}

#[tokio::test]
async fn test_disallowed_host_is_refused() {
    let source = ArcGisSource::new(client(), "https://example.org/query");
    let err = source.fetch().await.unwrap_err();
    assert!(err.to_string().contains("allowlist"));
}

#[tokio::test]
async fn test_cache_serves_repeat_fetches() {
    let (addr, hits) = spawn_fake_arcgis().await;
    let source = ArcGisSource::new(client(), format!("http://{}/query", addr));
    let cache = FetchCache::new(source, Duration::from_secs(3600));

    cache.fetch().await.unwrap();
    cache.fetch().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    cache.invalidate().await;
    cache.fetch().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_collect_keeps_order_and_degrades_failures() {
    let (addr, _) = spawn_fake_arcgis().await;
    let dir = temp_dir();
    let csv = write_locations_csv(dir.path(), &[("Our Daily Bread", "39.2951", "-76.6102")]).unwrap();

    let sources: Vec<Arc<dyn ShelterSource>> = vec![
        Arc::new(ArcGisSource::new(client(), format!("http://{}/down", addr))),
        Arc::new(CsvFileSource::new(&csv)),
        Arc::new(CsvFileSource::new(dir.path().join("missing.csv"))),
    ];
    let collected = collect_batches(&sources).await;

    let kinds: Vec<_> = collected.batches.iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![SourceKind::Remote, SourceKind::File, SourceKind::File]);
    assert!(collected.batches[0].rows.is_empty());
    assert_eq!(collected.batches[1].rows.len(), 1);
    assert_eq!(collected.batches[1].rows[0].name, "Our Daily Bread");
    assert_eq!(collected.warnings.len(), 2);
    assert_eq!(collected.warnings[0].kind, SourceKind::Remote);
    assert!(collected.warnings[1].to_string().starts_with("Error loading"));
}
