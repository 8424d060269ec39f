//! Health, readiness and metrics endpoint tests.

mod common;

use assistant_service::services::providers::mock::{
    MockGenerationProvider, MockRetrievalProvider,
};
use common::{TestApp, fixture_context};

#[tokio::test]
async fn health_check_reports_ok() {
    let app = TestApp::spawn(
        MockRetrievalProvider::returning(fixture_context()),
        MockGenerationProvider::returning("ok", 10, 5),
    )
    .await;

    let response = app.get("/health").await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "assistant-service");
}

#[tokio::test]
async fn readiness_check_reports_ok() {
    let app = TestApp::spawn(
        MockRetrievalProvider::returning(fixture_context()),
        MockGenerationProvider::returning("ok", 10, 5),
    )
    .await;

    let response = app.get("/ready").await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn metrics_endpoint_serves_prometheus_text() {
    let app = TestApp::spawn(
        MockRetrievalProvider::returning(fixture_context()),
        MockGenerationProvider::returning("ok", 10, 5),
    )
    .await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status().as_u16(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("assistant_audit_log_failures_total"));
}
