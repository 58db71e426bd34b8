//! End-to-end tests of the upload → analyze → report flow against a mock
//! analysis backend. No real backend is contacted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use model_autopsy::app::{App, Screen};
use model_autopsy::client::HttpAutopsyClient;
use model_autopsy::config::ClientConfig;
use model_autopsy::error::{SubmitError, COLUMN_MISMATCH_HINT};
use model_autopsy::render::Painter;
use model_autopsy::upload::FileSlot;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPORT_FIXTURE: &str = include_str!("fixtures/report.json");

fn client_for(base: &str) -> HttpAutopsyClient {
    let mut cfg = ClientConfig::with_api_base(base);
    cfg.timeout = Duration::from_secs(5);
    HttpAutopsyClient::new(cfg).unwrap()
}

fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, body).unwrap();
    p
}

/// App on the upload screen with all three CSVs chosen.
fn ready_app(dir: &TempDir) -> App {
    let mut app = App::new();
    app.get_started();
    let train = write_csv(dir.path(), "train.csv", "income,age\n52000,41\n61000,35\n");
    let old = write_csv(dir.path(), "prod_old.csv", "income,age\n50000,40\n");
    let new = write_csv(dir.path(), "prod_new.csv", "income,age\n91000,29\n");
    app.select_file(FileSlot::Train, &train).unwrap();
    app.select_file(FileSlot::ProdOld, &old).unwrap();
    app.select_file(FileSlot::ProdNew, &new).unwrap();
    app
}

#[tokio::test]
async fn test_successful_analysis_renders_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(REPORT_FIXTURE, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    app.analyze(&client_for(&server.uri())).await.unwrap();

    assert_eq!(app.screen(), Screen::Report);
    let view = app.report_view().unwrap();
    assert_eq!(view.severity, "HIGH - Action required within 48 hours");
    assert_eq!(view.stat_cards[0].value, 3);
    assert_eq!(view.stat_cards[0].total, Some(5));
    assert_eq!(view.drift_chart.bars.len(), 3);

    let text = Painter::plain(100).report(&view);
    assert!(text.contains("Autopsy Report Complete"));
    assert!(text.contains("HIGH - Action required within 48 hours"));
    assert!(text.contains("  1. Retrain on the last 90 days"));
}

#[tokio::test]
async fn test_multipart_carries_three_named_csv_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    app.analyze(&client_for(&server.uri())).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="train"; filename="train.csv""#));
    assert!(body.contains(r#"name="prod_old"; filename="prod_old.csv""#));
    assert!(body.contains(r#"name="prod_new"; filename="prod_new.csv""#));
    assert!(body.contains("text/csv"));
    assert!(body.contains("91000,29"));
}

#[tokio::test]
async fn test_missing_file_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new();
    app.get_started();
    let train = write_csv(dir.path(), "train.csv", "a\n1\n");
    app.select_file(FileSlot::Train, &train).unwrap();

    let err = app.analyze(&client_for(&server.uri())).await.unwrap_err();
    assert!(matches!(err, SubmitError::MissingFiles { .. }));
    assert_eq!(app.error(), Some("Please upload all three CSV files"));
    assert_eq!(app.screen(), Screen::Upload);
}

#[tokio::test]
async fn test_not_found_names_the_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    let err = app.analyze(&client_for(&server.uri())).await.unwrap_err();

    assert!(matches!(err, SubmitError::NotFound { .. }));
    let msg = app.error().unwrap();
    assert!(msg.contains("404"));
    assert!(msg.contains(&server.uri()));
    assert!(!msg.contains("same columns"));
}

#[tokio::test]
async fn test_server_error_surfaces_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "KeyError: 'income'"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    let err = app.analyze(&client_for(&server.uri())).await.unwrap_err();

    assert!(matches!(err, SubmitError::Server { status: 500, .. }));
    let msg = app.error().unwrap();
    assert!(msg.contains("HTTP 500"));
    assert!(msg.contains("KeyError: 'income'"));
    // files survive for a retry
    assert!(app.files().is_complete());
}

#[tokio::test]
async fn test_rejection_shows_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"detail": "Column mismatch: prod_new lacks 'age'"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    app.analyze(&client_for(&server.uri())).await.unwrap_err();
    assert_eq!(app.error(), Some("Column mismatch: prod_new lacks 'age'"));
}

#[tokio::test]
async fn test_rejection_without_json_uses_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(ResponseTemplate::new(422).set_body_string("<html>bad</html>"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    app.analyze(&client_for(&server.uri())).await.unwrap_err();
    assert_eq!(app.error(), Some(COLUMN_MISMATCH_HINT));
}

#[tokio::test]
async fn test_unreachable_backend_reports_connectivity() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    let err = app
        .analyze(&client_for("http://127.0.0.1:1"))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Network { .. }));
    let msg = app.error().unwrap();
    assert!(msg.contains("Could not reach"));
    assert!(msg.contains("http://127.0.0.1:1/run-autopsy"));
    assert!(!msg.contains("columns"));
}

#[tokio::test]
async fn test_malformed_success_body_is_invalid_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    let err = app.analyze(&client_for(&server.uri())).await.unwrap_err();
    assert!(matches!(err, SubmitError::InvalidReport { .. }));
    assert_eq!(app.screen(), Screen::Upload);
}

#[tokio::test]
async fn test_failed_rerun_shows_error_instead_of_old_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(REPORT_FIXTURE, "application/json"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    let client = client_for(&server.uri());
    app.analyze(&client).await.unwrap();
    assert_eq!(app.screen(), Screen::Report);

    let err = app.analyze(&client).await.unwrap_err();
    assert!(matches!(err, SubmitError::Server { status: 500, .. }));
    assert_eq!(app.screen(), Screen::Upload);
    assert!(app.report().is_none());

    let text = Painter::plain(100).upload(&app.upload_view());
    assert!(text.contains("HTTP 500"));
    assert!(text.contains("boom"));
}

#[tokio::test]
async fn test_health_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server.uri()).health().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_report_then_new_analysis_then_pdf_export() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run-autopsy"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(REPORT_FIXTURE, "application/json"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut app = ready_app(&dir);
    app.analyze(&client_for(&server.uri())).await.unwrap();

    let pdf = dir.path().join("report.pdf");
    app.export_pdf(&pdf).unwrap();
    let bytes = std::fs::read(&pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(String::from_utf8_lossy(&bytes).contains("HIGH - Action required within 48 hours"));

    app.reset();
    assert_eq!(app.screen(), Screen::Upload);
    assert!(app.files().is_empty());
}
