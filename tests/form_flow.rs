//! End-to-end form flows: App driving the real HTTP client against a mock server

use pretty_assertions::assert_eq;
use scalynx_cli::app::INCOMPLETE_FORM_MESSAGE;
use scalynx_cli::{
    App, ApiClient, BackendStatus, FieldPolicy, FormInput, Operation, OperationResult, ValidationBlock,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(uri: String) -> App {
    let client = ApiClient::new(uri, Duration::from_secs(5)).unwrap();
    App::new(Arc::new(client), FieldPolicy::AllRequired)
}

/// Address of a port nothing is listening on.
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_validate_then_analyze_populates_both_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate-idea"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "verdict": "Promising",
            "rating": 8
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-idea"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "strengths": ["low cost"],
            "weaknesses": ["seasonal demand"],
            "rating": "B+",
            "success_probability": "65%",
            "advice": "Target year-round services"
        })))
        .mount(&server)
        .await;

    let mut app = app_for(server.uri());
    app.input = FormInput::new("dog walking app", "urban professionals", "Austin");

    app.validate();
    app.analyze();
    assert!(app.in_flight().validating);
    assert!(app.in_flight().analyzing);

    app.settle(Operation::Validate).await;
    app.settle(Operation::Analyze).await;

    let view = app.view();
    assert_eq!(
        view.validation,
        Some(ValidationBlock::Confirmation("Promising (Rating: 8)".to_string()))
    );
    let analysis = view.analysis.expect("analysis block");
    assert_eq!(analysis.probability_width, 65.0);
    assert_eq!(analysis.advice, "Target year-round services");
}

#[tokio::test]
async fn test_incomplete_form_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate-idea"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut app = app_for(server.uri());
    app.input = FormInput::new("dog walking app", "", "Austin");

    assert!(!app.validate());
    assert_eq!(
        app.validate_result(),
        &OperationResult::Failure(INCOMPLETE_FORM_MESSAGE.to_string())
    );
    assert_eq!(app.poll_settlements(), 0);
}

#[tokio::test]
async fn test_analyze_error_shows_in_validation_block() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-idea"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "x" })))
        .mount(&server)
        .await;

    let mut app = app_for(server.uri());
    app.input.set_idea("dog walking app");
    app.analyze();
    app.settle(Operation::Analyze).await;

    let view = app.view();
    assert_eq!(view.validation, Some(ValidationBlock::Error("x".to_string())));
    assert!(view.analysis.is_none());
}

#[tokio::test]
async fn test_unreachable_server() {
    let uri = closed_port_uri();

    let mut app = app_for(uri);
    app.input = FormInput::new("dog walking app", "urban professionals", "Austin");
    app.validate();
    app.settle(Operation::Validate).await;

    assert_eq!(
        app.validate_result().failure(),
        Some("Could not connect to the server.")
    );
    assert!(!app.in_flight().validating);
    assert_eq!(app.check_backend().await, &BackendStatus::Offline);
}
