//! Integration tests for the Loglens API.
//!
//! Each test drives the full axum router via `tower::ServiceExt::oneshot`
//! with its own in-memory state: upload a CSV, run chat turns over it, and
//! inspect the transcript. Covers happy paths, error paths, and the
//! shared-path guarantee between example-question and free-text turns.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use uuid::Uuid;

use loglens_api::handlers::{
    DatasetResponse, ExamplesResponse, HealthResponse, HistoryResponse, PreviewDto,
    SessionResponse, TurnResponse,
};
use loglens_api::{create_router, AppState};
use loglens_core::LoglensConfig;

// =============================================================================
// Helpers
// =============================================================================

const TRAFFIC_CSV: &str = "\
status,method,user_agent
200,GET,Mozilla/5.0
404,GET,Googlebot/2.1
200,POST,Mozilla/5.0
500,GET,bingbot/3.0
200,GET,curl/8.0
";

fn make_app() -> Router {
    create_router(AppState::new(LoglensConfig::default()))
}

async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

/// Read full response body bytes.
async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
    let bytes = body_bytes(resp).await;
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn post_csv(uri: &str, csv: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap()
}

fn post_json(uri: &str, json: String) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

/// Create a session and upload the traffic CSV into it.
async fn session_with_dataset(app: &Router) -> Uuid {
    let resp = send(app, post_empty("/sessions")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let session: SessionResponse = body_json(resp).await;

    let uri = format!("/dataset?session={}", session.session_id);
    let resp = send(app, post_csv(&uri, TRAFFIC_CSV)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    session.session_id
}

// =============================================================================
// Health and UI
// =============================================================================

#[tokio::test]
async fn test_health_happy_path() {
    let app = make_app();
    let resp = send(&app, get("/health")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let health: HealthResponse = body_json(resp).await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.sessions, 0);
}

#[tokio::test]
async fn test_health_counts_sessions() {
    let app = make_app();
    send(&app, post_empty("/sessions")).await;
    send(&app, post_empty("/sessions")).await;

    let health: HealthResponse = body_json(send(&app, get("/health")).await).await;
    assert_eq!(health.sessions, 2);
}

#[tokio::test]
async fn test_ui_serves_html() {
    let app = make_app();
    let resp = send(&app, get("/ui")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(body.contains("<!DOCTYPE html>"));
    assert!(body.contains("Loglens"));
}

// =============================================================================
// Dataset upload
// =============================================================================

#[tokio::test]
async fn test_upload_dataset_returns_shape_and_preview() {
    let app = make_app();
    let resp = send(&app, post_empty("/sessions")).await;
    let session: SessionResponse = body_json(resp).await;

    let uri = format!("/dataset?session={}", session.session_id);
    let resp = send(&app, post_csv(&uri, TRAFFIC_CSV)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let dataset: DatasetResponse = body_json(resp).await;
    assert_eq!(dataset.session_id, session.session_id);
    assert_eq!(dataset.rows, 5);
    assert_eq!(dataset.columns, vec!["status", "method", "user_agent"]);
    assert_eq!(dataset.preview.rows.len(), 5); // capped at preview_rows = 5
    assert_eq!(dataset.preview.rows[0], vec!["200", "GET", "Mozilla/5.0"]);
}

#[tokio::test]
async fn test_upload_without_session_param_creates_session() {
    let app = make_app();
    let resp = send(&app, post_csv("/dataset", TRAFFIC_CSV)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let dataset: DatasetResponse = body_json(resp).await;
    let uri = format!("/dataset/preview?session={}", dataset.session_id);
    let resp = send(&app, get(&uri)).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_malformed_csv_is_rejected_without_state_change() {
    let app = make_app();
    let resp = send(&app, post_empty("/sessions")).await;
    let session: SessionResponse = body_json(resp).await;
    let uri = format!("/dataset?session={}", session.session_id);

    // Ragged rows are a parse error.
    let resp = send(&app, post_csv(&uri, "a,b\n1,2\n3\n")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // No dataset was bound by the failed upload.
    let preview_uri = format!("/dataset/preview?session={}", session.session_id);
    let resp = send(&app, get(&preview_uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_failure_keeps_previous_dataset() {
    let app = make_app();
    let session = session_with_dataset(&app).await;
    let uri = format!("/dataset?session={}", session);

    let resp = send(&app, post_csv(&uri, "")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The earlier dataset still answers.
    let preview_uri = format!("/dataset/preview?session={}", session);
    let preview: PreviewDto = body_json(send(&app, get(&preview_uri)).await).await;
    assert_eq!(preview.columns, vec!["status", "method", "user_agent"]);
}

#[tokio::test]
async fn test_preview_requires_session_param() {
    let app = make_app();
    let resp = send(&app, get("/dataset/preview")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preview_without_dataset_is_not_found() {
    let app = make_app();
    let resp = send(&app, post_empty("/sessions")).await;
    let session: SessionResponse = body_json(resp).await;

    let uri = format!("/dataset/preview?session={}", session.session_id);
    let resp = send(&app, get(&uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Examples
// =============================================================================

#[tokio::test]
async fn test_examples_lists_configured_questions() {
    let app = make_app();
    let examples: ExamplesResponse = body_json(send(&app, get("/examples")).await).await;
    assert_eq!(examples.questions.len(), 4);
    assert_eq!(
        examples.questions[2],
        "List total number bots in the data"
    );
}

// =============================================================================
// Chat turns
// =============================================================================

#[tokio::test]
async fn test_chat_without_dataset_is_conflict() {
    let app = make_app();
    let resp = send(&app, post_empty("/sessions")).await;
    let session: SessionResponse = body_json(resp).await;

    let req = post_json(
        "/chat",
        format!(
            r#"{{"session_id":"{}","message":"any question"}}"#,
            session.session_id
        ),
    );
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // No message was appended by the refused turn.
    let uri = format!("/history?session={}", session.session_id);
    let history: HistoryResponse = body_json(send(&app, get(&uri)).await).await;
    assert!(history.messages.is_empty());
}

#[tokio::test]
async fn test_chat_turn_appends_user_and_assistant() {
    let app = make_app();
    let session = session_with_dataset(&app).await;

    let req = post_json(
        "/chat",
        format!(
            r#"{{"session_id":"{}","message":"List total number bots in the data"}}"#,
            session
        ),
    );
    let turn: TurnResponse = body_json(send(&app, req).await).await;
    assert_eq!(turn.messages.len(), 2);
    assert_eq!(turn.messages[0].role, "user");
    assert_eq!(
        turn.messages[0].content,
        "List total number bots in the data"
    );
    assert_eq!(turn.messages[1].role, "assistant");
    assert_eq!(turn.messages[1].content, "Found 2 of 5 rows matching 'bot'.");

    let uri = format!("/history?session={}", session);
    let history: HistoryResponse = body_json(send(&app, get(&uri)).await).await;
    assert_eq!(history.messages.len(), 2);
}

#[tokio::test]
async fn test_chat_empty_message_is_bad_request() {
    let app = make_app();
    let session = session_with_dataset(&app).await;

    let req = post_json(
        "/chat",
        format!(r#"{{"session_id":"{}","message":""}}"#, session),
    );
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_plot_question_attaches_chart() {
    let app = make_app();
    let session = session_with_dataset(&app).await;

    let req = post_json(
        "/chat",
        format!(
            r#"{{"session_id":"{}","message":"display a count plot for the status column"}}"#,
            session
        ),
    );
    let turn: TurnResponse = body_json(send(&app, req).await).await;
    let chart = turn.messages[1]
        .chart_png_base64
        .as_ref()
        .expect("chart attached");
    assert!(!chart.is_empty());

    // A following chartless turn must not inherit the chart.
    let req = post_json(
        "/chat",
        format!(r#"{{"session_id":"{}","message":"how many rows"}}"#, session),
    );
    let turn: TurnResponse = body_json(send(&app, req).await).await;
    assert!(turn.messages[1].chart_png_base64.is_none());
}

#[tokio::test]
async fn test_example_and_free_text_turns_match() {
    let app = make_app();

    let by_example = session_with_dataset(&app).await;
    let req = post_json(
        "/chat/example",
        format!(r#"{{"session_id":"{}","index":2}}"#, by_example),
    );
    let turn_a: TurnResponse = body_json(send(&app, req).await).await;

    let by_text = session_with_dataset(&app).await;
    let req = post_json(
        "/chat",
        format!(
            r#"{{"session_id":"{}","message":"List total number bots in the data"}}"#,
            by_text
        ),
    );
    let turn_b: TurnResponse = body_json(send(&app, req).await).await;

    assert_eq!(turn_a.messages[0].content, turn_b.messages[0].content);
    assert_eq!(turn_a.messages[1].content, turn_b.messages[1].content);
    assert_eq!(
        turn_a.messages[1].chart_png_base64.is_some(),
        turn_b.messages[1].chart_png_base64.is_some()
    );
}

#[tokio::test]
async fn test_example_with_bad_index_is_bad_request() {
    let app = make_app();
    let session = session_with_dataset(&app).await;

    let req = post_json(
        "/chat/example",
        format!(r#"{{"session_id":"{}","index":99}}"#, session),
    );
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_example_turn_folds_error_into_transcript() {
    // Index 0 ("Analyze traffic patterns...") resolves to a summary, which
    // succeeds; force a query error instead with an unknown column plot.
    let app = make_app();
    let session = session_with_dataset(&app).await;

    let req = post_json(
        "/chat",
        format!(
            r#"{{"session_id":"{}","message":"plot for the verb column"}}"#,
            session
        ),
    );
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let turn: TurnResponse = body_json(resp).await;
    assert!(turn.messages[1]
        .content
        .starts_with("Error analyzing query:"));
    assert!(turn.messages[1].chart_png_base64.is_none());
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn test_history_requires_session_param() {
    let app = make_app();
    let resp = send(&app, get("/history")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_unknown_session_is_not_found() {
    let app = make_app();
    let uri = format!("/history?session={}", Uuid::new_v4());
    let resp = send(&app, get(&uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_preserves_order_across_turns() {
    let app = make_app();
    let session = session_with_dataset(&app).await;

    for message in ["how many rows", "show counts by method"] {
        let req = post_json(
            "/chat",
            format!(r#"{{"session_id":"{}","message":"{}"}}"#, session, message),
        );
        send(&app, req).await;
    }

    let uri = format!("/history?session={}", session);
    let history: HistoryResponse = body_json(send(&app, get(&uri)).await).await;
    assert_eq!(history.messages.len(), 4);
    assert_eq!(history.messages[0].content, "how many rows");
    assert_eq!(history.messages[2].content, "show counts by method");
}

#[tokio::test]
async fn test_clear_history_keeps_dataset() {
    let app = make_app();
    let session = session_with_dataset(&app).await;

    let req = post_json(
        "/chat",
        format!(r#"{{"session_id":"{}","message":"how many rows"}}"#, session),
    );
    send(&app, req).await;

    let uri = format!("/history?session={}", session);
    let resp = send(&app, delete(&uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let history: HistoryResponse = body_json(send(&app, get(&uri)).await).await;
    assert!(history.messages.is_empty());

    // The dataset survived: a new turn still answers.
    let req = post_json(
        "/chat",
        format!(r#"{{"session_id":"{}","message":"how many rows"}}"#, session),
    );
    let turn: TurnResponse = body_json(send(&app, req).await).await;
    assert_eq!(
        turn.messages[1].content,
        "The dataset has 5 rows and 3 columns."
    );
}
