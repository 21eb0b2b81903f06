//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, body limits,
//! and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Uploaded CSV files may be larger than JSON request bodies.
const DATASET_BODY_LIMIT: usize = 10 * 1024 * 1024;
const GLOBAL_BODY_LIMIT: usize = 1024 * 1024;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS middleware: allow localhost origins for the chat UI.
    let port = state.config.general.port;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            format!("http://127.0.0.1:{}", port)
                .parse::<HeaderValue>()
                .unwrap(),
            format!("http://localhost:{}", port)
                .parse::<HeaderValue>()
                .unwrap(),
        ]))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ui", get(handlers::ui_page))
        .route("/sessions", post(handlers::create_session))
        .route(
            "/dataset",
            post(handlers::upload_dataset).layer(DefaultBodyLimit::max(DATASET_BODY_LIMIT)),
        )
        .route("/dataset/preview", get(handlers::dataset_preview))
        .route("/examples", get(handlers::examples))
        .route("/chat", post(handlers::chat))
        .route("/chat/example", post(handlers::chat_example))
        .route(
            "/history",
            get(handlers::history).delete(handlers::clear_history),
        )
        .layer(DefaultBodyLimit::max(GLOBAL_BODY_LIMIT))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
///
/// Binds to 127.0.0.1 (localhost only) on the port from config.
pub async fn start_server(
    port: u16,
    state: AppState,
) -> Result<(), loglens_core::error::LoglensError> {
    let addr = format!("127.0.0.1:{}", port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| loglens_core::error::LoglensError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| loglens_core::error::LoglensError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
