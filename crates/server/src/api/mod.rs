use crate::middleware::log_traffic;
use anyhow::Result;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use slack_mcp::McpServer;
use slack_mcp_core::SessionProvider;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub mcp: Arc<McpServer>,
    pub provider: Arc<SessionProvider>,
}

/// Start the HTTP transport
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP HTTP server listening on {} (POST at /mcp)", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/mcp/", post(handle_mcp))
        .route("/health", get(health_check))
        .fallback(not_found)
        // Middleware
        .layer(cors)
        .layer(axum::middleware::from_fn(log_traffic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .with_state(Arc::new(state))
}

/// One JSON-RPC message per POST
async fn handle_mcp(State(state): State<Arc<AppState>>, body: String) -> Response {
    // Cancels the tool call if the client goes away and the handler is dropped
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let is_initialize = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("method").and_then(|m| m.as_str()).map(|m| m == "initialize"))
        .unwrap_or(false);

    match state.mcp.handle_message(&body, cancel.clone()).await {
        Some(response) => {
            let mut http_response = Json(response).into_response();
            if is_initialize {
                let session_id = uuid::Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&session_id) {
                    http_response.headers_mut().insert(SESSION_ID_HEADER, value);
                }
            }
            http_response
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.provider.current().map(|session| {
        serde_json::json!({
            "mode": format!("{:?}", session.mode()).to_lowercase(),
            "team": session.identity().team,
            "established_at": session.established_at().to_rfc3339(),
        })
    });

    Json(serde_json::json!({
        "status": "ok",
        "service": "slack-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "ready": state.provider.is_ready(),
        "session": session,
    }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 page not found")
}
