use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Largest body buffered for logging; JSON-RPC messages are far smaller
const MAX_LOGGED_BODY: usize = 4 * 1024 * 1024;

/// Log method, path, request body (POST/PUT) and the full response
pub async fn log_traffic(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    tracing::info!(%method, %path, "HTTP request");

    let request = if method == Method::POST || method == Method::PUT {
        let (parts, body) = request.into_parts();
        let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body");
                return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
            }
        };
        tracing::info!(body = %String::from_utf8_lossy(&bytes), "Request body");
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(status = parts.status.as_u16(), "Response status");
    if !bytes.is_empty() {
        tracing::info!(body = %String::from_utf8_lossy(&bytes), "Response body");
    }

    Response::from_parts(parts, Body::from(bytes))
}
