//! Logging middleware
//!
//! Logs every request with its outcome.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::info;

/// Log a request's method, URI and response status
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    info!("{} {} -> {}", method, uri, response.status().as_u16());
    response
}
