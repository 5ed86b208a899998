//! Request logging middleware

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// Log each request with its status and latency; slow requests get a
/// warning.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    if duration > std::time::Duration::from_millis(500) {
        tracing::warn!("slow request: {} {} took {:?}", method, uri, duration);
    }

    tracing::info!(
        "{} {} - {} in {}ms",
        method,
        uri,
        response.status(),
        duration.as_millis()
    );

    response
}
