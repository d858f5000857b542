//! HTTP request metrics middleware
//!
//! Records `http_requests_total` (counter) and `http_request_duration_seconds`
//! (histogram) for every request routed through the API.

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};

/// Label used for requests no route matched, so probing random URLs does not
/// create a new series per path.
const UNMATCHED_PATH: &str = "unmatched";

/// Labels: `method`, `path` (the route template, e.g. `/api/v1/rates/{id}`)
/// and, on the counter, `status`.
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();

    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(duration);

    response
}
