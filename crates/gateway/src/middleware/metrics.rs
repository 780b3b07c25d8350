//! Per-request counters and latency

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use classdesk_common::metrics::RequestMetrics;

/// Record method, route template and status for every routed request.
///
/// Must be installed with `route_layer`; the label is the route template,
/// never the raw URI.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let timer = RequestMetrics::start(request.method().as_str(), &endpoint);
    let response = next.run(request).await;
    timer.finish(response.status().as_u16());

    response
}
