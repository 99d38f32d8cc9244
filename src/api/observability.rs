use axum::{
    Router,
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::domain::InquiryId;

const CONTACT_ROUTE: &str = "/api/contact";

async fn get_metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

/// Scrape endpoint, served on its own listener so it never shows up in the
/// public route table.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .with_state(handle)
}

/// Coarse result class of a response, used as a log field.
fn status_class(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "error"
    } else if status.is_client_error() {
        "client_error"
    } else {
        "success"
    }
}

/// What happened to a contact submission, judged from its response.
fn submission_outcome(status: StatusCode) -> &'static str {
    match status {
        StatusCode::OK => "stored",
        StatusCode::BAD_REQUEST => "rejected",
        s if s.is_server_error() => "failed",
        _ => "refused",
    }
}

/// Wraps each request in a span and emits one `Request finished` event with
/// its timing. Contact submissions also log their outcome and, once stored,
/// the inquiry id. Form contents are never logged.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let request_id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned());
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let span = info_span!(
        "request",
        %request_id,
        %method,
        %path,
        route = route.clone(),
    );

    async move {
        let response = next.run(req).await;
        let elapsed = started.elapsed();
        let status = response.status();

        // Unmatched paths share one label to bound cardinality
        let route_label = route.as_deref().unwrap_or("unmatched");
        let labels = [
            ("method", method.to_string()),
            ("path", route_label.to_owned()),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        let submission = (route_label == CONTACT_ROUTE).then(|| submission_outcome(status));
        let inquiry_id = response
            .extensions()
            .get::<InquiryId>()
            .map(ToString::to_string);

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status.as_u16(),
            outcome = status_class(status),
            origin,
            submission,
            inquiry_id,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    response
}
