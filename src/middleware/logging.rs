//! Logging middleware
//!
//! Request tracing for the HTTP API: one span per request carrying a request
//! id, and a completion log line with status and latency. Slow requests are
//! logged at `warn`.

use axum::http::{Request, Response};
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::{info, info_span, warn, Span};
use uuid::Uuid;

const SLOW_REQUEST: Duration = Duration::from_secs(1);

/// Span for one HTTP request
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        info_span!(
            "http_request",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            path = %request.uri().path(),
        )
    }
}

/// Completion log with status and latency
#[derive(Debug, Clone, Copy)]
pub struct ResponseLogger {
    slow_threshold: Duration,
}

impl Default for ResponseLogger {
    fn default() -> Self {
        Self {
            slow_threshold: SLOW_REQUEST,
        }
    }
}

impl<B> OnResponse<B> for ResponseLogger {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let status = response.status().as_u16();
        let duration_ms = latency.as_millis() as u64;

        if latency > self.slow_threshold {
            warn!(status = status, duration_ms = duration_ms, "Slow request detected");
        } else {
            info!(status = status, duration_ms = duration_ms, "Request completed");
        }
    }
}

/// Tracing layer applied to the whole router
pub fn http_trace_layer(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan, DefaultOnRequest, ResponseLogger> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(ResponseLogger::default())
}
