//! Request logging middleware

use super::super::state::ServerState;
use crate::server::metrics::record_http_request;
use axum::extract::State;
use axum::{
    body::Body,
    http::{header::HeaderMap, header::CONTENT_LENGTH, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, info};

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
    Body,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

const MAX_LOGGABLE_BODY_LENGTH: usize = 1024;

/// Which side of the exchange a log line describes.
#[derive(Clone, Copy, Debug)]
enum Direction {
    Request,
    Response,
}

impl Direction {
    fn tag(self) -> &'static str {
        match self {
            Direction::Request => "Req",
            Direction::Response => "Resp",
        }
    }
}

fn content_length(headers: &HeaderMap) -> Result<usize, &'static str> {
    headers
        .get(CONTENT_LENGTH)
        .ok_or("Content-length not set.")?
        .to_str()
        .map_err(|_| "Could not get Content-length string value.")?
        .parse::<usize>()
        .map_err(|_| "Could not parse Content-length numeric value.")
}

fn log_headers(direction: Direction, headers: &HeaderMap) {
    info!("  {} Headers:", direction.tag());
    for (name, value) in headers {
        info!("    {:?}: {:?}", name, value);
    }
}

/// Logs a body small enough to buffer and returns an equivalent body.
/// Bodies without a usable content length, or too large, pass through untouched.
async fn log_body(
    direction: Direction,
    headers: &HeaderMap,
    body: Body,
) -> Result<Body, axum::Error> {
    let tag = direction.tag();
    match content_length(headers) {
        Err(reason) => {
            info!("  {} Body: {}", tag, reason);
            Ok(body)
        }
        Ok(size) if size >= MAX_LOGGABLE_BODY_LENGTH => {
            info!(
                "  {} Body: Too big to log ({:#})",
                tag,
                byte_unit::Byte::from(size)
            );
            Ok(body)
        }
        Ok(size) => {
            let bytes = axum::body::to_bytes(body, size).await?;
            info!("  {} Body:\n{}", tag, String::from_utf8_lossy(&bytes));
            Ok(Body::from(bytes))
        }
    }
}

/// Collapses request paths into a bounded set of metric labels.
pub fn endpoint_label(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/v1/filters" => "/v1/filters",
        "/v1/dashboard" => "/v1/dashboard",
        "/v1/reference/global" => "/v1/reference/global",
        _ => "static",
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

pub async fn log_requests(
    State(state): State<ServerState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let level = state.config.requests_logging_level.clone();
    let start = Instant::now();

    let method = request.method().to_string();
    let endpoint = endpoint_label(request.uri().path());

    if level > RequestsLoggingLevel::None {
        info!(">>> {} {}", method, request.uri());
    }
    if level >= RequestsLoggingLevel::Headers {
        log_headers(Direction::Request, request.headers());
    }
    if level >= RequestsLoggingLevel::Body {
        let (parts, body) = request.into_parts();
        match log_body(Direction::Request, &parts.headers, body).await {
            Ok(body) => request = Request::from_parts(parts, body),
            Err(err) => {
                error!("Failed to read request body: {:?}", err);
                return internal_error();
            }
        }
    }

    let mut response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        log_headers(Direction::Response, response.headers());
    }
    if level >= RequestsLoggingLevel::Body {
        let (parts, body) = response.into_parts();
        match log_body(Direction::Response, &parts.headers, body).await {
            Ok(body) => response = Response::from_parts(parts, body),
            Err(err) => {
                error!("Failed to read response body: {:?}", err);
                return internal_error();
            }
        }
    }

    let status = response.status().as_u16();
    let duration = start.elapsed();

    if level > RequestsLoggingLevel::None {
        info!("<<< {} ({}ms)", status, duration.as_millis());
    }

    record_http_request(&method, endpoint, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_length(length: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_str(length).unwrap());
        headers
    }

    #[test]
    fn level_ordering() {
        let none = RequestsLoggingLevel::None;

        assert!(none < RequestsLoggingLevel::Headers);
        assert!(RequestsLoggingLevel::Body > RequestsLoggingLevel::None);
        assert_eq!(RequestsLoggingLevel::default(), RequestsLoggingLevel::Path);
    }

    #[test]
    fn endpoint_labels_are_bounded() {
        assert_eq!(endpoint_label("/v1/dashboard"), "/v1/dashboard");
        assert_eq!(endpoint_label("/assets/app.js"), "static");
        assert_eq!(endpoint_label("/v1/filters"), "/v1/filters");
    }

    #[test]
    fn content_length_needs_a_numeric_header() {
        assert_eq!(content_length(&headers_with_length("42")), Ok(42));
        assert!(content_length(&headers_with_length("many")).is_err());
        assert!(content_length(&HeaderMap::new()).is_err());
    }

    #[tokio::test]
    async fn logged_body_is_handed_back_intact() {
        let payload = r#"{"genres":["jazz"]}"#;
        let headers = headers_with_length(&payload.len().to_string());

        let body = log_body(Direction::Request, &headers, Body::from(payload))
            .await
            .unwrap();

        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(bytes, payload.as_bytes());
    }

    #[tokio::test]
    async fn oversized_body_passes_through() {
        let payload = "x".repeat(MAX_LOGGABLE_BODY_LENGTH * 2);
        let headers = headers_with_length(&payload.len().to_string());

        let body = log_body(Direction::Response, &headers, Body::from(payload.clone()))
            .await
            .unwrap();

        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(bytes.len(), payload.len());
    }
}
