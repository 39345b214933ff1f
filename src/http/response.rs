//! Synthesized error responses.
//!
//! # Responsibilities
//! - JSON error envelopes in a single, predictable shape
//! - Keep the rate-limit rejection distinguishable from a generic
//!   failure, so clients can back off instead of treating it as an
//!   outage
//!
//! # Design Decisions
//! - Bodies are `{"error": "<message>"}`; machine-parseable, no detail
//!   leakage from internal failures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// 429 for a client that has exhausted its token bucket.
pub fn rate_limit_exceeded() -> Response {
    json_error(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded")
}

/// Generic 500 for internal failures, including panics caught by the
/// recovery layer and a missing peer address.
pub fn server_error() -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "the server encountered a problem and could not process your request",
    )
}

/// 502 when the upstream request could not be completed.
pub fn bad_gateway() -> Response {
    json_error(StatusCode::BAD_GATEWAY, "upstream request failed")
}
