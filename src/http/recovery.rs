//! Panic recovery for the request pipeline.
//!
//! Wired as the layer outside the admission middleware, so an unexpected
//! failure anywhere below it becomes a clean 500 instead of a dropped
//! connection. The admission code itself never suppresses its own panics.

use std::any::Any;

use axum::http::{header, HeaderValue};
use axum::response::Response;

use crate::http::response;

/// Handler for `CatchPanicLayer::custom`: log the panic, close the
/// connection, answer with the generic internal-failure envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    let mut response = response::server_error();
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}
