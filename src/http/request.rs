//! Request ID stamping.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID as early as possible
//! - Respect an ID already supplied by the client
//! - Expose the ID to handlers via a request extension
//!
//! # Design Decisions
//! - The ID lives in both the `x-request-id` header (propagated upstream)
//!   and a typed extension (for log correlation)

use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID end to end.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Typed extension holding the request's correlation ID.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Convenience accessor for the stamped request ID.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("unknown")
    }
}

/// Tower layer that stamps every request with an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Ok(value) = HeaderValue::from_str(&id) {
            request.headers_mut().insert(X_REQUEST_ID, value);
        }
        request.extensions_mut().insert(RequestId(id));

        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Response;
    use std::convert::Infallible;
    use tower::ServiceExt;

    async fn probe(request: Request<Body>) -> Result<Response<Body>, Infallible> {
        let id = request.request_id().to_string();
        let header = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert_eq!(id, header);
        Ok(Response::new(Body::from(id)))
    }

    #[tokio::test]
    async fn stamps_missing_request_id() {
        let service = RequestIdLayer.layer(tower::service_fn(probe));

        let response = service
            .oneshot(Request::new(Body::empty()))
            .await
            .expect("probe service is infallible");

        let id = axum::body::to_bytes(response.into_body(), 1024).await.expect("body");
        assert!(!id.is_empty());
        assert!(Uuid::parse_str(std::str::from_utf8(&id).expect("utf8")).is_ok());
    }

    #[tokio::test]
    async fn preserves_client_supplied_id() {
        let service = RequestIdLayer.layer(tower::service_fn(probe));

        let request = Request::builder()
            .header(X_REQUEST_ID, "trace-me-7")
            .body(Body::empty())
            .expect("request builds");

        let response = service.oneshot(request).await.expect("probe service is infallible");
        let id = axum::body::to_bytes(response.into_body(), 1024).await.expect("body");
        assert_eq!(&id[..], b"trace-me-7");
    }
}
