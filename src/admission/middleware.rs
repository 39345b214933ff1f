//! Admission middleware: the request-path entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use super::registry::ClientRegistry;
use crate::config::RateLimitConfig;
use crate::http::response;
use crate::observability::metrics;

/// Shared admission state injected into the middleware.
pub struct AdmissionControl {
    enabled: bool,
    registry: Arc<ClientRegistry>,
}

impl AdmissionControl {
    /// Build admission state from validated configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            registry: Arc::new(ClientRegistry::new(
                config.requests_per_second,
                config.burst,
            )),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The registry backing this middleware, for wiring up the janitor.
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }
}

/// Per-request admission check.
///
/// Disabled: forward unconditionally, touching neither the registry nor
/// the peer address. Enabled: the client identifier is the IP of the
/// connecting peer; a missing peer address aborts the request with the
/// generic internal-failure response, and an exhausted bucket yields a
/// distinct 429 so clients can back off specifically on rate limiting.
pub async fn admission_middleware(
    State(control): State<Arc<AdmissionControl>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !control.enabled {
        return next.run(request).await;
    }

    // The peer address is attached by `into_make_service_with_connect_info`.
    // Its absence is the transport-address extraction failure.
    let client = match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => addr.ip().to_string(),
        None => {
            tracing::error!("Peer address missing from request extensions");
            metrics::record_admission("error");
            return response::server_error();
        }
    };

    if control.registry.check_and_update(&client, Instant::now()) {
        metrics::record_admission("admitted");
        next.run(request).await
    } else {
        // An expected outcome, not an error.
        tracing::warn!(client = %client, "Rate limit exceeded");
        metrics::record_admission("rejected");
        response::rate_limit_exceeded()
    }
}
