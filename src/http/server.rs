//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router and middleware stack
//! - Run the admission check before any forwarding work
//! - Forward admitted requests to the configured upstream
//! - Serve until the shutdown signal, then drain gracefully
//! - Spawn the registry janitor alongside the server

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{HeaderValue, Request, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admission::{admission_middleware, AdmissionControl, Janitor};
use crate::config::validation::ValidationError;
use crate::config::{ConfigError, GatewayConfig};
use crate::http::recovery;
use crate::http::request::{RequestIdExt, RequestIdLayer, X_REQUEST_ID};
use crate::http::response;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Application state injected into the forward handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
}

/// HTTP server for the admission gateway.
pub struct HttpServer {
    router: Router,
    admission: Arc<AdmissionControl>,
}

impl HttpServer {
    /// Create a new server from validated configuration.
    pub fn new(
        config: GatewayConfig,
        admission: Arc<AdmissionControl>,
    ) -> Result<Self, ConfigError> {
        let upstream = Authority::from_str(&config.upstream.address).map_err(|_| {
            ConfigError::Validation(vec![ValidationError {
                field: "upstream.address".to_string(),
                message: "must be a valid host:port authority".to_string(),
            }])
        })?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState { client, upstream };
        let router = Self::build_router(&config, state, admission.clone());

        Ok(Self { router, admission })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Outermost first: request ID, trace, panic recovery, timeout,
    /// admission. Recovery wraps admission, never the reverse.
    fn build_router(
        config: &GatewayConfig,
        state: AppState,
        admission: Arc<AdmissionControl>,
    ) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state)
            .layer(axum::middleware::from_fn_with_state(
                admission,
                admission_middleware,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(CatchPanicLayer::custom(recovery::handle_panic))
            .layer(TraceLayer::new_for_http())
            .layer(RequestIdLayer)
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        if self.admission.enabled() {
            let janitor = Janitor::new(self.admission.registry().clone());
            let janitor_shutdown = shutdown.subscribe();
            tokio::spawn(async move {
                janitor.run(janitor_shutdown).await;
            });
        }

        // Peer addresses are required for client identification.
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let mut server_shutdown = shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "available",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Forward an admitted request to the upstream service.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.request_id().to_string();
    let (mut parts, body) = request.into_parts();

    // Point the request at the upstream, preserving path and query.
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    let uri = Uri::from_parts(uri_parts).unwrap_or_else(|_| parts.uri.clone());
    parts.uri = uri;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(X_REQUEST_ID, value);
    }

    let upstream_request = Request::from_parts(parts, body);

    match state.client.request(upstream_request).await {
        Ok(upstream_response) => {
            let status = upstream_response.status();
            metrics::record_forwarded(status.as_u16());
            tracing::debug!(
                request_id = %request_id,
                status = %status,
                "Forwarded request"
            );

            let (parts, body) = upstream_response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                error = %e,
                "Upstream request failed"
            );
            metrics::record_forwarded(502);
            response::bad_gateway()
        }
    }
}
