//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (stamp request ID)
//!     → recovery.rs (catch panics from everything below)
//!     → admission middleware (admit or reject)
//!     → server.rs forward handler (rewrite URI, send upstream)
//!     → response.rs (error envelopes for rejected/failed requests)
//! ```

pub mod recovery;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
