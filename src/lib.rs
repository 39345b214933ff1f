//! Turnstile: per-client admission control gateway.
//!
//! # Architecture Overview
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 TURNSTILE                     │
//!                       │                                               │
//!   Client Request      │  ┌─────────┐   ┌───────────┐   ┌──────────┐  │
//!   ────────────────────┼─▶│  http   │──▶│ admission │──▶│ forward  │──┼──▶ Upstream
//!                       │  │ server  │   │middleware │   │ handler  │  │    Service
//!                       │  └─────────┘   └─────┬─────┘   └──────────┘  │
//!                       │                      │                       │
//!                       │                      ▼                       │
//!                       │               ┌──────────────┐               │
//!                       │               │   registry   │◀── janitor    │
//!                       │               │ (per-client  │    (periodic  │
//!                       │               │token buckets)│     sweep)    │
//!                       │               └──────────────┘               │
//!                       │                                               │
//!                       │  ┌─────────────────────────────────────────┐ │
//!                       │  │         Cross-Cutting Concerns           │ │
//!                       │  │  ┌────────┐ ┌─────────────┐ ┌─────────┐ │ │
//!                       │  │  │ config │ │observability│ │lifecycle│ │ │
//!                       │  │  └────────┘ └─────────────┘ └─────────┘ │ │
//!                       │  └─────────────────────────────────────────┘ │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! Requests that exhaust their client's token bucket receive a 429
//! without ever reaching the upstream; a background janitor evicts
//! clients idle past a staleness threshold so registry memory stays
//! bounded under churn. All limiter state is process-local and is
//! intentionally lost on restart.

pub mod admission;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use admission::AdmissionControl;
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
