//! Per-client admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → middleware.rs (extract client IP, consult registry)
//!     → registry.rs (find or create the client's entry)
//!     → bucket.rs (refill + consume one token)
//!     → admitted: pass to the forward handler
//!     → rejected: synthesize 429 Too Many Requests
//!
//! Independently of any request:
//!     janitor.rs sweeps the registry on a fixed cadence and
//!     evicts entries idle for longer than the staleness threshold.
//! ```
//!
//! # Design Decisions
//! - Two-tier locking: the registry lock covers only map insert/lookup/
//!   removal; each entry carries its own lock for bucket arithmetic. The
//!   registry lock is never held while an entry lock is acquired.
//! - Eviction is a full reset: a client seen again after eviction starts
//!   with a full bucket.
//! - All limiter state is process-local and lost on restart.

pub mod bucket;
pub mod janitor;
pub mod middleware;
pub mod registry;

pub use bucket::TokenBucket;
pub use janitor::Janitor;
pub use middleware::{admission_middleware, AdmissionControl};
pub use registry::ClientRegistry;
