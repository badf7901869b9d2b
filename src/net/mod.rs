//! Network core: the single path every outbound call takes.
//!
//! # Data Flow
//! ```text
//! api::* / payment::orchestrator
//!     → executor.rs (timeout, headers, decode, error surfacing)
//!         → rate_limit.rs (admit/deny per endpoint key)
//!         → cache.rs (GET-only TTL cache)
//!         → reqwest (network I/O)
//!     → notify.rs (one user-facing notice per failure)
//! ```
//!
//! # Design Decisions
//! - No automatic retries: callers re-invoke explicitly
//! - No per-endpoint request coalescing; last writer wins on shared state
//! - Each call owns its own timeout; cancelling one never affects others

pub mod cache;
pub mod executor;
pub mod notify;
pub mod rate_limit;

pub use executor::NetworkClient;
