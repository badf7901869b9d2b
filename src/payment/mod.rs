//! Two-phase payment flow.
//!
//! # Data Flow
//! ```text
//! orchestrator.rs (client, public material only)
//!     → server.rs POST /create-order  ── provider order API (secret held here)
//!     ← {orderId, amount, currency, keyId}
//!     → checkout widget (external)
//!     ← callback {orderId, paymentId, signature}
//!     → server.rs POST /verify-payment ── HMAC-SHA256 recompute
//!     → store.rs: booking marked paid
//! ```
//!
//! # Design Decisions
//! - Signature verification happens where the shared secret lives, never
//!   in the client; the checkout success callback alone is never trusted
//! - State transitions are persisted per booking id so a reload mid-flow
//!   resumes by re-querying, not from in-memory flags

pub mod orchestrator;
pub mod server;
pub mod signature;
pub mod store;
pub mod types;

pub use orchestrator::{CheckoutCallback, PaymentFlow};
pub use store::{BookingRecord, BookingStore, MemoryStore};
pub use types::{PaymentError, PaymentOrder, PaymentState};
