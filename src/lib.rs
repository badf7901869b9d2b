//! Request orchestration for the FTS road-transport self-service site.
//!
//! All outbound calls (booking creation, tracking lookup, pincode
//! validation, OTP send/verify, payment order creation/verification) go
//! through one [`net::NetworkClient`] so that rate limiting, response
//! caching, timeouts and error surfacing behave identically everywhere.
//! Page-level code is an external caller of the typed clients in [`api`]
//! and [`payment`].

pub mod api;
pub mod config;
pub mod net;
pub mod observability;
pub mod payment;

pub use config::ClientConfig;
pub use net::executor::{ApiResponse, CallConfig, NetworkClient, RequestError, ResponseBody};
pub use net::notify::{CollectingNotifier, LogNotifier, Notice, Notifier};
