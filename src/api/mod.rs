//! Typed domain clients over the network core.
//!
//! Each function fixes the endpoint path, HTTP method and per-endpoint
//! executor configuration (rate limit, cache TTL, timeout); pages call
//! these, never the executor directly.

pub mod bookings;
pub mod otp;
pub mod types;

pub use bookings::FtsApi;
pub use otp::{normalize_phone, OtpClient, OtpError, OtpWireFormat, PlainJson};
pub use types::{BookingRequest, BookingResponse, TrackingResponse, TrackingStatusItem};
