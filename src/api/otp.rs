//! Phone-number verification against the external OTP provider.
//!
//! # Design Decisions
//! - Numbers are normalized to the `91`-prefixed canonical form before
//!   anything touches the wire
//! - Sending carries its own client-side limit and a per-phone resend
//!   cooldown, independent of the executor's limiting
//! - Verification fails closed: only an explicit `verified: true` counts
//! - The wire format is a pluggable trait so the envelope can change
//!   (older iterations of the provider used an encrypted one) without
//!   touching call sites

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::schema::OTP_RESEND_COOLDOWN_SECS;
use crate::config::ClientConfig;
use crate::net::executor::{CallConfig, NetworkClient, RequestError, ResponseBody};
use crate::net::notify::Notice;
use crate::net::rate_limit::{Admission, RateLimiter};

/// Key for the OTP client's private send limiter.
const SEND_LIMITER_KEY: &str = "otp:send";

/// Errors specific to the OTP flow.
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("Please wait {remaining_secs} seconds before requesting another code")]
    CooldownActive { remaining_secs: u64 },

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Encoding of OTP requests/responses on the wire.
pub trait OtpWireFormat: Send + Sync {
    fn encode_send(&self, phone: &str) -> Value;
    fn encode_verify(&self, phone: &str, code: &str) -> Value;

    /// Extract the verification verdict. Anything that is not an explicit
    /// `verified: true` is a failure.
    fn decode_verify(&self, body: &ResponseBody) -> bool;
}

/// Plain-JSON wire format: `{phone}` / `{phone, otp}` / `{verified}`.
pub struct PlainJson;

impl OtpWireFormat for PlainJson {
    fn encode_send(&self, phone: &str) -> Value {
        json!({ "phone": phone })
    }

    fn encode_verify(&self, phone: &str, code: &str) -> Value {
        json!({ "phone": phone, "otp": code })
    }

    fn decode_verify(&self, body: &ResponseBody) -> bool {
        body.as_json()
            .and_then(|v| v.get("verified"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Normalize a user-entered phone number to `91` + 10 digits.
///
/// Strips separators and leading zeros; a bare 10-digit number gets the
/// country code prefixed. Anything else is returned digit-stripped for
/// the caller to reject.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.trim_start_matches('0');
    if digits.len() == 10 {
        format!("91{digits}")
    } else {
        digits.to_string()
    }
}

fn is_canonical(phone: &str) -> bool {
    phone.len() == 12 && phone.starts_with("91")
}

/// Client for the OTP provider.
pub struct OtpClient {
    net: Arc<NetworkClient>,
    base: String,
    wire: Box<dyn OtpWireFormat>,
    send_limiter: RateLimiter,
    send_limit: u32,
    window: Duration,
    cooldown: Duration,
    last_sent: Mutex<HashMap<String, Instant>>,
}

impl OtpClient {
    pub fn new(net: Arc<NetworkClient>, config: &ClientConfig) -> Self {
        Self::with_wire_format(net, config, Box::new(PlainJson))
    }

    pub fn with_wire_format(
        net: Arc<NetworkClient>,
        config: &ClientConfig,
        wire: Box<dyn OtpWireFormat>,
    ) -> Self {
        Self {
            net,
            base: config.endpoints.otp_base.trim_end_matches('/').to_string(),
            wire,
            send_limiter: RateLimiter::new(),
            send_limit: config.rate_limit.otp_send_limit,
            window: Duration::from_millis(config.rate_limit.window_ms),
            cooldown: Duration::from_secs(OTP_RESEND_COOLDOWN_SECS),
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    /// Trigger an out-of-band code to `phone`. On success a resend
    /// cooldown starts for that number.
    pub async fn send_otp(&self, phone: &str) -> Result<(), OtpError> {
        let phone = normalize_phone(phone);
        if !is_canonical(&phone) {
            return Err(OtpError::InvalidPhone);
        }

        if let Some(remaining) = self.resend_available_in(&phone) {
            return Err(OtpError::CooldownActive {
                remaining_secs: remaining.as_secs().max(1),
            });
        }

        if let Admission::Denied { retry_after_secs } =
            self.send_limiter.admit(SEND_LIMITER_KEY, self.send_limit, self.window)
        {
            self.net.notify(Notice::new(
                "Too many requests",
                format!("Please wait {retry_after_secs} seconds before trying again."),
            ));
            return Err(OtpError::Request(RequestError::RateLimitExceeded {
                retry_after_secs,
            }));
        }

        let body = self.wire.encode_send(&phone);
        self.net
            .post(&format!("{}/otp", self.base), body, &CallConfig::default())
            .await?;

        self.last_sent
            .lock()
            .expect("otp cooldown mutex poisoned")
            .insert(phone, Instant::now());
        tracing::info!("OTP sent");
        Ok(())
    }

    /// Check a code the user entered. `Ok(false)` covers every response
    /// that is not explicitly verified.
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<bool, OtpError> {
        let phone = normalize_phone(phone);
        if !is_canonical(&phone) {
            return Err(OtpError::InvalidPhone);
        }

        let body = self.wire.encode_verify(&phone, code);
        let response = self
            .net
            .post(&format!("{}/verify", self.base), body, &CallConfig::default())
            .await?;

        Ok(self.wire.decode_verify(&response.data))
    }

    /// Time left before a resend to `phone` is permitted, if any.
    /// Expects the canonical form.
    pub fn resend_available_in(&self, phone: &str) -> Option<Duration> {
        let last_sent = self.last_sent.lock().expect("otp cooldown mutex poisoned");
        let sent_at = last_sent.get(phone)?;
        let elapsed = sent_at.elapsed();
        if elapsed < self.cooldown {
            Some(self.cooldown - elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_prefixes_country_code() {
        assert_eq!(normalize_phone("9876543210"), "919876543210");
        assert_eq!(normalize_phone("09876543210"), "919876543210");
        assert_eq!(normalize_phone("+91 98765 43210"), "919876543210");
        assert_eq!(normalize_phone("98765-43210"), "919876543210");
    }

    #[test]
    fn test_normalize_phone_leaves_canonical_alone() {
        assert_eq!(normalize_phone("919876543210"), "919876543210");
    }

    #[test]
    fn test_short_numbers_are_not_canonical() {
        assert!(!is_canonical(&normalize_phone("12345")));
        assert!(is_canonical(&normalize_phone("9876543210")));
    }

    #[test]
    fn test_plain_json_verify_fails_closed() {
        let wire = PlainJson;
        assert!(wire.decode_verify(&ResponseBody::Json(json!({"verified": true}))));
        assert!(!wire.decode_verify(&ResponseBody::Json(json!({"verified": false}))));
        assert!(!wire.decode_verify(&ResponseBody::Json(json!({"status": "ok"}))));
        assert!(!wire.decode_verify(&ResponseBody::Text("verified".into())));
    }
}
