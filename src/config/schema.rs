//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Hosts live here, never hard-coded in the core or its tests.

use serde::{Deserialize, Serialize};

/// Root configuration for the orchestration layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// External service base URLs.
    pub endpoints: EndpointConfig,

    /// Client-side rate limit defaults and per-endpoint overrides.
    pub rate_limit: RateLimitConfig,

    /// Response cache TTLs.
    pub cache: CacheConfig,

    /// Per-endpoint call timeouts.
    pub timeouts: TimeoutConfig,

    /// Payment service settings (provider API, secrets, bind address).
    pub payment: PaymentConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Base URLs of the external collaborators.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Booking/tracking REST API.
    pub booking_api_base: String,

    /// OTP provider.
    pub otp_base: String,

    /// Trusted payment functions (create-order / verify-payment).
    pub payment_function_base: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            booking_api_base: "https://fts-api.vercel.app".to_string(),
            otp_base: "https://aqualemur.onpella.app".to_string(),
            payment_function_base: "http://127.0.0.1:8090/payment".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Default requests per window.
    pub default_limit: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Booking creation is not idempotent: tighter limit.
    pub booking_limit: u32,

    /// Pincode validation is advisory and chatty: looser limit.
    pub pincode_limit: u32,

    /// OTP send triggers an SMS per call: tight limit.
    pub otp_send_limit: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            window_ms: 60_000,
            booking_limit: 3,
            pincode_limit: 10,
            otp_send_limit: 3,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Default TTL for opted-in GET responses, milliseconds.
    pub default_ttl_ms: u64,

    /// Tracking lookups tolerate slightly stale data.
    pub tracking_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: 60_000,
            tracking_ttl_ms: 30_000,
        }
    }
}

/// Timeout configuration, milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub default_ms: u64,

    /// Booking creation is a critical write: shorter, caller retries.
    pub booking_ms: u64,

    /// Pincode validation is interactive: fail fast.
    pub pincode_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_ms: 30_000,
            booking_ms: 10_000,
            pincode_ms: 5_000,
        }
    }
}

/// OTP resend cooldown, seconds. Part of the rate limit section's concern
/// but configured separately because it is per phone, not per endpoint.
pub const OTP_RESEND_COOLDOWN_SECS: u64 = 30;

/// Payment service configuration.
///
/// The provider key id/secret are read from the named environment
/// variables inside the payment service only; the client library never
/// sees the secret.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Payment provider REST API base.
    pub provider_api_base: String,

    /// Currency for created orders.
    pub currency: String,

    /// Environment variable holding the provider key id.
    pub key_id_env: String,

    /// Environment variable holding the provider key secret.
    pub key_secret_env: String,

    /// Bind address for the verification service.
    pub bind_address: String,

    /// Default order amount (major units) when a booking has none recorded.
    pub default_amount: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider_api_base: "https://api.razorpay.com".to_string(),
            currency: "INR".to_string(),
            key_id_env: "RAZORPAY_KEY_ID".to_string(),
            key_secret_env: "RAZORPAY_KEY_SECRET".to_string(),
            bind_address: "127.0.0.1:8090".to_string(),
            default_amount: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_endpoint_contracts() {
        let config = ClientConfig::default();
        assert_eq!(config.rate_limit.default_limit, 5);
        assert_eq!(config.rate_limit.booking_limit, 3);
        assert_eq!(config.rate_limit.pincode_limit, 10);
        assert_eq!(config.cache.tracking_ttl_ms, 30_000);
        assert_eq!(config.timeouts.booking_ms, 10_000);
        assert_eq!(config.payment.currency, "INR");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [endpoints]
            booking_api_base = "http://localhost:3000"

            [rate_limit]
            booking_limit = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoints.booking_api_base, "http://localhost:3000");
        assert_eq!(config.rate_limit.booking_limit, 2);
        assert_eq!(config.rate_limit.default_limit, 5);
        assert_eq!(config.timeouts.default_ms, 30_000);
    }
}
