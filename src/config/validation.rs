//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones: URLs must parse,
//! limits and windows must be non-zero, bind addresses must be valid.
//! Returns all errors, not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ClientConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidUrl { field: &'static str, value: String },
    ZeroValue { field: &'static str },
    InvalidBindAddress { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidUrl { field, value } => {
                write!(f, "{field}: '{value}' is not a valid URL")
            }
            ValidationError::ZeroValue { field } => {
                write!(f, "{field}: must be greater than zero")
            }
            ValidationError::InvalidBindAddress { field, value } => {
                write!(f, "{field}: '{value}' is not a valid socket address")
            }
        }
    }
}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "endpoints.booking_api_base", &config.endpoints.booking_api_base);
    check_url(&mut errors, "endpoints.otp_base", &config.endpoints.otp_base);
    check_url(
        &mut errors,
        "endpoints.payment_function_base",
        &config.endpoints.payment_function_base,
    );
    check_url(&mut errors, "payment.provider_api_base", &config.payment.provider_api_base);

    check_nonzero(&mut errors, "rate_limit.default_limit", config.rate_limit.default_limit as u64);
    check_nonzero(&mut errors, "rate_limit.window_ms", config.rate_limit.window_ms);
    check_nonzero(&mut errors, "rate_limit.booking_limit", config.rate_limit.booking_limit as u64);
    check_nonzero(&mut errors, "rate_limit.pincode_limit", config.rate_limit.pincode_limit as u64);
    check_nonzero(&mut errors, "rate_limit.otp_send_limit", config.rate_limit.otp_send_limit as u64);
    check_nonzero(&mut errors, "cache.default_ttl_ms", config.cache.default_ttl_ms);
    check_nonzero(&mut errors, "cache.tracking_ttl_ms", config.cache.tracking_ttl_ms);
    check_nonzero(&mut errors, "timeouts.default_ms", config.timeouts.default_ms);
    check_nonzero(&mut errors, "timeouts.booking_ms", config.timeouts.booking_ms);
    check_nonzero(&mut errors, "timeouts.pincode_ms", config.timeouts.pincode_ms);

    check_bind(&mut errors, "payment.bind_address", &config.payment.bind_address);
    if config.observability.metrics_enabled {
        check_bind(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if url::Url::parse(value).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn check_nonzero(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::ZeroValue { field });
    }
}

fn check_bind(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            field,
            value: value.to_string(),
        });
    }
}
