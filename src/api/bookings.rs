//! Booking, tracking and pincode clients for the external transport API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;

use crate::api::types::{BookingRequest, BookingResponse, TrackingResponse};
use crate::config::ClientConfig;
use crate::net::executor::{CallConfig, NetworkClient, RequestError, ResponseBody};

/// Client for the booking/tracking REST API.
pub struct FtsApi {
    net: Arc<NetworkClient>,
    base: String,
    window: Duration,
    booking_limit: u32,
    pincode_limit: u32,
    booking_timeout: Duration,
    pincode_timeout: Duration,
    tracking_ttl: Duration,
    pincode_ttl: Duration,
}

impl FtsApi {
    pub fn new(net: Arc<NetworkClient>, config: &ClientConfig) -> Self {
        Self {
            net,
            base: config.endpoints.booking_api_base.trim_end_matches('/').to_string(),
            window: Duration::from_millis(config.rate_limit.window_ms),
            booking_limit: config.rate_limit.booking_limit,
            pincode_limit: config.rate_limit.pincode_limit,
            booking_timeout: Duration::from_millis(config.timeouts.booking_ms),
            pincode_timeout: Duration::from_millis(config.timeouts.pincode_ms),
            tracking_ttl: Duration::from_millis(config.cache.tracking_ttl_ms),
            pincode_ttl: Duration::from_millis(config.cache.default_ttl_ms),
        }
    }

    /// Create a booking. Not idempotent, so never cached; the tight rate
    /// limit stops double-submits from the form.
    pub async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingResponse, RequestError> {
        let body = serde_json::to_value(request).map_err(|e| RequestError::Decode(e.to_string()))?;
        let cfg = CallConfig::default()
            .with_rate_limit(self.booking_limit, self.window)
            .with_timeout(self.booking_timeout);
        let url = format!("{}/book", self.base);

        let response = self.net.post(&url, body, &cfg).await?;
        self.parse_body(&Method::POST, &url, &response.data)
    }

    /// Look up a shipment by order id. Cached briefly so a user mashing
    /// refresh does not hammer the upstream.
    pub async fn track_booking(&self, order_id: &str) -> Result<TrackingResponse, RequestError> {
        let cfg = CallConfig::default().cached(self.tracking_ttl);
        let url = format!("{}/track?orderid={}", self.base, order_id);

        let response = self.net.get(&url, &cfg).await?;
        self.parse_body(&Method::GET, &url, &response.data)
    }

    /// Typed decode of a successful body. A 2xx response that does not
    /// match the contract is still a failure the user hears about once.
    fn parse_body<T: serde::de::DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        data: &ResponseBody,
    ) -> Result<T, RequestError> {
        match data.parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                self.net.surface_error(method, url, &e);
                Err(e)
            }
        }
    }

    /// Advisory serviceability check. Never fails: network errors,
    /// malformed bodies and non-2xx statuses all degrade to `false`,
    /// with no user-facing notice.
    pub async fn validate_pin_code(&self, pincode: &str) -> bool {
        let cfg = CallConfig::default()
            .with_rate_limit(self.pincode_limit, self.window)
            .with_timeout(self.pincode_timeout)
            .cached(self.pincode_ttl)
            .quiet();
        let url = format!("{}/validate-pincode?pincode={}", self.base, pincode);

        match self.net.get(&url, &cfg).await {
            Ok(response) => response
                .data
                .as_json()
                .and_then(|v| v.get("valid"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}
