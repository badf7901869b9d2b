//! Trusted payment functions.
//!
//! # Responsibilities
//! - `POST /create-order`: look up the booking's amount, create a provider
//!   order with the server-held secret, persist the provider order id
//! - `POST /verify-payment`: recompute the callback signature and mark the
//!   booking paid on an exact match
//! - `POST /bookings`: register a booking the store does not know yet
//! - `GET /bookings/{id}`: persisted payment status, for flow resumption
//!
//! The provider secret is read from the environment here and nowhere else.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::observability::metrics;
use crate::payment::signature::verify_signature;
use crate::payment::store::{BookingRecord, BookingStore};
use crate::payment::types::{CreateOrderRequest, PaymentError, VerifyPaymentRequest};

/// Client for the payment provider's order API.
pub struct ProviderClient {
    http: reqwest::Client,
    base: String,
}

/// Provider order as returned by its API.
#[derive(Debug, Deserialize)]
struct ProviderOrder {
    id: String,
    /// Minor units (paise).
    amount: u64,
    currency: String,
}

impl ProviderClient {
    pub fn new(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Create an order for `amount` major units, converted to minor units
    /// on the wire as the provider expects.
    async fn create_order(
        &self,
        key_id: &str,
        key_secret: &str,
        booking_id: &str,
        amount: u64,
        currency: &str,
    ) -> Result<ProviderOrder, PaymentError> {
        let response = self
            .http
            .post(format!("{}/v1/orders", self.base))
            .basic_auth(key_id, Some(key_secret))
            .json(&json!({
                "amount": amount * 100,
                "currency": currency,
                "receipt": booking_id,
                "notes": { "bookingId": booking_id },
            }))
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        if let Some(error) = body.get("error") {
            let description = error
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("Failed to create payment order");
            return Err(PaymentError::OrderCreation(description.to_string()));
        }

        serde_json::from_value(body).map_err(|e| PaymentError::Provider(e.to_string()))
    }
}

/// Shared state of the payment service.
pub struct PaymentServiceState {
    store: Arc<dyn BookingStore>,
    provider: ProviderClient,
    key_id: String,
    key_secret: String,
    currency: String,
    default_amount: u64,
}

impl PaymentServiceState {
    pub fn new(
        store: Arc<dyn BookingStore>,
        provider: ProviderClient,
        key_id: String,
        key_secret: String,
        currency: String,
        default_amount: u64,
    ) -> Self {
        Self {
            store,
            provider,
            key_id,
            key_secret,
            currency,
            default_amount,
        }
    }

    /// Build state from configuration, reading the provider credentials
    /// from the environment variables the config names.
    pub fn from_env(config: &ClientConfig, store: Arc<dyn BookingStore>) -> Self {
        let key_id = std::env::var(&config.payment.key_id_env).unwrap_or_default();
        let key_secret = std::env::var(&config.payment.key_secret_env).unwrap_or_default();
        if key_id.is_empty() || key_secret.is_empty() {
            tracing::warn!(
                key_id_env = %config.payment.key_id_env,
                key_secret_env = %config.payment.key_secret_env,
                "Provider credentials missing; order creation will fail"
            );
        }
        Self::new(
            store,
            ProviderClient::new(&config.payment.provider_api_base),
            key_id,
            key_secret,
            config.payment.currency.clone(),
            config.payment.default_amount,
        )
    }
}

/// Build the service router with timeout and trace layers.
pub fn app(state: Arc<PaymentServiceState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify-payment", post(verify_payment))
        .route("/bookings", post(register_booking))
        .route("/bookings/{id}", get(booking_status))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

fn respond(status: StatusCode, body: Value) -> (StatusCode, Json<Value>) {
    (status, Json(body))
}

fn error_body(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

async fn create_order(
    State(state): State<Arc<PaymentServiceState>>,
    Json(request): Json<CreateOrderRequest>,
) -> (StatusCode, Json<Value>) {
    let request_id = Uuid::new_v4();
    if request.booking_id.is_empty() {
        return respond(StatusCode::BAD_REQUEST, error_body("Missing bookingId"));
    }

    let Some(booking) = state.store.get(&request.booking_id) else {
        tracing::warn!(%request_id, booking_id = %request.booking_id, "Unknown booking");
        return respond(StatusCode::NOT_FOUND, error_body("Booking not found"));
    };

    let amount = if booking.amount > 0 {
        booking.amount
    } else {
        state.default_amount
    };

    let order = match state
        .provider
        .create_order(
            &state.key_id,
            &state.key_secret,
            &request.booking_id,
            amount,
            &state.currency,
        )
        .await
    {
        Ok(order) => order,
        Err(e) => {
            tracing::error!(%request_id, booking_id = %request.booking_id, error = %e, "Order creation failed");
            return respond(StatusCode::INTERNAL_SERVER_ERROR, error_body(&e.to_string()));
        }
    };

    if let Err(e) = state
        .store
        .attach_provider_order(&request.booking_id, &order.id)
    {
        tracing::error!(%request_id, booking_id = %request.booking_id, error = %e, "Failed to persist provider order id");
        return respond(StatusCode::INTERNAL_SERVER_ERROR, error_body(&e.to_string()));
    }

    tracing::info!(
        %request_id,
        booking_id = %request.booking_id,
        provider_order_id = %order.id,
        "Payment order created"
    );
    respond(
        StatusCode::OK,
        json!({
            "status": "success",
            "orderId": order.id,
            "amount": order.amount / 100,
            "currency": order.currency,
            "keyId": state.key_id,
        }),
    )
}

async fn verify_payment(
    State(state): State<Arc<PaymentServiceState>>,
    Json(request): Json<VerifyPaymentRequest>,
) -> (StatusCode, Json<Value>) {
    let request_id = Uuid::new_v4();
    if request.razorpay_order_id.is_empty()
        || request.razorpay_payment_id.is_empty()
        || request.razorpay_signature.is_empty()
        || request.booking_id.is_empty()
    {
        return respond(
            StatusCode::BAD_REQUEST,
            error_body("Missing required parameters"),
        );
    }

    let valid = match verify_signature(
        &state.key_secret,
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
    ) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!(%request_id, booking_id = %request.booking_id, error = %e, "Signature check errored");
            return respond(StatusCode::INTERNAL_SERVER_ERROR, error_body(&e.to_string()));
        }
    };

    if !valid {
        tracing::warn!(%request_id, booking_id = %request.booking_id, "Invalid payment signature");
        metrics::record_payment_verification("rejected");
        let _ = state
            .store
            .mark_failed(&request.booking_id, "signature mismatch");
        return respond(
            StatusCode::BAD_REQUEST,
            error_body("Invalid payment signature"),
        );
    }

    if let Err(e) = state
        .store
        .mark_paid(&request.booking_id, &request.razorpay_payment_id)
    {
        return respond(StatusCode::NOT_FOUND, error_body(&e.to_string()));
    }

    tracing::info!(
        %request_id,
        booking_id = %request.booking_id,
        payment_id = %request.razorpay_payment_id,
        "Payment verified"
    );
    metrics::record_payment_verification("verified");
    respond(
        StatusCode::OK,
        json!({ "status": "success", "message": "Payment verified successfully" }),
    )
}

/// Persisted payment status for one booking, queried by clients resuming
/// a flow after a reload.
async fn booking_status(
    State(state): State<Arc<PaymentServiceState>>,
    Path(booking_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let Some(record) = state.store.get(&booking_id) else {
        return respond(StatusCode::NOT_FOUND, error_body("Booking not found"));
    };
    respond(
        StatusCode::OK,
        json!({
            "status": "success",
            "bookingId": record.booking_id,
            "paid": record.paid,
            "paymentOrderId": record.payment_order_id,
            "state": record.state,
        }),
    )
}

/// Booking registration payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBookingRequest {
    booking_id: String,
    amount: u64,
}

async fn register_booking(
    State(state): State<Arc<PaymentServiceState>>,
    Json(request): Json<RegisterBookingRequest>,
) -> (StatusCode, Json<Value>) {
    if request.booking_id.is_empty() {
        return respond(StatusCode::BAD_REQUEST, error_body("Missing bookingId"));
    }
    state
        .store
        .insert(BookingRecord::new(request.booking_id.clone(), request.amount));
    tracing::info!(booking_id = %request.booking_id, "Booking registered");
    respond(StatusCode::OK, json!({ "status": "success" }))
}
