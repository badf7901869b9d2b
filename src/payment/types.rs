//! Payment flow types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-booking payment lifecycle.
///
/// ```text
/// NoOrder → OrderCreated → AwaitingCheckout → Verifying → Paid
///                                                       ↘ Failed
/// ```
/// `Failed` may retry from `OrderCreated` or abandon to cash-on-delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentState {
    NoOrder,
    OrderCreated { provider_order_id: String },
    AwaitingCheckout { provider_order_id: String },
    Verifying { provider_order_id: String },
    Paid { payment_id: String },
    Failed { reason: String },
}

impl PaymentState {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentState::NoOrder => "no_order",
            PaymentState::OrderCreated { .. } => "order_created",
            PaymentState::AwaitingCheckout { .. } => "awaiting_checkout",
            PaymentState::Verifying { .. } => "verifying",
            PaymentState::Paid { .. } => "paid",
            PaymentState::Failed { .. } => "failed",
        }
    }
}

/// A provider order handed to the checkout widget. Carries only public
/// material; the server-held secret never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    pub order_id: String,
    /// Major units (rupees), as shown to the user.
    pub amount: u64,
    pub currency: String,
    pub key_id: String,
}

/// Request body for `POST /create-order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub booking_id: String,
}

/// Request body for `POST /verify-payment`: the checkout callback payload
/// forwarded verbatim, plus the booking it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub booking_id: String,
}

/// Errors in the payment flow. All recoverable: the caller retries from
/// `OrderCreated` or falls back to cash-on-delivery.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Failed to create payment order: {0}")]
    OrderCreation(String),

    #[error("Payment signature verification failed")]
    VerificationFailed,

    #[error("Invalid payment state: cannot {event} from {from}")]
    InvalidState { from: &'static str, event: &'static str },

    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_types_use_camel_case() {
        let request = VerifyPaymentRequest {
            razorpay_order_id: "order_1".into(),
            razorpay_payment_id: "pay_1".into(),
            razorpay_signature: "ab".into(),
            booking_id: "FTS-1".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("razorpayOrderId").is_some());
        assert!(json.get("bookingId").is_some());

        let order: PaymentOrder = serde_json::from_str(
            r#"{"orderId":"order_1","amount":100,"currency":"INR","keyId":"rzp_test_k"}"#,
        )
        .unwrap();
        assert_eq!(order.order_id, "order_1");
        assert_eq!(order.key_id, "rzp_test_k");
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(PaymentState::NoOrder.label(), "no_order");
        assert_eq!(
            PaymentState::Paid { payment_id: "pay_1".into() }.label(),
            "paid"
        );
    }
}
