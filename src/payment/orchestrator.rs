//! Client side of the two-phase payment flow.
//!
//! Holds only public material (key id, provider order id). The checkout
//! callback is forwarded verbatim to the trusted verifier; this code never
//! decides on its own that a payment succeeded.

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use crate::config::ClientConfig;
use crate::net::executor::{CallConfig, NetworkClient, RequestError};
use crate::payment::types::{PaymentError, PaymentOrder, PaymentState};

/// Payload the checkout widget hands back on completion.
#[derive(Debug, Clone)]
pub struct CheckoutCallback {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Drives one booking's payment through
/// `NoOrder → OrderCreated → AwaitingCheckout → Verifying → Paid | Failed`.
pub struct PaymentFlow {
    net: Arc<NetworkClient>,
    function_base: String,
    booking_id: String,
    state: PaymentState,
}

impl PaymentFlow {
    pub fn new(net: Arc<NetworkClient>, config: &ClientConfig, booking_id: impl Into<String>) -> Self {
        Self {
            net,
            function_base: config
                .endpoints
                .payment_function_base
                .trim_end_matches('/')
                .to_string(),
            booking_id: booking_id.into(),
            state: PaymentState::NoOrder,
        }
    }

    /// Rebuild a flow from the state persisted for `booking_id`, so a
    /// page reload picks up where checkout left off instead of restarting
    /// at `NoOrder`.
    pub async fn resume(
        net: Arc<NetworkClient>,
        config: &ClientConfig,
        booking_id: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        let mut flow = Self::new(net, config, booking_id);
        let url = format!("{}/bookings/{}", flow.function_base, flow.booking_id);

        let response = flow
            .net
            .get(&url, &CallConfig::default())
            .await
            .map_err(|e| match e {
                RequestError::Http { status: 404, .. } => {
                    PaymentError::BookingNotFound(flow.booking_id.clone())
                }
                other => PaymentError::Provider(other.to_string()),
            })?;

        let state = response
            .data
            .as_json()
            .and_then(|v| v.get("state"))
            .cloned()
            .ok_or_else(|| PaymentError::Provider("booking status carried no state".to_string()))?;
        flow.state = serde_json::from_value(state).map_err(|e| PaymentError::Provider(e.to_string()))?;

        tracing::info!(
            booking_id = %flow.booking_id,
            state = flow.state.label(),
            "Payment flow resumed"
        );
        Ok(flow)
    }

    pub fn state(&self) -> &PaymentState {
        &self.state
    }

    pub fn booking_id(&self) -> &str {
        &self.booking_id
    }

    /// Ask the trusted function for a provider order. Allowed from
    /// `NoOrder`, and from `Failed` as the retry path.
    pub async fn create_order(&mut self) -> Result<PaymentOrder, PaymentError> {
        match self.state {
            PaymentState::NoOrder | PaymentState::Failed { .. } => {}
            _ => {
                return Err(PaymentError::InvalidState {
                    from: self.state.label(),
                    event: "create order",
                })
            }
        }

        let url = format!("{}/create-order", self.function_base);
        let response = self
            .net
            .post(&url, json!({ "bookingId": self.booking_id }), &CallConfig::default())
            .await
            .map_err(|e| PaymentError::OrderCreation(e.to_string()))?;

        let order: PaymentOrder = match response.data.parse() {
            Ok(order) => order,
            Err(e) => {
                self.net.surface_error(&Method::POST, &url, &e);
                return Err(PaymentError::OrderCreation(e.to_string()));
            }
        };

        self.state = PaymentState::OrderCreated {
            provider_order_id: order.order_id.clone(),
        };
        tracing::info!(
            booking_id = %self.booking_id,
            provider_order_id = %order.order_id,
            "Payment order created"
        );
        Ok(order)
    }

    /// The checkout widget has been opened with the order's public ids.
    pub fn checkout_opened(&mut self) -> Result<(), PaymentError> {
        let PaymentState::OrderCreated { provider_order_id } = &self.state else {
            return Err(PaymentError::InvalidState {
                from: self.state.label(),
                event: "open checkout",
            });
        };
        self.state = PaymentState::AwaitingCheckout {
            provider_order_id: provider_order_id.clone(),
        };
        Ok(())
    }

    /// Forward the checkout callback to the verifier. The booking is paid
    /// only if the server says so; every other outcome lands in `Failed`,
    /// from which `create_order` may retry.
    pub async fn submit_callback(&mut self, callback: CheckoutCallback) -> Result<(), PaymentError> {
        let PaymentState::AwaitingCheckout { provider_order_id } = &self.state else {
            return Err(PaymentError::InvalidState {
                from: self.state.label(),
                event: "submit checkout callback",
            });
        };
        self.state = PaymentState::Verifying {
            provider_order_id: provider_order_id.clone(),
        };

        let body = json!({
            "razorpayOrderId": callback.order_id,
            "razorpayPaymentId": callback.payment_id,
            "razorpaySignature": callback.signature,
            "bookingId": self.booking_id,
        });

        let result = self
            .net
            .post(
                &format!("{}/verify-payment", self.function_base),
                body,
                &CallConfig::default(),
            )
            .await;

        match result {
            Ok(response) => {
                let verified = response
                    .data
                    .as_json()
                    .and_then(|v| v.get("status"))
                    .and_then(|s| s.as_str())
                    .map(|s| s == "success")
                    .unwrap_or(false);
                if verified {
                    self.state = PaymentState::Paid {
                        payment_id: callback.payment_id,
                    };
                    tracing::info!(booking_id = %self.booking_id, "Payment verified");
                    Ok(())
                } else {
                    self.state = PaymentState::Failed {
                        reason: "verifier did not confirm".to_string(),
                    };
                    Err(PaymentError::VerificationFailed)
                }
            }
            Err(RequestError::Http { .. }) => {
                self.state = PaymentState::Failed {
                    reason: "verifier rejected signature".to_string(),
                };
                Err(PaymentError::VerificationFailed)
            }
            Err(e) => {
                self.state = PaymentState::Failed {
                    reason: e.to_string(),
                };
                Err(PaymentError::Provider(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> PaymentFlow {
        PaymentFlow::new(
            Arc::new(NetworkClient::new()),
            &ClientConfig::default(),
            "FTS-1",
        )
    }

    #[test]
    fn test_checkout_requires_order() {
        let mut flow = flow();
        assert_eq!(flow.state(), &PaymentState::NoOrder);
        assert!(matches!(
            flow.checkout_opened(),
            Err(PaymentError::InvalidState { event: "open checkout", .. })
        ));
    }

    #[tokio::test]
    async fn test_callback_requires_awaiting_checkout() {
        let mut flow = flow();
        let result = flow
            .submit_callback(CheckoutCallback {
                order_id: "order_1".into(),
                payment_id: "pay_1".into(),
                signature: "sig".into(),
            })
            .await;
        assert!(matches!(
            result,
            Err(PaymentError::InvalidState { event: "submit checkout callback", .. })
        ));
        // Premature callbacks must not advance the state.
        assert_eq!(flow.state(), &PaymentState::NoOrder);
    }
}
