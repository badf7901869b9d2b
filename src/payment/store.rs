//! Booking store seam for the payment service.
//!
//! The managed database is the real system of record; this trait is the
//! slice of it the payment service needs. The in-memory implementation
//! backs tests and single-node deployments.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::payment::types::{PaymentError, PaymentState};

/// A booking as the payment service sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Booking order id assigned by the booking backend.
    pub booking_id: String,
    /// Amount due, major units.
    pub amount: u64,
    /// Provider order id, once one has been created.
    pub payment_order_id: Option<String>,
    pub paid: bool,
    /// Provider payment id, once paid.
    pub payment_id: Option<String>,
    /// Last persisted payment state, for resuming after a reload.
    pub state: PaymentState,
}

impl BookingRecord {
    pub fn new(booking_id: impl Into<String>, amount: u64) -> Self {
        Self {
            booking_id: booking_id.into(),
            amount,
            payment_order_id: None,
            paid: false,
            payment_id: None,
            state: PaymentState::NoOrder,
        }
    }
}

/// Persistence operations the payment service performs.
pub trait BookingStore: Send + Sync {
    fn get(&self, booking_id: &str) -> Option<BookingRecord>;

    fn insert(&self, record: BookingRecord);

    /// Persist the provider order id and move the booking to
    /// `OrderCreated`.
    fn attach_provider_order(
        &self,
        booking_id: &str,
        provider_order_id: &str,
    ) -> Result<(), PaymentError>;

    /// Mark the booking paid and record the payment id. Only called after
    /// signature verification succeeded.
    fn mark_paid(&self, booking_id: &str, payment_id: &str) -> Result<(), PaymentError>;

    /// Record a failed verification; the paid flag is untouched.
    fn mark_failed(&self, booking_id: &str, reason: &str) -> Result<(), PaymentError>;
}

/// DashMap-backed store.
#[derive(Default)]
pub struct MemoryStore {
    inner: DashMap<String, BookingRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl BookingStore for MemoryStore {
    fn get(&self, booking_id: &str) -> Option<BookingRecord> {
        self.inner.get(booking_id).map(|r| r.value().clone())
    }

    fn insert(&self, record: BookingRecord) {
        self.inner.insert(record.booking_id.clone(), record);
    }

    fn attach_provider_order(
        &self,
        booking_id: &str,
        provider_order_id: &str,
    ) -> Result<(), PaymentError> {
        let mut record = self
            .inner
            .get_mut(booking_id)
            .ok_or_else(|| PaymentError::BookingNotFound(booking_id.to_string()))?;
        record.payment_order_id = Some(provider_order_id.to_string());
        record.state = PaymentState::OrderCreated {
            provider_order_id: provider_order_id.to_string(),
        };
        Ok(())
    }

    fn mark_paid(&self, booking_id: &str, payment_id: &str) -> Result<(), PaymentError> {
        let mut record = self
            .inner
            .get_mut(booking_id)
            .ok_or_else(|| PaymentError::BookingNotFound(booking_id.to_string()))?;
        record.paid = true;
        record.payment_id = Some(payment_id.to_string());
        record.state = PaymentState::Paid {
            payment_id: payment_id.to_string(),
        };
        Ok(())
    }

    fn mark_failed(&self, booking_id: &str, reason: &str) -> Result<(), PaymentError> {
        let mut record = self
            .inner
            .get_mut(booking_id)
            .ok_or_else(|| PaymentError::BookingNotFound(booking_id.to_string()))?;
        record.state = PaymentState::Failed {
            reason: reason.to_string(),
        };
        Ok(())
    }
}
