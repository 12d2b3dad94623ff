use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::money::CurrencyCode;
use crate::domain::order::PaymentMethod;
use crate::ports::{PaymentIntent, PaymentOutcome, PaymentProcessor, UpstreamError};

const SERVICE: &str = "payment processor";

/// Scripted payment processor: approves everything unless told to decline
pub struct MockPaymentProcessor {
    intents: Mutex<Vec<PaymentIntent>>,
    decline_reason: Mutex<Option<String>>,
    unavailable: AtomicBool,
}

impl MockPaymentProcessor {
    pub fn new() -> Self {
        Self {
            intents: Mutex::new(Vec::new()),
            decline_reason: Mutex::new(None),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Decline every confirmation from now on
    pub async fn decline_with(&self, reason: impl Into<String>) {
        *self.decline_reason.lock().await = Some(reason.into());
    }

    pub async fn approve_all(&self) {
        *self.decline_reason.lock().await = None;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn created_intents(&self) -> Vec<PaymentIntent> {
        self.intents.lock().await.clone()
    }
}

impl Default for MockPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: CurrencyCode,
    ) -> Result<PaymentIntent, UpstreamError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UpstreamError::unavailable(SERVICE, "connection refused"));
        }
        if amount_minor <= 0 {
            return Err(UpstreamError::rejected(SERVICE, format!("invalid amount {amount_minor}")));
        }

        let id = format!("pi_{}", Uuid::new_v4().simple());
        let intent = PaymentIntent {
            client_secret: format!("{id}_secret_{}", Uuid::new_v4().simple()),
            id,
            amount_minor,
            currency,
        };

        self.intents.lock().await.push(intent.clone());
        Ok(intent)
    }

    async fn confirm_payment(
        &self,
        intent: &PaymentIntent,
        _method: &PaymentMethod,
    ) -> Result<PaymentOutcome, UpstreamError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UpstreamError::unavailable(SERVICE, "connection refused"));
        }

        let known = self
            .intents
            .lock()
            .await
            .iter()
            .any(|created| created.id == intent.id && created.client_secret == intent.client_secret);
        if !known {
            return Err(UpstreamError::rejected(SERVICE, format!("unknown payment intent {}", intent.id)));
        }

        match self.decline_reason.lock().await.clone() {
            Some(reason) => Ok(PaymentOutcome::Declined { reason }),
            None => Ok(PaymentOutcome::Succeeded(intent.clone())),
        }
    }
}
