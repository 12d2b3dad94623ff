use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::money::CurrencyCode;
use crate::domain::order::PaymentMethod;
use super::UpstreamError;

/// Amounts cross this boundary in minor units (cents) only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount_minor: i64,
    pub currency: CurrencyCode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Succeeded(PaymentIntent),
    Declined { reason: String },
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: CurrencyCode,
    ) -> Result<PaymentIntent, UpstreamError>;

    async fn confirm_payment(
        &self,
        intent: &PaymentIntent,
        method: &PaymentMethod,
    ) -> Result<PaymentOutcome, UpstreamError>;
}
