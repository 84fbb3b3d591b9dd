pub mod paystack;

use async_trait::async_trait;
use serde_json::Value;

pub use paystack::Paystack;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment request failed: {0}")]
    Transport(String),
    #[error("payment provider rejected request: {0}")]
    Rejected(String),
    #[error("unexpected payment response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub email: String,
    /// В минимальных единицах валюты (kobo, cents).
    pub amount: u64,
    pub currency: String,
    pub reference: String,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub authorization_url: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub success: bool,
    pub amount: u64,
    pub metadata: Value,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: ChargeRequest) -> Result<Checkout, PaymentError>;

    async fn verify(&self, reference: &str) -> Result<Verification, PaymentError>;
}
