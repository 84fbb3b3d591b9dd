use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChargeRequest, Checkout, PaymentError, PaymentGateway, Verification};

const RETRIES: u32 = 1;

#[derive(Clone)]
pub struct Paystack {
    client: ClientWithMiddleware,
    base_url: String,
    secret_key: String,
}

#[derive(Serialize)]
struct InitializeBody<'a> {
    email: &'a str,
    amount: u64,
    currency: &'a str,
    reference: &'a str,
    metadata: &'a Value,
}

#[derive(Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    #[serde(default)]
    amount: u64,
    #[serde(default)]
    metadata: Value,
}

impl Paystack {
    pub fn new(base_url: &str, secret_key: &str, timeout: Duration) -> Result<Self, PaymentError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let retry_policy = ExponentialBackoff::builder()
            .build_with_max_retries(RETRIES);

        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    async fn read_envelope<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let http_status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        parse_envelope(http_status, &text)
    }
}

fn parse_envelope<T: for<'de> Deserialize<'de>>(
    http_status: StatusCode,
    text: &str,
) -> Result<T, PaymentError> {
    let envelope = serde_json::from_str::<Envelope<T>>(text).map_err(|e| {
        if http_status.is_success() {
            PaymentError::Decode(e.to_string())
        } else {
            PaymentError::Rejected(format!("HTTP {}", http_status))
        }
    })?;

    // HTTP 200 сам по себе ничего не значит, смотрим на status в ответе
    if !envelope.status {
        return Err(PaymentError::Rejected(envelope.message));
    }

    envelope
        .data
        .ok_or_else(|| PaymentError::Decode("missing data".to_string()))
}

#[async_trait]
impl PaymentGateway for Paystack {
    async fn initialize(&self, request: ChargeRequest) -> Result<Checkout, PaymentError> {
        let body = InitializeBody {
            email: &request.email,
            amount: request.amount,
            currency: &request.currency,
            reference: &request.reference,
            metadata: &request.metadata,
        };

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&body).map_err(|e| PaymentError::Decode(e.to_string()))?)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let data: InitializeData = Self::read_envelope(response).await?;

        log::info!("💳 Payment initialized, reference {}", data.reference);

        Ok(Checkout {
            authorization_url: data.authorization_url,
            reference: data.reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<Verification, PaymentError> {
        let response = self
            .client
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .bearer_auth(&self.secret_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let data: VerifyData = Self::read_envelope(response).await?;

        log::info!("🔎 Payment {} verified with status {}", reference, data.status);

        Ok(Verification {
            success: data.status == "success",
            amount: data.amount,
            metadata: data.metadata,
        })
    }
}
