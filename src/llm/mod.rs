pub mod config;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use anyhow::Result;

use crate::engine::classify::Category;
use crate::llm::config::ChatMessage;
use crate::llm::config::ServiceChatRequest;
use crate::llm::config::ServiceChatResponse;

const RETRIES: u32 = 1;
const TEMPERATURE: f32 = 0.3;

pub const COACH_PROMPT: &str = "You are a warm, direct mindset coach. \
    Reply in at most two short sentences. Reflect the user's feeling back to them \
    and hint that a simple daily system can help. No lists, no medical advice.";

#[derive(Debug, thiserror::Error)]
#[error("assistant unavailable: {0}")]
pub struct AssistantError(pub String);

#[async_trait]
pub trait Assistant: Send + Sync {
    async fn complete(&self, prompt: &str, system_prompt: &str) -> Result<String, AssistantError>;
}

pub fn get_provider_from_model(model: &str) -> String {
    let model_lower = model.to_lowercase();
    if model_lower.contains("gigachat") {
        "gigachat".to_string()
    } else if model_lower.contains("deepseek") {
        "deepseek".to_string()
    } else {
        "unknown".to_string()
    }
}

fn build_request(messages: Vec<ChatMessage>, model: String, temperature: f32) -> ServiceChatRequest {
    ServiceChatRequest {
        provider: get_provider_from_model(&model),
        model,
        messages,
        temperature,
    }
}

pub async fn chat(
    service_host: &str,
    messages: Vec<ChatMessage>,
    model: String,
    temperature: f32,
    timeout: Duration,
) -> Result<ServiceChatResponse> {
    let request = build_request(messages, model, temperature);

    let retry_policy = ExponentialBackoff::builder()
        .build_with_max_retries(RETRIES);

    let client = ClientBuilder::new(Client::builder().timeout(timeout).build()?)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

    let response = client
        .post(format!("{}/chat", service_host))
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&request)?)
        .send()
        .await?;

    let text = response.text().await?;
    let response = serde_json::from_str::<ServiceChatResponse>(&text)?;

    Ok(response)
}

/// Ассистент поверх LLM-сервиса (`LLM_SERVICE_HOST`).
pub struct LlmService {
    host: String,
    model: String,
    timeout: Duration,
}

impl LlmService {
    pub fn new(host: &str, model: &str, timeout: Duration) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl Assistant for LlmService {
    async fn complete(&self, prompt: &str, system_prompt: &str) -> Result<String, AssistantError> {
        let messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)];

        let response = chat(&self.host, messages, self.model.clone(), TEMPERATURE, self.timeout)
            .await
            .map_err(|e| AssistantError(e.to_string()))?;

        match response.content.map(|c| c.trim().to_string()) {
            Some(content) if !content.is_empty() => Ok(content),
            _ => Err(AssistantError("empty response".to_string())),
        }
    }
}

/// Ответ без LLM: заготовка по категории.
pub fn fallback_reply(category: Category) -> &'static str {
    category.follow_up()
}
