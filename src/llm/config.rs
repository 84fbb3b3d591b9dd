use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize)]
pub struct ServiceChatRequest {
    pub provider: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceChatResponse {
    pub content: Option<String>
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self { role: "system".to_string(), content: Some(content.to_string()) }
    }

    pub fn user(content: &str) -> Self {
        Self { role: "user".to_string(), content: Some(content.to_string()) }
    }
}
