use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::config::ChatConfig;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Chat completion returned a non-JSON body (HTTP {status})")]
    InvalidJson { status: u16 },
    #[error("Chat completion response has no choices[0].message.content")]
    MissingContent,
}

/// Result of a chat completion call that reached the service.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// Message content of the first choice.
    Content(String),
    /// The body had no `choices`; kept whole for the error notice.
    Unexpected(Value),
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<ChatReply, ChatError>;
}

/// OpenAI-compatible chat completion client pointed at Groq by default.
pub struct GroqChatClient {
    client: Client,
    config: ChatConfig,
}

impl GroqChatClient {
    pub fn new(client: Client, config: ChatConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ChatCompletion for GroqChatClient {
    async fn complete(&self, prompt: &str) -> Result<ChatReply, ChatError> {
        let payload = json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        });

        info!(
            "Requesting analysis from {} ({} prompt characters)",
            self.config.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let response_json: Value =
            serde_json::from_str(&body).map_err(|_| ChatError::InvalidJson { status })?;

        parse_chat_response(response_json)
    }
}

fn parse_chat_response(response_json: Value) -> Result<ChatReply, ChatError> {
    if response_json.get("choices").is_none() {
        warn!("Chat completion response has no choices: {}", response_json);
        return Ok(ChatReply::Unexpected(response_json));
    }

    let content = response_json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or(ChatError::MissingContent)?;

    Ok(ChatReply::Content(content.to_string()))
}
