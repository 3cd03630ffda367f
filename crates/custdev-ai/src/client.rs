//! HTTP client for an OpenAI-compatible chat-completion endpoint (GLM by default).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
pub const DEFAULT_MODEL: &str = "glm-4-flash";

#[derive(Error, Debug)]
pub enum AiError {
    #[error("no chat-completion API key configured")]
    NotConfigured,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("model returned an empty reply")]
    EmptyReply,
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reply does not match the request: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A backend that turns a conversation into the assistant's reply text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AiError>;

    fn model(&self) -> &str;
}

/// Connection and sampling settings for [`GlmClient`].
#[derive(Debug, Clone)]
pub struct GlmConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl GlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

/// Chat-completion client with bearer-token auth.
pub struct GlmClient {
    client: reqwest::Client,
    config: GlmConfig,
}

impl GlmClient {
    pub fn new(config: GlmConfig) -> Result<Self, AiError> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::NotConfigured);
        }
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChatClient for GlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AiError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        info!(url = %self.config.api_url, model = %self.config.model, "calling chat completion");
        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(AiError::EmptyReply);
        }
        info!(chars = content.len(), "chat completion received");
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
