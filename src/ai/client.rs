use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::config::AiConfig;
use crate::error::{AiError, AppError};

const USER_AGENT: &str = concat!("studymate-server/", env!("CARGO_PKG_VERSION"));

/// A chat model that answers one system + user prompt with plain text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompletionClient {
    http_client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionClient {
    pub fn new(config: &AiConfig) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: completions_endpoint(&config.base_url)?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

/// `https://host/v1` and `https://host/v1/` both resolve to
/// `https://host/v1/chat/completions`.
fn completions_endpoint(base_url: &str) -> Result<Url, AppError> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join("chat/completions"))
        .map_err(|e| AppError::Config(format!("Invalid ai.base_url '{}': {}", base_url, e)))
}

#[async_trait]
impl LlmClient for ChatCompletionClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
        };

        debug!(model = %self.model, prompt_chars = user.len(), "Sending chat completion request");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Chat completion request rejected");
            return Err(AiError::Status(status.as_u16(), body).into());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AiError::EmptyResponse.into())
    }
}
