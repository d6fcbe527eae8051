use crate::traits::ExtractionEngine;
use crate::{Answer, Context, ExtractionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const BACKEND: &str = "chat-completions";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gemma2-9b-it";

/// Builds the single user message sent to a generative model.
pub fn render_prompt(question: &str, context: &Context) -> String {
    format!("{question} from the following web results:\n{}", context.as_str())
}

/// Generative extraction over an OpenAI-compatible chat completions API.
pub struct ChatCompletionEngine {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionEngine {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ExtractionError> {
        Ok(Self {
            client: super::http_client(super::DEFAULT_TIMEOUT)?,
            base_url: GROQ_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: None,
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ExtractionError> {
        self.client = super::http_client(timeout)?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, ExtractionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExtractionError::Backend {
                backend: BACKEND.to_string(),
                details: format!("{status}: {}", super::excerpt(&body)),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl ExtractionEngine for ChatCompletionEngine {
    async fn extract(&self, question: &str, context: &Context) -> Result<Answer, ExtractionError> {
        if context.is_empty() {
            debug!("empty context, skipping completion");
            return Ok(Answer::NotFound);
        }

        let prompt = render_prompt(question, context);
        let body = self.complete(&prompt).await?;
        parse_chat_response(&body)
    }
}

pub(crate) fn parse_chat_response(body: &str) -> Result<Answer, ExtractionError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|error| ExtractionError::Decode {
            backend: BACKEND.to_string(),
            details: error.to_string(),
        })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ExtractionError::Decode {
            backend: BACKEND.to_string(),
            details: "response has no choices".to_string(),
        })?;

    Ok(Answer::from_raw(
        choice.message.content.as_deref().unwrap_or_default(),
    ))
}
