use crate::traits::ExtractionEngine;
use crate::{Answer, Context, ExtractionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const BACKEND: &str = "question-answering";
pub const DEFAULT_QA_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/deepset/roberta-base-squad2";

/// Extractive question answering: the model picks a span out of the context.
pub struct QuestionAnsweringEngine {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    min_score: f64,
}

#[derive(Debug, Serialize)]
struct QaRequest<'a> {
    inputs: QaInputs<'a>,
}

#[derive(Debug, Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Debug, Deserialize)]
struct QaAnswer {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    score: f64,
}

impl QuestionAnsweringEngine {
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<String>,
    ) -> Result<Self, ExtractionError> {
        Ok(Self {
            client: super::http_client(super::DEFAULT_TIMEOUT)?,
            endpoint: endpoint.into(),
            api_token,
            min_score: 0.0,
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Answers scored below `min_score` are reported as not found.
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ExtractionError> {
        self.client = super::http_client(timeout)?;
        Ok(self)
    }
}

#[async_trait]
impl ExtractionEngine for QuestionAnsweringEngine {
    async fn extract(&self, question: &str, context: &Context) -> Result<Answer, ExtractionError> {
        if context.is_empty() {
            return Ok(Answer::NotFound);
        }

        let mut request = self.client.post(&self.endpoint).json(&QaRequest {
            inputs: QaInputs {
                question,
                context: context.as_str(),
            },
        });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExtractionError::Backend {
                backend: BACKEND.to_string(),
                details: format!("{status}: {}", super::excerpt(&body)),
            });
        }

        parse_qa_response(&body, self.min_score)
    }
}

/// Accepts a single answer object or a ranked array of them.
pub(crate) fn parse_qa_response(body: &str, min_score: f64) -> Result<Answer, ExtractionError> {
    let decode = |details: String| ExtractionError::Decode {
        backend: BACKEND.to_string(),
        details,
    };

    let payload: Value = serde_json::from_str(body).map_err(|error| decode(error.to_string()))?;

    if let Some(message) = payload.get("error").and_then(Value::as_str) {
        return Err(ExtractionError::Provider {
            backend: BACKEND.to_string(),
            message: message.to_string(),
        });
    }

    let best = match payload {
        Value::Array(mut answers) => {
            if answers.is_empty() {
                return Ok(Answer::NotFound);
            }
            answers.swap_remove(0)
        }
        other => other,
    };

    let best: QaAnswer = serde_json::from_value(best).map_err(|error| decode(error.to_string()))?;
    if best.score < min_score {
        return Ok(Answer::NotFound);
    }

    Ok(Answer::from_raw(&best.answer))
}
