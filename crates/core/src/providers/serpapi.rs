use crate::traits::SearchProvider;
use crate::{Query, SearchError, SearchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const BACKEND: &str = "serpapi";
pub const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";
pub const DEFAULT_RESULT_LIMIT: usize = 10;

pub struct SerpApiSearch {
    client: Client,
    endpoint: String,
    api_key: String,
    engine: String,
    result_limit: usize,
}

impl SerpApiSearch {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SearchError> {
        Ok(Self {
            client: super::http_client(super::DEFAULT_TIMEOUT)?,
            endpoint: SERPAPI_ENDPOINT.to_string(),
            api_key: api_key.into(),
            engine: "google".to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, SearchError> {
        self.client = super::http_client(timeout)?;
        Ok(self)
    }

    fn request_url(&self, query: &Query) -> Result<Url, SearchError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("engine", &self.engine)
            .append_pair("q", query.as_str())
            .append_pair("num", &self.result_limit.to_string())
            .append_pair("api_key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl SearchProvider for SerpApiSearch {
    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, SearchError> {
        if query.as_str().trim().is_empty() {
            return Err(SearchError::Request("query is empty".to_string()));
        }

        let response = self.client.get(self.request_url(query)?).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // SerpApi reports auth and quota failures as JSON with an `error` field.
            let details = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_string))
                .map(|message| format!("{status}: {message}"))
                .unwrap_or_else(|| status.to_string());
            return Err(SearchError::Backend {
                backend: BACKEND.to_string(),
                details,
            });
        }

        let payload: Value = serde_json::from_str(&body).map_err(|error| SearchError::Decode {
            backend: BACKEND.to_string(),
            details: error.to_string(),
        })?;

        let mut results = parse_organic_results(&payload)?;
        results.truncate(self.result_limit);
        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: String,
    #[serde(default)]
    snippet: String,
    link: String,
}

pub(crate) fn parse_organic_results(payload: &Value) -> Result<Vec<SearchResult>, SearchError> {
    if let Some(message) = payload.get("error").and_then(Value::as_str) {
        if is_empty_result_notice(message) {
            return Ok(Vec::new());
        }
        return Err(SearchError::Provider {
            backend: BACKEND.to_string(),
            message: message.to_string(),
        });
    }

    let organic = payload
        .get("organic_results")
        .ok_or_else(|| SearchError::Decode {
            backend: BACKEND.to_string(),
            details: "response has no organic_results".to_string(),
        })?;

    let parsed: Vec<OrganicResult> =
        serde_json::from_value(organic.clone()).map_err(|error| SearchError::Decode {
            backend: BACKEND.to_string(),
            details: format!("organic_results: {error}"),
        })?;

    Ok(parsed
        .into_iter()
        .map(|result| SearchResult {
            title: result.title,
            snippet: result.snippet,
            link: result.link,
        })
        .collect())
}

fn is_empty_result_notice(message: &str) -> bool {
    message.contains("hasn't returned any results")
}
