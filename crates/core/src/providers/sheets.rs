use crate::config::SheetDestination;
use crate::traits::RemoteTable;
use crate::SinkError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use url::Url;

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Google Sheets values API, driven by an already-issued OAuth access token.
pub struct GoogleSheetsClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GoogleSheetsClient {
    pub fn new(access_token: impl Into<String>) -> Result<Self, SinkError> {
        Ok(Self {
            client: super::http_client(super::DEFAULT_TIMEOUT)?,
            base_url: SHEETS_BASE_URL.to_string(),
            access_token: access_token.into(),
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// `{base}/spreadsheets/{id}/values/{range}`, with the range
    /// percent-encoded as one path segment.
    pub(crate) fn values_url(
        &self,
        destination: &SheetDestination,
        range: &str,
    ) -> Result<Url, SinkError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| SinkError::Remote {
                destination: destination.spreadsheet_id.clone(),
                details: format!("base url cannot carry a path: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(["spreadsheets", destination.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    async fn check(destination: &SheetDestination, response: Response) -> Result<Value, SinkError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SinkError::Remote {
                destination: destination.spreadsheet_id.clone(),
                details: format!("{status}: {}", super::excerpt(&body)),
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|error| SinkError::Decode {
            destination: destination.spreadsheet_id.clone(),
            details: format!("{error}: {}", super::excerpt(&body)),
        })
    }
}

#[async_trait]
impl RemoteTable for GoogleSheetsClient {
    async fn read_values(
        &self,
        destination: &SheetDestination,
    ) -> Result<Vec<Vec<String>>, SinkError> {
        let response = self
            .client
            .get(self.values_url(destination, &destination.range())?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let payload = Self::check(destination, response).await?;
        Ok(parse_values(&payload))
    }

    /// Writes first, then clears only the rows below the new data. A failed
    /// write leaves the previous contents in place.
    async fn replace_values(
        &self,
        destination: &SheetDestination,
        rows: &[Vec<String>],
    ) -> Result<(), SinkError> {
        let range = destination.range();
        let mut url = self.values_url(destination, &range)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }))
            .send()
            .await?;
        Self::check(destination, response).await?;

        let tail = format!("{}:clear", destination.tail_range(rows.len()));
        let response = self
            .client
            .post(self.values_url(destination, &tail)?)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()
            .await?;
        Self::check(destination, response).await?;

        Ok(())
    }
}

/// Cells come back as strings for formatted values; anything else is
/// rendered through its JSON form.
fn parse_values(payload: &Value) -> Vec<Vec<String>> {
    payload
        .get("values")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| {
                            cells
                                .iter()
                                .map(|cell| match cell {
                                    Value::String(text) => text.clone(),
                                    other => other.to_string(),
                                })
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}
