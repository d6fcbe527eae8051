pub mod chat;
pub mod qa;
pub mod serpapi;
pub mod sheets;

pub use chat::ChatCompletionEngine;
pub use qa::QuestionAnsweringEngine;
pub use serpapi::SerpApiSearch;
pub use sheets::GoogleSheetsClient;

use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const EXCERPT_CHARS: usize = 200;

pub(crate) fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// First few hundred characters of an error body, for log-sized messages.
pub(crate) fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(EXCERPT_CHARS) {
        Some((index, _)) => format!("{}...", &trimmed[..index]),
        None => trimmed.to_string(),
    }
}
