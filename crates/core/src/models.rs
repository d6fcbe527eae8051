use crate::error::{RowError, RowErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel written when the extraction engine answered but found nothing.
pub const NO_ANSWER: &str = "No answer found";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub text: String,
    /// Number of leading search results that made it into `text`.
    pub included: usize,
    pub dropped: usize,
}

impl Context {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Found(String),
    NotFound,
}

impl Answer {
    /// Blank model output counts as "no answer", never as an empty value.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::NotFound
        } else {
            Self::Found(trimmed.to_string())
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Self::Found(value) => value,
            Self::NotFound => NO_ANSWER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    Success,
    Error(RowError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub entity: String,
    pub value: String,
    pub status: RowStatus,
}

impl ExtractionResult {
    pub fn success(entity: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            value: value.into(),
            status: RowStatus::Success,
        }
    }

    pub fn failure(entity: impl Into<String>, error: RowError) -> Self {
        Self {
            entity: entity.into(),
            value: String::new(),
            status: RowStatus::Error(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, RowStatus::Success)
    }

    pub fn error(&self) -> Option<&RowError> {
        match &self.status {
            RowStatus::Success => None,
            RowStatus::Error(error) => Some(error),
        }
    }

    /// Cell text for tabular output; failed rows are marked, never blank.
    pub fn display_value(&self) -> String {
        match &self.status {
            RowStatus::Success => self.value.clone(),
            RowStatus::Error(error) => format!("[error: {}] {}", error.kind, error.reason),
        }
    }
}

/// Results index-aligned with the input entity list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    results: Vec<ExtractionResult>,
}

impl ResultSet {
    pub(crate) fn from_ordered(results: Vec<ExtractionResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ExtractionResult> {
        self.results.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractionResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[ExtractionResult] {
        &self.results
    }

    pub fn into_vec(self) -> Vec<ExtractionResult> {
        self.results
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.results.len(),
            ..RunSummary::default()
        };

        for result in &self.results {
            match result.error().map(RowError::kind) {
                None => summary.succeeded += 1,
                Some(RowErrorKind::Config) => summary.config_failures += 1,
                Some(RowErrorKind::Search) => summary.search_failures += 1,
                Some(RowErrorKind::Extraction) => summary.extraction_failures += 1,
                Some(RowErrorKind::Cancelled) => summary.cancelled += 1,
            }
        }

        summary
    }
}

impl std::ops::Index<usize> for ResultSet {
    type Output = ExtractionResult;

    fn index(&self, index: usize) -> &Self::Output {
        &self.results[index]
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ExtractionResult;
    type IntoIter = std::slice::Iter<'a, ExtractionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub config_failures: usize,
    pub search_failures: usize,
    pub extraction_failures: usize,
    pub cancelled: usize,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} entities answered ({} config failures, {} search failures, {} extraction failures, {} cancelled)",
            self.succeeded,
            self.total,
            self.config_failures,
            self.search_failures,
            self.extraction_failures,
            self.cancelled,
        )
    }
}
