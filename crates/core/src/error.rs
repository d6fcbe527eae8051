use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("template does not contain the placeholder {placeholder}: {template:?}")]
    MissingPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("placeholder must not be empty")]
    EmptyPlaceholder,

    #[error("entity is empty")]
    EmptyEntity,

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("missing credential: {0}")]
    MissingCredential(String),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid response from {backend}: {details}")]
    Backend { backend: String, details: String },

    #[error("{backend} reported an error: {message}")]
    Provider { backend: String, message: String },

    #[error("could not decode {backend} response: {details}")]
    Decode { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("search request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid response from {backend}: {details}")]
    Backend { backend: String, details: String },

    #[error("{backend} reported an error: {message}")]
    Provider { backend: String, message: String },

    #[error("could not decode {backend} response: {details}")]
    Decode { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("extraction request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("remote table {destination} rejected the write: {details}")]
    Remote {
        destination: String,
        details: String,
    },

    #[error("could not decode response from remote table {destination}: {details}")]
    Decode {
        destination: String,
        details: String,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column {column:?} not found (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("input table has no header row")]
    MissingHeader,
}

/// Which stage of a row failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowErrorKind {
    Config,
    Search,
    Extraction,
    Cancelled,
}

impl RowErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Search => "search",
            Self::Extraction => "extraction",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row-level failure, reduced to its stage and a rendered reason so it can
/// be cloned into the result set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {reason}")]
pub struct RowError {
    pub kind: RowErrorKind,
    pub reason: String,
}

impl RowError {
    pub fn new(kind: RowErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(RowErrorKind::Cancelled, "run stopped before this entity was dispatched")
    }

    pub fn kind(&self) -> RowErrorKind {
        self.kind
    }
}

impl From<ConfigError> for RowError {
    fn from(error: ConfigError) -> Self {
        Self::new(RowErrorKind::Config, error.to_string())
    }
}

impl From<SearchError> for RowError {
    fn from(error: SearchError) -> Self {
        Self::new(RowErrorKind::Search, error.to_string())
    }
}

impl From<ExtractionError> for RowError {
    fn from(error: ExtractionError) -> Self {
        Self::new(RowErrorKind::Extraction, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_error_keeps_the_failing_stage() {
        let error: RowError = SearchError::Request("quota exhausted".to_string()).into();
        assert_eq!(error.kind(), RowErrorKind::Search);
        assert_eq!(error.to_string(), "search error: search request failed: quota exhausted");

        let error: RowError = ExtractionError::Request("timeout".to_string()).into();
        assert_eq!(error.kind(), RowErrorKind::Extraction);
    }

    #[test]
    fn missing_column_lists_available_headers() {
        let error = SourceError::MissingColumn {
            column: "Name".to_string(),
            available: vec!["Company".to_string(), "City".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "column \"Name\" not found (available: Company, City)"
        );
    }
}
