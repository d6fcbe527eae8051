use crate::context::DEFAULT_MAX_CONTEXT_CHARS;
use crate::error::ConfigError;
use crate::template::DEFAULT_PLACEHOLDER;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub placeholder: String,
    pub max_context_chars: usize,
    /// Entities in flight at once; 1 processes rows strictly one by one.
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            concurrency: 1,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.placeholder.is_empty() {
            return Err(ConfigError::EmptyPlaceholder);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "concurrency".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// API keys read once at startup.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub serpapi_key: Option<String>,
    pub groq_key: Option<String>,
    pub huggingface_token: Option<String>,
    pub sheets_token: Option<String>,
}

impl ProviderCredentials {
    pub fn serpapi_key(&self) -> Result<&str, ConfigError> {
        require(&self.serpapi_key, "SERPAPI_API_KEY")
    }

    pub fn groq_key(&self) -> Result<&str, ConfigError> {
        require(&self.groq_key, "GROQ_API_KEY")
    }

    pub fn sheets_token(&self) -> Result<&str, ConfigError> {
        require(&self.sheets_token, "GOOGLE_SHEETS_TOKEN")
    }

    pub fn huggingface_token(&self) -> Option<&str> {
        non_blank(&self.huggingface_token)
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ConfigError> {
    non_blank(value).ok_or_else(|| ConfigError::MissingCredential(name.to_string()))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetDestination {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

impl SheetDestination {
    pub fn new(spreadsheet_id: impl Into<String>, sheet_name: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn range(&self) -> String {
        format!("{}!A:Z", self.sheet_name)
    }

    /// Rows below the first `written` ones, i.e. whatever an earlier, longer
    /// write left behind.
    pub fn tail_range(&self, written: usize) -> String {
        format!("{}!A{}:Z", self.sheet_name, written + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sequential_with_company_placeholder() {
        let config = PipelineConfig::default();
        assert_eq!(config.placeholder, "{company}");
        assert_eq!(config.concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = PipelineConfig {
            concurrency: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let credentials = ProviderCredentials {
            serpapi_key: Some("   ".to_string()),
            huggingface_token: Some(" hf_token ".to_string()),
            ..ProviderCredentials::default()
        };
        assert!(matches!(
            credentials.serpapi_key(),
            Err(ConfigError::MissingCredential(name)) if name == "SERPAPI_API_KEY"
        ));
        assert_eq!(credentials.huggingface_token(), Some("hf_token"));
    }

    #[test]
    fn destination_range_spans_the_sheet() {
        let destination = SheetDestination::new("sheet-id", "Leads");
        assert_eq!(destination.range(), "Leads!A:Z");
        assert_eq!(destination.tail_range(3), "Leads!A4:Z");
        assert_eq!(destination.tail_range(0), "Leads!A1:Z");
    }
}
