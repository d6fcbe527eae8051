use crate::error::ConfigError;
use crate::models::Query;

pub const DEFAULT_PLACEHOLDER: &str = "{company}";

/// A query template checked once, before any entity is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    template: String,
    placeholder: String,
}

impl QueryTemplate {
    pub fn parse(
        template: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let template = template.into();
        let placeholder = placeholder.into();

        if placeholder.is_empty() {
            return Err(ConfigError::EmptyPlaceholder);
        }

        if !template.contains(&placeholder) {
            return Err(ConfigError::MissingPlaceholder {
                template,
                placeholder,
            });
        }

        Ok(Self {
            template,
            placeholder,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn render(&self, entity: &str) -> Query {
        Query::new(self.template.replace(&self.placeholder, entity))
    }
}

pub fn render(template: &str, placeholder: &str, entity: &str) -> Result<Query, ConfigError> {
    Ok(QueryTemplate::parse(template, placeholder)?.render(entity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_placeholder_occurrence_is_substituted() {
        let query = render(
            "{company} contact page, email of {company}",
            DEFAULT_PLACEHOLDER,
            "Acme Inc",
        )
        .expect("template has a placeholder");

        assert_eq!(query.as_str(), "Acme Inc contact page, email of Acme Inc");
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let error = QueryTemplate::parse("Get me the email address", DEFAULT_PLACEHOLDER)
            .expect_err("template must be rejected");
        assert!(matches!(error, ConfigError::MissingPlaceholder { .. }));
    }

    #[test]
    fn custom_placeholder_is_honoured() {
        let template = QueryTemplate::parse("CEO of <<name>>", "<<name>>").expect("valid");
        assert_eq!(template.render("Umbrella Corp").as_str(), "CEO of Umbrella Corp");
        assert!(matches!(
            QueryTemplate::parse("CEO of {company}", ""),
            Err(ConfigError::EmptyPlaceholder)
        ));
    }
}
