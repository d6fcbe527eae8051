use crate::config::PipelineConfig;
use crate::context::ContextAssembler;
use crate::error::{ConfigError, RowError};
use crate::row::RowProcessor;
use crate::template::QueryTemplate;
use crate::traits::{ExtractionEngine, SearchProvider};
use crate::{ExtractionResult, ResultSet};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct Pipeline<S, E>
where
    S: SearchProvider,
    E: ExtractionEngine,
{
    search: S,
    extractor: E,
    config: PipelineConfig,
}

impl<S, E> Pipeline<S, E>
where
    S: SearchProvider,
    E: ExtractionEngine,
{
    pub fn new(search: S, extractor: E, config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            search,
            extractor,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self, entities: &[String], template: &str) -> Result<ResultSet, ConfigError> {
        self.run_with_cancel(entities, template, &CancellationToken::new())
            .await
    }

    /// Processes every entity, returning one result per input in input order.
    ///
    /// Only a malformed template fails the run, and it does so before any
    /// capability is called. Entities not yet dispatched when `cancel` fires
    /// are reported as cancelled rows.
    pub async fn run_with_cancel(
        &self,
        entities: &[String],
        template: &str,
        cancel: &CancellationToken,
    ) -> Result<ResultSet, ConfigError> {
        let template = QueryTemplate::parse(template, self.config.placeholder.as_str())?;

        info!(
            entities = entities.len(),
            concurrency = self.config.concurrency,
            max_context_chars = self.config.max_context_chars,
            "pipeline run started"
        );

        let processor = RowProcessor::new(
            &template,
            ContextAssembler::new(self.config.max_context_chars),
            &self.search,
            &self.extractor,
        );

        let mut slots: Vec<Option<ExtractionResult>> = entities.iter().map(|_| None).collect();

        if self.config.concurrency <= 1 {
            for (index, entity) in entities.iter().enumerate() {
                if cancel.is_cancelled() {
                    break;
                }
                slots[index] = Some(processor.process(index, entity).await);
            }
        } else {
            let processor = &processor;
            let mut completed = stream::iter(entities.iter().enumerate())
                .take_while(|_| futures::future::ready(!cancel.is_cancelled()))
                .map(|(index, entity)| async move { (index, processor.process(index, entity).await) })
                .buffer_unordered(self.config.concurrency);

            while let Some((index, result)) = completed.next().await {
                slots[index] = Some(result);
            }
        }

        let results = slots
            .into_iter()
            .zip(entities)
            .map(|(slot, entity)| {
                slot.unwrap_or_else(|| ExtractionResult::failure(entity.as_str(), RowError::cancelled()))
            })
            .collect();

        let results = ResultSet::from_ordered(results);
        let summary = results.summary();
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            search_failures = summary.search_failures,
            extraction_failures = summary.extraction_failures,
            config_failures = summary.config_failures,
            cancelled = summary.cancelled,
            "pipeline run finished"
        );

        Ok(results)
    }
}
