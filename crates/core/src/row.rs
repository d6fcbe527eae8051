use crate::context::ContextAssembler;
use crate::error::{ConfigError, RowError};
use crate::template::QueryTemplate;
use crate::traits::{ExtractionEngine, SearchProvider};
use crate::ExtractionResult;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Pending,
    Querying,
    Searching,
    Assembling,
    Extracting,
    Done,
}

/// Runs one entity through query, search, context and extraction.
///
/// The first failing stage ends the row; later stages never run.
pub struct RowProcessor<'a, S, E> {
    template: &'a QueryTemplate,
    assembler: ContextAssembler,
    search: &'a S,
    extractor: &'a E,
}

impl<'a, S, E> RowProcessor<'a, S, E>
where
    S: SearchProvider,
    E: ExtractionEngine,
{
    pub fn new(
        template: &'a QueryTemplate,
        assembler: ContextAssembler,
        search: &'a S,
        extractor: &'a E,
    ) -> Self {
        Self {
            template,
            assembler,
            search,
            extractor,
        }
    }

    pub async fn process(&self, index: usize, entity: &str) -> ExtractionResult {
        let mut state = RowState::Pending;

        let outcome = self.advance(index, entity, &mut state).await;
        transition(index, &mut state, RowState::Done);

        match outcome {
            Ok(value) => ExtractionResult::success(entity, value),
            Err(error) => {
                warn!(row = index, entity, kind = %error.kind, reason = %error.reason, "row failed");
                ExtractionResult::failure(entity, error)
            }
        }
    }

    async fn advance(
        &self,
        index: usize,
        entity: &str,
        state: &mut RowState,
    ) -> Result<String, RowError> {
        transition(index, state, RowState::Querying);
        if entity.trim().is_empty() {
            return Err(ConfigError::EmptyEntity.into());
        }
        let query = self.template.render(entity);

        transition(index, state, RowState::Searching);
        let results = self.search.search(&query).await?;

        transition(index, state, RowState::Assembling);
        let context = self.assembler.assemble(&results);
        debug!(
            row = index,
            results = results.len(),
            included = context.included,
            dropped = context.dropped,
            context_chars = context.char_len(),
            "context assembled"
        );

        transition(index, state, RowState::Extracting);
        let answer = self.extractor.extract(query.as_str(), &context).await?;

        Ok(answer.into_value())
    }
}

fn transition(index: usize, state: &mut RowState, next: RowState) {
    debug!(row = index, from = ?*state, to = ?next, "row state");
    *state = next;
}
