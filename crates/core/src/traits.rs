use crate::config::SheetDestination;
use crate::{Answer, Context, ExtractionError, Query, SearchError, SearchResult, SinkError};
use async_trait::async_trait;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Rank-ordered results. An empty vector means the search ran and found
    /// nothing; any failure to search must be an `Err`.
    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, SearchError>;
}

#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    async fn extract(&self, question: &str, context: &Context) -> Result<Answer, ExtractionError>;
}

#[async_trait]
impl<T: ExtractionEngine + ?Sized> ExtractionEngine for Box<T> {
    async fn extract(&self, question: &str, context: &Context) -> Result<Answer, ExtractionError> {
        (**self).extract(question, context).await
    }
}

#[async_trait]
impl<T: SearchProvider + ?Sized> SearchProvider for Box<T> {
    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, SearchError> {
        (**self).search(query).await
    }
}

#[async_trait]
pub trait RemoteTable: Send + Sync {
    async fn read_values(
        &self,
        destination: &SheetDestination,
    ) -> Result<Vec<Vec<String>>, SinkError>;

    /// Overwrites the destination range with `rows`. Rows past the new data
    /// are cleared; a failed write must leave the old contents in place.
    async fn replace_values(
        &self,
        destination: &SheetDestination,
        rows: &[Vec<String>],
    ) -> Result<(), SinkError>;
}
