pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod row;
pub mod sink;
pub mod source;
pub mod template;
pub mod traits;

pub use config::{PipelineConfig, ProviderCredentials, SheetDestination};
pub use context::{ContextAssembler, DEFAULT_MAX_CONTEXT_CHARS};
pub use error::{
    ConfigError, ExtractionError, RowError, RowErrorKind, SearchError, SinkError, SourceError,
};
pub use models::{
    Answer, Context, ExtractionResult, Query, ResultSet, RowStatus, RunSummary, SearchResult,
    NO_ANSWER,
};
pub use pipeline::Pipeline;
pub use providers::{
    ChatCompletionEngine, GoogleSheetsClient, QuestionAnsweringEngine, SerpApiSearch,
};
pub use row::{RowProcessor, RowState};
pub use sink::{export_csv, export_rows, Export, ResultSink, SinkReport, EXPORT_HEADERS};
pub use source::{entities_from_csv, entities_from_csv_file, entities_from_rows};
pub use template::{QueryTemplate, DEFAULT_PLACEHOLDER};
pub use traits::{ExtractionEngine, RemoteTable, SearchProvider};
