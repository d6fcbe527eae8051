use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use factfinder_core::{
    entities_from_csv_file, entities_from_rows, ChatCompletionEngine, ExtractionEngine,
    GoogleSheetsClient, Pipeline, PipelineConfig, ProviderCredentials, QueryTemplate,
    QuestionAnsweringEngine, RemoteTable, ResultSink, SerpApiSearch, SheetDestination,
    DEFAULT_MAX_CONTEXT_CHARS, DEFAULT_PLACEHOLDER,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "factfinder", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Placeholder token substituted with each entity.
    #[arg(long, global = true, default_value = DEFAULT_PLACEHOLDER)]
    placeholder: String,
}

#[derive(Subcommand)]
enum Command {
    /// Look up one fact per entity and export the results.
    Run(RunArgs),
    /// Render the query for a single entity without calling any provider.
    Preview {
        /// Question template containing the placeholder.
        #[arg(long, default_value = "Get me the email address of {company}")]
        template: String,
        /// Entity to substitute.
        #[arg(long)]
        entity: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EngineKind {
    /// Generative chat completion over the rendered prompt.
    Chat,
    /// Extractive question answering over (question, context).
    Qa,
}

#[derive(Args)]
struct RunArgs {
    /// CSV file with a header row. Omit to read entities from the sheet.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Column holding the entity names.
    #[arg(long, default_value = "Company")]
    column: String,

    /// Question template containing the placeholder.
    #[arg(long, default_value = "Get me the email address of {company}")]
    template: String,

    /// Where to write the CSV export.
    #[arg(long, default_value = "extracted_data.csv")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = EngineKind::Chat)]
    engine: EngineKind,

    /// Chat model name.
    #[arg(long, default_value = factfinder_core::providers::chat::DEFAULT_CHAT_MODEL)]
    model: String,

    /// OpenAI-compatible base URL for the chat engine.
    #[arg(long, default_value = factfinder_core::providers::chat::GROQ_BASE_URL)]
    chat_base_url: String,

    /// Question-answering model endpoint.
    #[arg(long, default_value = factfinder_core::providers::qa::DEFAULT_QA_ENDPOINT)]
    qa_endpoint: String,

    /// Minimum score for a question-answering span to count as an answer.
    #[arg(long, default_value = "0.0")]
    qa_min_score: f64,

    /// Search results requested per entity.
    #[arg(long, default_value = "10")]
    results_per_query: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_CONTEXT_CHARS)]
    max_context_chars: usize,

    /// Entities processed at once.
    #[arg(long, default_value = "1")]
    concurrency: usize,

    /// Per-request timeout for provider calls, in seconds.
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Google spreadsheet id used as input (without --input) and as sync target.
    #[arg(long, requires = "sheet_name")]
    sheet_id: Option<String>,

    #[arg(long, requires = "sheet_id")]
    sheet_name: Option<String>,

    #[arg(long, env = "SERPAPI_API_KEY", hide_env_values = true)]
    serpapi_key: Option<String>,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    groq_key: Option<String>,

    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,

    /// OAuth access token with the spreadsheets scope.
    #[arg(long, env = "GOOGLE_SHEETS_TOKEN", hide_env_values = true)]
    sheets_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "factfinder boot"
    );

    match cli.command {
        Command::Preview { template, entity } => {
            let template = QueryTemplate::parse(template, cli.placeholder)?;
            println!("{}", template.render(&entity));
        }
        Command::Run(args) => run(args, cli.placeholder).await?,
    }

    Ok(())
}

async fn run(args: RunArgs, placeholder: String) -> anyhow::Result<()> {
    let config = PipelineConfig {
        placeholder,
        max_context_chars: args.max_context_chars,
        concurrency: args.concurrency,
    };
    // Fail on a bad template before touching any credential or provider.
    QueryTemplate::parse(args.template.as_str(), config.placeholder.as_str())?;

    let credentials = ProviderCredentials {
        serpapi_key: args.serpapi_key.clone(),
        groq_key: args.groq_key.clone(),
        huggingface_token: args.hf_token.clone(),
        sheets_token: args.sheets_token.clone(),
    };
    let timeout = Duration::from_secs(args.timeout_secs.max(1));

    let destination = match (&args.sheet_id, &args.sheet_name) {
        (Some(id), Some(name)) => Some(SheetDestination::new(id, name)),
        _ => None,
    };
    let sheets = match &destination {
        Some(_) => Some(GoogleSheetsClient::new(credentials.sheets_token()?)?),
        None => None,
    };

    let entities = match (&args.input, &destination, &sheets) {
        (Some(path), _, _) => entities_from_csv_file(path, &args.column)?,
        (None, Some(destination), Some(sheets)) => {
            let rows = sheets.read_values(destination).await?;
            entities_from_rows(&rows, &args.column)?
        }
        _ => anyhow::bail!("either --input or --sheet-id/--sheet-name is required"),
    };
    info!(entities = entities.len(), column = %args.column, "entities loaded");

    let search = SerpApiSearch::new(credentials.serpapi_key()?)?
        .with_result_limit(args.results_per_query)
        .with_timeout(timeout)?;

    let extractor: Box<dyn ExtractionEngine> = match args.engine {
        EngineKind::Chat => Box::new(
            ChatCompletionEngine::new(credentials.groq_key()?)?
                .with_base_url(args.chat_base_url.as_str())
                .with_model(args.model.as_str())
                .with_timeout(timeout)?,
        ),
        EngineKind::Qa => Box::new(
            QuestionAnsweringEngine::new(
                args.qa_endpoint.as_str(),
                credentials.huggingface_token().map(str::to_string),
            )?
            .with_min_score(args.qa_min_score)
            .with_timeout(timeout)?,
        ),
    };

    let pipeline = Pipeline::new(search, extractor, config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; finishing in-flight entities");
            on_interrupt.cancel();
        }
    });

    let results = pipeline
        .run_with_cancel(&entities, &args.template, &cancel)
        .await?;

    for result in &results {
        println!("{}: {}", result.entity, result.display_value());
    }

    let sink = match (sheets, destination) {
        (Some(sheets), Some(destination)) => ResultSink::with_remote(sheets, destination),
        _ => ResultSink::local_only(),
    };
    let report = sink.deliver(&results, &args.output).await?;

    let summary = results.summary();
    println!(
        "{summary}; wrote {} rows to {}",
        report.export.rows,
        report.export.path.display(),
    );

    match report.sync {
        Some(Ok(())) => println!("remote sheet updated"),
        Some(Err(error)) => eprintln!("remote sheet update failed: {error}"),
        None => {}
    }

    Ok(())
}
