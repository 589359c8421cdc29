use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use shelfload::config::{self, Config};
use shelfload::dataset::prepare_books;
use shelfload::docker::{CliRunner, ContainerEngine};
use shelfload::embed::{Embedder, LocalEmbedder};
use shelfload::pipeline::{self, PipelineEvent, PipelineInput};
use shelfload::store::{QdrantStore, VectorStore, collection_exists};

/// Bootstrap a local vector store and load book descriptions into it.
#[derive(Parser, Debug)]
#[command(name = "shelfload")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to .shelfload.yml in the working directory).
    #[arg(short, long, global = true, env = "SHELFLOAD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also print the final run report as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the engine, ensure the container, and load data if needed (default).
    Run,

    /// Similarity search against the loaded collection.
    Search {
        /// Free-text query.
        query: String,

        /// Number of results.
        #[arg(short = 'n', long)]
        limit: Option<u64>,
    },

    /// Delete the configured collection.
    Drop,

    /// Clean a raw books CSV into the one-column file the loader reads.
    Prepare {
        /// Raw dataset with title, authors, categories and description columns.
        input: PathBuf,

        /// Destination for the cleaned file (defaults to the configured data path).
        output: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = load_config(cli.config.as_deref())?;
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => handle_run(&cfg, cli.json),
        Commands::Search { query, limit } => {
            handle_search(&cfg, &query, limit.unwrap_or(cfg.search_limit))
        }
        Commands::Drop => handle_drop(&cfg),
        Commands::Prepare { input, output } => {
            handle_prepare(&input, output.as_deref().unwrap_or(&cfg.data_path))
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_file(path).context("failed to load config"),
        None => {
            let cwd = std::env::current_dir().context("cannot determine working directory")?;
            config::load(&cwd).context("failed to load config")
        }
    }
}

fn open_store(cfg: &Config) -> Result<QdrantStore> {
    QdrantStore::new(
        &cfg.store_url,
        cfg.api_key.clone(),
        Duration::from_secs(cfg.http_timeout_secs),
    )
    .map(|store| store.with_upload_chunk(cfg.upload_batch_size))
    .context("failed to build vector store client")
}

fn load_embedder(cfg: &Config) -> shelfload::Result<Box<dyn Embedder>> {
    let embedder = LocalEmbedder::load(
        cfg.embedding_model,
        cfg.model_cache_dir.clone(),
        cfg.embed_batch_size,
    )?;
    Ok(Box::new(embedder))
}

fn handle_run(cfg: &Config, json: bool) -> Result<ExitCode> {
    let engine = ContainerEngine::new(CliRunner::from_command_line(&cfg.engine)?);
    let store = open_store(cfg)?;
    let input = PipelineInput::from_config(cfg);

    let report = pipeline::run_pipeline(
        &input,
        &engine,
        &store,
        || load_embedder(cfg),
        &mut print_event,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    // A degraded run exits non-zero so scripts can tell it apart from a
    // completed load.
    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_event(event: PipelineEvent) {
    match event {
        PipelineEvent::StageStarted(_) | PipelineEvent::Completed(_) => {}
        PipelineEvent::StageFinished { stage, detail, .. } => {
            println!("[{}] {detail}", stage.as_str())
        }
        PipelineEvent::Aborted(reason) => eprintln!("Aborted: {reason}"),
    }
}

fn handle_search(cfg: &Config, query: &str, limit: u64) -> Result<ExitCode> {
    let store = open_store(cfg)?;
    let embedder = load_embedder(cfg)?;
    let hits = pipeline::search(&store, embedder.as_ref(), &cfg.collection, query, limit)
        .with_context(|| format!("search in '{}' failed", cfg.collection))?;

    if hits.is_empty() {
        println!("No results.");
    }
    for hit in &hits {
        println!("- {}", pipeline::hit_text(hit, &cfg.text_column));
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_drop(cfg: &Config) -> Result<ExitCode> {
    let store = open_store(cfg)?;
    if !collection_exists(&store, &cfg.collection)? {
        println!("Collection '{}' does not exist.", cfg.collection);
        return Ok(ExitCode::SUCCESS);
    }
    store.delete_collection(&cfg.collection)?;
    println!("Collection '{}' has been deleted.", cfg.collection);
    Ok(ExitCode::SUCCESS)
}

fn handle_prepare(input: &Path, output: &Path) -> Result<ExitCode> {
    let summary = prepare_books(input, output)
        .with_context(|| format!("failed to prepare {}", input.display()))?;
    println!(
        "Wrote {} rows to {} ({} dropped, {} duplicates).",
        summary.rows_written,
        output.display(),
        summary.rows_dropped,
        summary.duplicates
    );
    Ok(ExitCode::SUCCESS)
}
