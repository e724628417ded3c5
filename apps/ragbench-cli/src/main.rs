//! ragbench - evaluate retrieval quality over a folder of documents.
//!
//! # Usage
//!
//! ```bash
//! # Span-level scores for a markdown folder
//! ragbench eval --corpus ./docs --dataset ./labels/token.json --mode token
//!
//! # Chunk-id scores with a smaller chunker, as JSON
//! ragbench eval --corpus ./docs --dataset ./labels/chunk.json --mode chunk \
//!     --chunk-size 400 --chunk-overlap 0 --json
//! ```
//!
//! Settings come from `ragbench.toml` / `RAGBENCH_*` in `--config-dir` and are
//! overridden by flags. Relative `--corpus` / `--dataset` paths resolve against
//! `--config-dir` (default: the working directory). `RUST_LOG` overrides the
//! log filter.

mod corpus;
mod output;
mod store;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ragbench_core::config::{Config, EvalSettings};
use ragbench_core::{ChunkerKind, EvaluationResult};
use ragbench_embed::get_default_embedder;
use ragbench_eval::{ChunkLevelEvaluation, ChunkLevelRunOptions, TokenLevelEvaluation, TokenLevelRunOptions};
use ragbench_text::{RecursiveCharacterChunker, RecursiveCharacterOptions};

use crate::store::JsonFileStore;

/// Retrieval evaluation for RAG pipelines.
#[derive(Parser)]
#[command(name = "ragbench", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding `ragbench.toml`
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk, index and score a corpus against a labeled dataset
    Eval(EvalArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Compare retrieved chunk ids with labeled chunk ids
    Chunk,
    /// Compare retrieved character ranges with labeled spans
    Token,
}

#[derive(Args)]
struct EvalArgs {
    /// Folder of documents to evaluate over
    #[arg(long)]
    corpus: String,

    /// File extension of corpus documents
    #[arg(long, default_value = "md")]
    ext: String,

    /// Labeled dataset file (`<name>.json`)
    #[arg(long)]
    dataset: String,

    #[arg(long, value_enum)]
    mode: Mode,

    /// Results retrieved per query
    #[arg(long)]
    k: Option<usize>,

    /// Chunks embedded per batch
    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    chunk_size: Option<usize>,

    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

impl EvalArgs {
    fn apply(&self, settings: &mut EvalSettings) {
        if let Some(k) = self.k {
            settings.retrieval.k = k;
        }
        if let Some(batch_size) = self.batch_size {
            settings.retrieval.batch_size = batch_size;
        }
        if let Some(size) = self.chunk_size {
            settings.chunking.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            settings.chunking.chunk_overlap = overlap;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Eval(args) => {
            let config = Config::load_from(&cli.config_dir).context("loading configuration")?;
            run_eval(args, &config).await
        }
    }
}

async fn run_eval(args: EvalArgs, config: &Config) -> Result<()> {
    let mut settings = config.settings().context("reading settings")?;
    args.apply(&mut settings);
    settings.validate().context("invalid settings")?;

    let corpus = Arc::new(corpus::load_corpus(&config.resolve(&args.corpus)?, &args.ext)?);
    let (store, dataset) = JsonFileStore::for_file(&config.resolve(&args.dataset)?)?;
    let loader = Arc::new(store);

    let chunker = Arc::new(RecursiveCharacterChunker::new(RecursiveCharacterOptions::from(settings.chunking.clone()))?);
    let chunker = ChunkerKind::PositionAware(chunker);
    let embedder = get_default_embedder(&settings.embedding);
    let k = settings.retrieval.k;
    let batch_size = settings.retrieval.batch_size;

    info!(documents = corpus.len(), dataset = %dataset, mode = ?args.mode, "Running evaluation");
    let (label, result): (&str, EvaluationResult) = match args.mode {
        Mode::Chunk => {
            let options = ChunkLevelRunOptions::new(chunker, embedder).with_k(k).with_batch_size(batch_size);
            let evaluation = ChunkLevelEvaluation::new(corpus, dataset).with_loader(loader);
            ("chunk-level", evaluation.run(options).await?)
        }
        Mode::Token => {
            let options = TokenLevelRunOptions::new(chunker, embedder).with_k(k).with_batch_size(batch_size);
            let evaluation = TokenLevelEvaluation::new(corpus, dataset).with_loader(loader);
            ("token-level", evaluation.run(options).await?)
        }
    };

    let rendered = if args.json { output::format_json(&result)? } else { output::format_human(label, &result)? };
    println!("{rendered}");
    Ok(())
}
