//! Tutela command line: classify comment batches or a single text.

mod classify;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use tutela_core::{RawComment, Settings, Thresholds, Vocabulary};
use tutela_services::VocabClient;

#[derive(Parser)]
#[command(name = "tutela", version, about = "Comment risk classification pipeline")]
struct Cli {
    /// JSON settings file; defaults apply when omitted.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Local vocabulary JSON file instead of the vocabulary API.
    #[arg(long, global = true)]
    vocab_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a single text and print the record as JSON.
    Moderate {
        #[arg(long)]
        text: String,

        #[command(flatten)]
        overrides: ThresholdArgs,
    },
    /// Classify a JSONL batch of raw comment records.
    Classify {
        /// Input file with one raw comment JSON object per line ("-" for stdin).
        #[arg(long)]
        input: PathBuf,

        /// Only print records at or above this action (allow|review|block).
        #[arg(long)]
        min_action: Option<String>,

        /// Persist classified records (eviction first, then upsert).
        #[arg(long)]
        persist: bool,

        #[command(flatten)]
        overrides: ThresholdArgs,
    },
}

#[derive(clap::Args)]
struct ThresholdArgs {
    #[arg(long)]
    rule_weight: Option<f32>,
    #[arg(long)]
    semantic_weight: Option<f32>,
    #[arg(long)]
    similarity: Option<f32>,
    #[arg(long)]
    decision: Option<f32>,
}

impl ThresholdArgs {
    fn merge_over(&self, base: &Thresholds) -> anyhow::Result<Thresholds> {
        let mut overrides = HashMap::new();
        if let Some(v) = self.rule_weight {
            overrides.insert("rule_weight".to_string(), v);
        }
        if let Some(v) = self.semantic_weight {
            overrides.insert("semantic_weight".to_string(), v);
        }
        if let Some(v) = self.similarity {
            overrides.insert("similarity".to_string(), v);
        }
        if let Some(v) = self.decision {
            overrides.insert("decision".to_string(), v);
        }
        Ok(base.merged(&overrides)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("tutela v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::from_env(),
    };

    let vocabulary = load_vocabulary(&cli, &settings).await?;

    match cli.command {
        Command::Moderate { text, overrides } => {
            let thresholds = overrides.merge_over(&settings.thresholds)?;
            let pipeline = classify::build_pipeline(vocabulary, thresholds, &settings)?;
            let raw = RawComment {
                platform: "cli".to_string(),
                source_id: "adhoc".to_string(),
                comment_id: "adhoc".to_string(),
                author: None,
                text,
                like_count: 0,
                published_at: None,
                permalink: None,
            };
            let record = pipeline.moderate(&raw).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Classify {
            input,
            min_action,
            persist,
            overrides,
        } => {
            let thresholds = overrides.merge_over(&settings.thresholds)?;
            classify::run(vocabulary, thresholds, &settings, &input, min_action, persist).await?;
        }
    }

    Ok(())
}

/// Vocabulary fetch failure is fatal: nothing can be classified without
/// detection rules.
async fn load_vocabulary(cli: &Cli, settings: &Settings) -> anyhow::Result<Vocabulary> {
    if let Some(path) = &cli.vocab_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read vocabulary file {}", path.display()))?;
        let vocab = serde_json::from_str(&raw)
            .with_context(|| format!("parse vocabulary file {}", path.display()))?;
        return Ok(vocab);
    }
    let client = VocabClient::new(settings.services.vocab_url.clone())?;
    Ok(client.fetch_vocab().await.context("fetch vocabulary")?)
}
