//! Batch classification workflow: read raw comments, run the pipeline,
//! report, and optionally persist.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use tutela_ai::Pipeline;
use tutela_core::{Action, CommentRecord, Label, RawComment, Settings, Thresholds, Vocabulary};
use tutela_store::RecordStore;

/// Wire the pipeline from settings: optional ONNX embedder, optional
/// Perspective signal. A missing Perspective key with the signal enabled is
/// a fatal configuration error, caught before any work starts.
pub fn build_pipeline(
    vocabulary: Vocabulary,
    thresholds: Thresholds,
    settings: &Settings,
) -> anyhow::Result<Pipeline> {
    let embedder = load_embedder(settings)?;
    let mut pipeline = Pipeline::new(vocabulary, thresholds, embedder)?
        .with_language(settings.services.language.clone());

    if settings.services.perspective_enabled {
        let api_key = std::env::var("PERSPECTIVE_API_KEY")
            .context("PERSPECTIVE_API_KEY must be set when perspective_enabled is true")?;
        let client = tutela_services::PerspectiveClient::new(api_key)?;
        pipeline = pipeline.with_toxicity(Arc::new(client), settings.services.perspective_weight);
    }

    Ok(pipeline)
}

#[cfg(feature = "onnx")]
fn load_embedder(
    settings: &Settings,
) -> anyhow::Result<Option<Arc<dyn tutela_core::EmbeddingModel>>> {
    match &settings.nlp.model_dir {
        Some(dir) => {
            let embedder = tutela_ai::OnnxEmbedder::load(dir)?;
            Ok(Some(Arc::new(embedder)))
        }
        None => Ok(None),
    }
}

#[cfg(not(feature = "onnx"))]
fn load_embedder(
    settings: &Settings,
) -> anyhow::Result<Option<Arc<dyn tutela_core::EmbeddingModel>>> {
    if settings.nlp.model_dir.is_some() {
        warn!("model_dir configured but the onnx feature is disabled; semantic scoring off");
    }
    Ok(None)
}

pub async fn run(
    vocabulary: Vocabulary,
    thresholds: Thresholds,
    settings: &Settings,
    input: &Path,
    min_action: Option<String>,
    persist: bool,
) -> anyhow::Result<()> {
    let min_action = min_action.as_deref().map(parse_action).transpose()?;
    let pipeline = build_pipeline(vocabulary, thresholds, settings)?;

    let raws = read_raw_comments(input)?;
    info!(total = raws.len(), "raw comments loaded");

    let records = pipeline.moderate_batch(&raws).await;
    for record in &records {
        let keep = min_action.is_none_or(|min| record.action() >= min);
        if keep {
            println!("{}", serde_json::to_string(record)?);
        }
    }
    summarize(&records);

    if persist {
        persist_records(&records, settings)?;
    }

    Ok(())
}

fn read_raw_comments(input: &Path) -> anyhow::Result<Vec<RawComment>> {
    let reader: Box<dyn Read> = if input.as_os_str() == "-" {
        Box::new(std::io::stdin())
    } else {
        Box::new(
            std::fs::File::open(input)
                .with_context(|| format!("open input {}", input.display()))?,
        )
    };

    let mut raws = Vec::new();
    for (lineno, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RawComment>(&line) {
            Ok(raw) => raws.push(raw),
            Err(error) => warn!(line = lineno + 1, %error, "skipping unparsable input line"),
        }
    }
    Ok(raws)
}

fn summarize(records: &[CommentRecord]) {
    let count = |label: Label| records.iter().filter(|r| r.classification == label).count();
    info!(
        suspeito = count(Label::Suspeito),
        atencao = count(Label::Atencao),
        ok = count(Label::Ok),
        "classification summary"
    );
}

/// Eviction runs first and is best-effort: a failure is logged and never
/// aborts the upsert that follows.
fn persist_records(records: &[CommentRecord], settings: &Settings) -> anyhow::Result<()> {
    let mut store = open_store(settings)?;

    match store.evict_older_than(settings.storage.ttl_days) {
        Ok(deleted) => info!(deleted, "TTL eviction done"),
        Err(error) => warn!(%error, "TTL eviction failed; continuing"),
    }

    let written = store.upsert(records)?;
    info!(written, "records persisted");
    Ok(())
}

#[cfg(feature = "duckdb")]
fn open_store(settings: &Settings) -> anyhow::Result<Box<dyn RecordStore>> {
    let store = match &settings.storage.db_path {
        Some(path) => tutela_store::DuckStore::open_persistent(path)?,
        None => tutela_store::DuckStore::open()?,
    };
    Ok(Box::new(store))
}

#[cfg(not(feature = "duckdb"))]
fn open_store(settings: &Settings) -> anyhow::Result<Box<dyn RecordStore>> {
    if settings.storage.db_path.is_some() {
        warn!("db_path configured but the duckdb feature is disabled; using in-memory store");
    }
    Ok(Box::new(tutela_store::MemoryStore::new()))
}

fn parse_action(s: &str) -> anyhow::Result<Action> {
    match s {
        "allow" => Ok(Action::Allow),
        "review" => Ok(Action::Review),
        "block" => Ok(Action::Block),
        other => anyhow::bail!("unknown action '{other}', expected allow|review|block"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_action_accepts_known_values() {
        assert_eq!(parse_action("allow").unwrap(), Action::Allow);
        assert_eq!(parse_action("review").unwrap(), Action::Review);
        assert_eq!(parse_action("block").unwrap(), Action::Block);
        assert!(parse_action("drop").is_err());
    }
}
