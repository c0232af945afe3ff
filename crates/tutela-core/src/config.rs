//! Run configuration, loaded from a JSON settings file plus environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::thresholds::Thresholds;

/// Top-level settings for a moderation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub thresholds: Thresholds,
    pub services: ServiceSettings,
    pub storage: StorageSettings,
    pub nlp: NlpSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Base URL of the vocabulary API (`{base}/v1/vocab`).
    pub vocab_url: String,
    pub perspective_enabled: bool,
    pub perspective_weight: f32,
    /// Language code passed to the toxicity API.
    pub language: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            vocab_url: "http://localhost:8001".to_string(),
            perspective_enabled: false,
            perspective_weight: 0.4,
            language: "pt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Database file; `None` selects the in-memory store.
    pub db_path: Option<PathBuf>,
    pub ttl_days: i64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            db_path: None,
            ttl_days: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NlpSettings {
    /// Directory holding `model.onnx` + `tokenizer.json`; `None` disables
    /// the semantic scorer.
    pub model_dir: Option<PathBuf>,
}

impl Settings {
    /// Read settings from a JSON file, then apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read settings {}: {e}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parse settings {}: {e}", path.display()))?;
        settings.apply_env();
        settings.thresholds.validate()?;
        Ok(settings)
    }

    /// Defaults plus environment overrides, for runs without a settings file.
    pub fn from_env() -> Self {
        let mut settings = Settings::default();
        settings.apply_env();
        settings
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("VOCAB_API_URL") {
            if !url.is_empty() {
                self.services.vocab_url = url;
            }
        }
    }
}
