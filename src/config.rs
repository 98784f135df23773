//! Application configuration.
//!
//! Loaded from a TOML file with per-section defaults, so a partial file (or
//! no file at all) always yields a usable configuration. API keys may be
//! left out of the file and resolved from the environment instead.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::search::{DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL};

/// Environment variable consulted when `[openai] api_key` is unset.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable consulted when `[qdrant] api_key` is unset.
pub const QDRANT_API_KEY_VAR: &str = "QDRANT_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OpenAI-compatible provider settings (embeddings + chat)
    pub openai: OpenAiConfig,
    /// Vector index settings
    pub qdrant: QdrantConfig,
    /// Catalog dataset settings
    pub catalog: CatalogConfig,
    /// Conversational agent settings
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let raw = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize configuration: {}", e)))?;
        std::fs::write(path, raw)
            .map_err(|e| Error::Config(format!("failed to write {}: {}", path.display(), e)))
    }
}

/// Settings for the OpenAI-compatible provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; falls back to the `OPENAI_API_KEY` environment variable
    pub api_key: Option<String>,
    /// Base URL of the API (no trailing slash)
    pub base_url: String,
    /// Model used for query and catalog embeddings
    pub embedding_model: String,
    /// Model driving the conversational agent
    pub chat_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

impl OpenAiConfig {
    /// Resolve the API key from the config file or the environment.
    ///
    /// A missing key is an authentication failure at startup, before any
    /// request is issued.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        env::var(OPENAI_API_KEY_VAR).ok().filter(|k| !k.is_empty()).ok_or_else(|| {
            Error::Auth(format!(
                "no OpenAI API key: set [openai] api_key or the {} environment variable",
                OPENAI_API_KEY_VAR
            ))
        })
    }
}

/// Settings for the Qdrant vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    /// Qdrant server URL
    pub url: String,
    /// API key for hosted deployments; falls back to `QDRANT_API_KEY`
    pub api_key: Option<String>,
    /// Collection holding the product vectors
    pub collection: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            api_key: None,
            collection: "product_catalog".to_string(),
        }
    }
}

impl QdrantConfig {
    /// Resolve the optional API key from the config file or the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| env::var(QDRANT_API_KEY_VAR).ok().filter(|k| !k.is_empty()))
    }
}

/// Settings for the product catalog dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the catalog JSON file consumed by ingestion
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "dataset/product_catalog.json".to_string(),
        }
    }
}

/// Settings for the conversational agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Override for the agent's behavioral instructions; the built-in
    /// prompt is used when unset
    pub instructions: Option<String>,
    /// Upper bound on tool-call rounds within a single turn
    pub max_tool_rounds: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            instructions: None,
            max_tool_rounds: 8,
        }
    }
}
