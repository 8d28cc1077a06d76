//! Configuration management for pdfcrew
//!
//! Provides TOML-based configuration with defaults, environment overrides
//! and validation.
//! Location: ~/.pdfcrew/config.toml

use crate::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable names recognised by [`Config::apply_env`]
pub const ENV_LLM_MODEL: &str = "PDFCREW_LLM_MODEL";
pub const ENV_LLM_BASE_URL: &str = "PDFCREW_LLM_BASE_URL";
pub const ENV_LLM_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_EMBEDDING_MODEL: &str = "PDFCREW_EMBEDDING_MODEL";
pub const ENV_EMBEDDING_BASE_URL: &str = "PDFCREW_EMBEDDING_BASE_URL";
pub const ENV_PDF_PATH: &str = "PDFCREW_PDF_PATH";

/// Complete configuration for a pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub document: DocumentConfig,
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which completion model to call
    pub model: String,
    /// OpenAI-compatible endpoint, including the `/v1` prefix
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which embedding model to use for retrieval
    pub model: String,
    /// Ollama endpoint (no `/v1` suffix)
    pub base_url: String,
}

/// Document and retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub pdf_path: PathBuf,
    /// Words per chunk
    pub chunk_size: usize,
    /// Words shared by adjacent chunks
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub min_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "crewai-llama3".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            temperature: None,
            timeout_secs: 300,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            base_url: "http://localhost:11434".to_string(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            pdf_path: PathBuf::from("./attention_paper.pdf"),
            chunk_size: 200,
            chunk_overlap: 40,
            top_k: 5,
            min_score: 0.0,
            cache_dir: None,
            use_cache: true,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&contents)
            .map_err(|e| PipelineError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pdfcrew").join("config.toml"))
    }

    /// Load `.env` from the working directory or one of its parents
    ///
    /// A missing file is fine; a file that cannot be read or parsed is a
    /// configuration error.
    pub fn load_dotenv() -> Result<()> {
        match dotenv::dotenv() {
            Ok(path) => {
                debug!(path = %path.display(), "Loaded .env");
                Ok(())
            }
            Err(e) => dotenv_error(e),
        }
    }

    /// Load a specific env file. Returns whether the file existed.
    pub fn load_env_file(path: &Path) -> Result<bool> {
        match dotenv::from_path(path) {
            Ok(()) => Ok(true),
            Err(e) => dotenv_error(e).map(|_| false),
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = get(ENV_LLM_MODEL) {
            self.llm.model = model;
        }
        if let Some(url) = get(ENV_LLM_BASE_URL) {
            self.llm.base_url = url;
        }
        if let Some(key) = get(ENV_LLM_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = get(ENV_EMBEDDING_MODEL) {
            self.embedding.model = model;
        }
        if let Some(url) = get(ENV_EMBEDDING_BASE_URL) {
            self.embedding.base_url = url;
        }
        if let Some(path) = get(ENV_PDF_PATH) {
            self.document.pdf_path = PathBuf::from(path);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(PipelineError::ConfigError(
                "llm.model must not be empty".to_string(),
            ));
        }

        if self.embedding.model.trim().is_empty() {
            return Err(PipelineError::ConfigError(
                "embedding.model must not be empty".to_string(),
            ));
        }

        for (name, url) in [
            ("llm.base_url", &self.llm.base_url),
            ("embedding.base_url", &self.embedding.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(PipelineError::ConfigError(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.document.chunk_size == 0 {
            return Err(PipelineError::ConfigError(
                "document.chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.document.chunk_overlap >= self.document.chunk_size {
            return Err(PipelineError::ConfigError(
                "document.chunk_overlap must be less than document.chunk_size".to_string(),
            ));
        }

        if self.document.top_k == 0 {
            return Err(PipelineError::ConfigError(
                "document.top_k must be greater than 0".to_string(),
            ));
        }

        if !(-1.0..=1.0).contains(&self.document.min_score) {
            return Err(PipelineError::ConfigError(
                "document.min_score must be between -1.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Directory holding cached document indexes
    pub fn cache_dir(&self) -> PathBuf {
        match &self.document.cache_dir {
            Some(dir) => Self::expand_path(dir),
            None => dirs::home_dir()
                .map(|home| home.join(".pdfcrew").join("index"))
                .unwrap_or_else(|| PathBuf::from(".pdfcrew").join("index")),
        }
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &Path) -> PathBuf {
        if let Ok(rest) = path.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        path.to_path_buf()
    }
}

fn dotenv_error(e: dotenv::Error) -> Result<()> {
    match e {
        dotenv::Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound => Ok(()),
        dotenv::Error::LineParse(line, pos) => Err(PipelineError::ConfigError(format!(
            "Failed to parse .env at position {}: {}",
            pos, line
        ))),
        other => Err(PipelineError::ConfigError(format!(
            "Failed to load .env: {}",
            other
        ))),
    }
}
