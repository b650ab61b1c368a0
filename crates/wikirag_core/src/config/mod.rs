use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunking::ChunkWindow;
use crate::error::AppError;

pub const DEFAULT_NO_CONTEXT_ANSWER: &str = "No context found.";
pub const CHAT_NO_CONTEXT_ANSWER: &str = "I couldn't find any relevant info on Wikipedia.";

/// Every knob of one pipeline run.
///
/// The two presets correspond to the one-shot script (`script`) and the chat
/// front end (`chat`); they differ only in paragraph threshold, article count,
/// context cap and the no-context message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub overlap: usize,
    pub max_articles: usize,
    /// Paragraphs must be strictly longer than this many characters.
    pub min_paragraph_length: usize,
    pub top_k: usize,
    /// Character cap on the assembled context; `None` passes it through whole.
    pub max_context_length: Option<usize>,
    pub no_context_answer: String,
}

impl PipelineConfig {
    pub fn script() -> Self {
        Self {
            chunk_size: 150,
            overlap: 30,
            max_articles: 5,
            min_paragraph_length: 20,
            top_k: 5,
            max_context_length: None,
            no_context_answer: DEFAULT_NO_CONTEXT_ANSWER.to_string(),
        }
    }

    pub fn chat() -> Self {
        Self {
            max_articles: 4,
            min_paragraph_length: 50,
            max_context_length: Some(2000),
            no_context_answer: CHAT_NO_CONTEXT_ANSWER.to_string(),
            ..Self::script()
        }
    }

    pub fn chunk_window(&self) -> Result<ChunkWindow, AppError> {
        ChunkWindow::new(self.chunk_size, self.overlap)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.chunk_window()?;
        if self.top_k == 0 {
            return Err(AppError::new("CONFIG_INVALID", "top_k must be at least 1"));
        }
        if self.max_articles == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "max_articles must be at least 1",
            ));
        }
        if self.max_context_length == Some(0) {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "max_context_length must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::script()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub embed_model: String,
    pub generate_model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            embed_model: "all-minilm".to_string(),
            generate_model: "llama3.2".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: concat!("wikirag/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

/// Top-level configuration file.
///
/// ```toml
/// [pipeline]
/// top_k = 3
///
/// [ollama]
/// generate_model = "mistral"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub ollama: OllamaConfig,
    pub wikipedia: WikipediaConfig,
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        let cfg: AppConfig = toml::from_str(raw).map_err(|e| {
            AppError::new("CONFIG_READ_FAILED", "Failed to decode config TOML")
                .with_details(e.to_string())
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::new("CONFIG_READ_FAILED", "Failed to read config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        let cfg = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.pipeline.validate()?;
        if self.ollama.embed_model.trim().is_empty() || self.ollama.generate_model.trim().is_empty()
        {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Ollama model names must not be empty",
            ));
        }
        if !self.wikipedia.api_url.starts_with("https://")
            && !self.wikipedia.api_url.starts_with("http://")
        {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Wikipedia API URL must be http(s)",
            )
            .with_details(format!("api_url={}", self.wikipedia.api_url)));
        }
        Ok(())
    }
}
