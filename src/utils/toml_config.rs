//! TOML-based configuration for ragloom
//!
//! Application defaults can be kept in a TOML file (`ragloom.toml`) instead of
//! code. Every key is optional; missing keys fall back to the builder defaults.
//!
//! ```toml
//! [application]
//! search_result_count = 5
//! temperature = 0.2
//! init_loaders = true
//! model = "gpt-4"
//! query_template = "Answer briefly. USER: {0}"
//!
//! [embeddings]
//! model = "text-embedding-3-large"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::builder::{
    RagApplicationBuilder, DEFAULT_SEARCH_RESULT_COUNT, DEFAULT_TEMPERATURE, QUERY_PLACEHOLDER,
};
use crate::llm::SimpleModel;
use crate::rag::embeddings::{OpenAiEmbeddingModel, OpenAiEmbeddings};
use crate::types::{AppError, Result};

/// Root configuration structure loaded from ragloom.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default)]
    pub application: ApplicationSection,

    #[serde(default)]
    pub embeddings: EmbeddingsSection,
}

// ============= Application Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSection {
    #[serde(default = "default_search_result_count")]
    pub search_result_count: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_init_loaders")]
    pub init_loaders: bool,

    /// Must contain `{0}` when set
    pub query_template: Option<String>,

    /// Preset name, e.g. `gpt-3.5-turbo` or `gpt-4`
    pub model: Option<String>,
}

fn default_search_result_count() -> usize {
    DEFAULT_SEARCH_RESULT_COUNT
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_init_loaders() -> bool {
    true
}

impl Default for ApplicationSection {
    fn default() -> Self {
        Self {
            search_result_count: default_search_result_count(),
            temperature: default_temperature(),
            init_loaders: default_init_loaders(),
            query_template: None,
            model: None,
        }
    }
}

// ============= Embeddings Configuration =============

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsSection {
    /// OpenAI embedding model name
    pub model: Option<String>,
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl ApplicationConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> std::result::Result<Self, ConfigError> {
        let config: ApplicationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let app = &self.application;

        if let Some(template) = &app.query_template {
            if !template.contains(QUERY_PLACEHOLDER) {
                return Err(ConfigError::ValidationError(format!(
                    "application.query_template must contain {}",
                    QUERY_PLACEHOLDER
                )));
            }
        }

        if !(0.0..=2.0).contains(&app.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "application.temperature must be between 0.0 and 2.0, got {}",
                app.temperature
            )));
        }

        if let Some(model) = &app.model {
            model.parse::<SimpleModel>().map_err(|e| {
                ConfigError::ValidationError(format!("application.model: {}", e))
            })?;
        }

        if let Some(model) = &self.embeddings.model {
            model.parse::<OpenAiEmbeddingModel>().map_err(|e| {
                ConfigError::ValidationError(format!("embeddings.model: {}", e))
            })?;
        }

        Ok(())
    }

    /// Seed `builder` with the values from this file.
    ///
    /// Temperature is applied before the model so a preset resolves with it.
    pub fn apply(&self, builder: RagApplicationBuilder) -> Result<RagApplicationBuilder> {
        let app = &self.application;

        let mut builder = builder
            .set_search_result_count(app.search_result_count)
            .set_loader_init(app.init_loaders)
            .set_temperature(app.temperature);

        if let Some(model) = &app.model {
            builder = builder.set_model(model.parse::<SimpleModel>()?);
        }

        if let Some(template) = &app.query_template {
            builder = builder.set_query_template(template.as_str())?;
        }

        if let Some(model) = &self.embeddings.model {
            let model = model.parse::<OpenAiEmbeddingModel>()?;
            builder = builder.set_embedding_model(Arc::new(OpenAiEmbeddings::new(model)));
        }

        Ok(builder)
    }
}
