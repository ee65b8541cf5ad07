//! Embedding models
//!
//! [`Embeddings`] is the contract the application uses to turn chunk text and
//! queries into vectors. Its [`dimensions`](Embeddings::dimensions) decide how
//! the vector database is initialized.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::types::{AppError, Result};
use crate::utils::config::OpenAiSettings;

/// Embedding model contract.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Length of every vector this model produces.
    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;

    /// Embed a batch of documents, one vector per input, in input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// Default embedding model: OpenAI `text-embedding-3-small`.
///
/// Returns a fresh instance on every call.
pub fn default_embedding_model() -> Arc<dyn Embeddings> {
    Arc::new(OpenAiEmbeddings::new(OpenAiEmbeddingModel::TextEmbedding3Small))
}

// ============================================================================
// OpenAI Embeddings
// ============================================================================

/// OpenAI embedding models and their output sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OpenAiEmbeddingModel {
    #[default]
    #[serde(rename = "text-embedding-3-small")]
    TextEmbedding3Small,
    #[serde(rename = "text-embedding-3-large")]
    TextEmbedding3Large,
    #[serde(rename = "text-embedding-ada-002")]
    Ada002,
}

impl OpenAiEmbeddingModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::TextEmbedding3Small => "text-embedding-3-small",
            Self::TextEmbedding3Large => "text-embedding-3-large",
            Self::Ada002 => "text-embedding-ada-002",
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            Self::TextEmbedding3Small => 1536,
            Self::TextEmbedding3Large => 3072,
            Self::Ada002 => 1536,
        }
    }
}

impl FromStr for OpenAiEmbeddingModel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text-embedding-3-small" | "3-small" => Ok(Self::TextEmbedding3Small),
            "text-embedding-3-large" | "3-large" => Ok(Self::TextEmbedding3Large),
            "text-embedding-ada-002" | "ada" | "ada-002" => Ok(Self::Ada002),
            _ => Err(AppError::InvalidInput(format!(
                "Unknown embedding model: {}. Use: text-embedding-3-small, text-embedding-3-large, text-embedding-ada-002",
                s
            ))),
        }
    }
}

impl fmt::Display for OpenAiEmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model_id())
    }
}

pub struct OpenAiEmbeddings {
    client: Client,
    settings: OnceLock<OpenAiSettings>,
    model: OpenAiEmbeddingModel,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    /// Create an embedding client using settings from the environment.
    ///
    /// The environment is read on the first request.
    pub fn new(model: OpenAiEmbeddingModel) -> Self {
        Self {
            client: Client::new(),
            settings: OnceLock::new(),
            model,
        }
    }

    pub fn with_settings(settings: OpenAiSettings, model: OpenAiEmbeddingModel) -> Self {
        let embeddings = Self::new(model);
        let _ = embeddings.settings.set(settings);
        embeddings
    }

    fn settings(&self) -> &OpenAiSettings {
        self.settings.get_or_init(OpenAiSettings::from_env)
    }

    pub fn model(&self) -> OpenAiEmbeddingModel {
        self.model
    }
}

#[async_trait]
impl Embeddings for OpenAiEmbeddings {
    fn dimensions(&self) -> usize {
        self.model.dimensions()
    }

    fn model_name(&self) -> &str {
        self.model.model_id()
    }

    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let settings = self.settings();
        let api_key = settings.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("OPENAI_API_KEY is not set".to_string())
        })?;

        let response = self
            .client
            .post(settings.endpoint("embeddings"))
            .bearer_auth(api_key)
            .json(&EmbeddingRequest {
                input: texts,
                model: self.model.model_id(),
            })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Embedding request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Embedding("rate limited".to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!("HTTP {}: {}", status, body)));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Invalid embedding response: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // The API may return entries out of order; `index` restores input order
        parsed.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));

        debug!("Embedded {} texts", parsed.data.len());
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_documents(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("empty response".to_string()))
    }
}
