use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============= Chunk Types =============

/// A unit of content produced by a loader, before it is keyed or embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderChunk {
    pub page_content: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl LoaderChunk {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Identifying information carried by every stored chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Chunk key, the value `VectorDb::delete_keys` matches against.
    pub id: String,
    pub unique_loader_id: String,
    pub source: String,
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

/// Retrievable content returned from a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub page_content: String,
    pub metadata: ChunkMetadata,
}

/// A chunk together with its vector representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub page_content: String,
    pub vector: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl EmbeddedChunk {
    pub fn key(&self) -> &str {
        &self.metadata.id
    }

    /// Drop the vector, keeping content and metadata.
    pub fn into_chunk(self) -> Chunk {
        Chunk {
            page_content: self.page_content,
            metadata: self.metadata,
        }
    }
}

/// Builds the deterministic key of the `index`-th chunk of a loader.
pub fn chunk_key(unique_loader_id: &str, index: usize) -> String {
    format!("{}_{}", unique_loader_id, index)
}

// ============= Application Types =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub result: String,
    /// Distinct chunk sources, in rank order.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderSummary {
    pub unique_id: String,
    pub chunks: usize,
    /// True when the cache reported the loader as already ingested.
    pub from_cache: bool,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Loader error: {0}")]
    Loader(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
