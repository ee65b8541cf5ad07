//! Vector Storage Contract
//!
//! This module defines [`VectorDb`], the capability set a vector storage
//! backend exposes to take part in a RAG application, together with an
//! in-memory reference backend.
//!
//! # Lifecycle
//!
//! ```text
//!  init(dimensions) ──► insert_chunks ──► similarity_search / get_vector_count
//!                            ▲                        │
//!                            └──── delete_keys ◄──────┘
//!                                  reset
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ragloom::db::{InMemoryVectorDb, VectorDb};
//!
//! let db = InMemoryVectorDb::new();
//! db.init(1536).await?;
//! db.insert_chunks(embedded_chunks).await?;
//!
//! let top = db.similarity_search(&query_vector, 7).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::types::{AppError, Chunk, EmbeddedChunk, Result};

// ============================================================================
// Vector Storage Trait
// ============================================================================

/// Abstract trait for vector database operations.
///
/// # Implementors
///
/// - `InMemoryVectorDb` - Brute-force cosine search, no persistence
#[async_trait]
pub trait VectorDb: Send + Sync {
    /// Prepare storage for vectors of the given dimensionality.
    ///
    /// Called once per application build with the embedding model's
    /// dimensions. Behavior on repeated calls is backend-defined.
    async fn init(&self, dimensions: usize) -> Result<()>;

    /// Insert embedded chunks.
    ///
    /// # Returns
    ///
    /// Number of chunks actually written, never more than `chunks.len()`.
    async fn insert_chunks(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize>;

    /// Return up to `k` chunks ranked by similarity to `query`, best first.
    ///
    /// Returned chunks do not carry their vectors.
    async fn similarity_search(&self, query: &[f32], k: usize) -> Result<Vec<Chunk>>;

    /// Total number of stored vectors.
    async fn get_vector_count(&self) -> Result<usize>;

    /// Whether an entry with chunk key `key` is stored.
    ///
    /// Used to confirm that an ingestion cache hit still has data behind it.
    async fn has_key(&self, key: &str) -> Result<bool>;

    /// Remove the entries whose chunk key is in `keys`.
    ///
    /// Keys that match nothing are ignored.
    async fn delete_keys(&self, keys: &[String]) -> Result<()>;

    /// Remove every stored vector.
    async fn reset(&self) -> Result<()>;
}

// ============================================================================
// In-Memory Vector Database
// ============================================================================

/// In-memory vector database.
///
/// Data is not persisted and will be lost when the process exits.
/// Uses cosine similarity for vector comparisons. Inserting an existing
/// key replaces the stored entry.
#[derive(Clone, Default)]
pub struct InMemoryVectorDb {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Default)]
struct InMemoryState {
    dimensions: Option<usize>,
    entries: HashMap<String, EmbeddedChunk>,
}

impl InMemoryVectorDb {
    /// Create a new, uninitialized in-memory database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions set by `init`, if it has been called.
    pub fn dimensions(&self) -> Option<usize> {
        self.state.read().dimensions
    }

    /// Calculate cosine similarity between two vectors.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorDb for InMemoryVectorDb {
    async fn init(&self, dimensions: usize) -> Result<()> {
        let mut state = self.state.write();
        match state.dimensions {
            Some(existing) if existing != dimensions => Err(AppError::InvalidInput(format!(
                "Vector database already initialized with {} dimensions, got {}",
                existing, dimensions
            ))),
            Some(_) => Ok(()),
            None => {
                debug!("Initialized in-memory vector database with {} dimensions", dimensions);
                state.dimensions = Some(dimensions);
                Ok(())
            }
        }
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn insert_chunks(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize> {
        let mut state = self.state.write();
        let dimensions = state.dimensions.ok_or_else(|| {
            AppError::Database("Vector database used before init".to_string())
        })?;

        // Validate the whole batch before writing anything
        if let Some(bad) = chunks.iter().find(|c| c.vector.len() != dimensions) {
            return Err(AppError::InvalidInput(format!(
                "Chunk '{}' has {} dimensions, expected {}",
                bad.key(),
                bad.vector.len(),
                dimensions
            )));
        }

        let count = chunks.len();
        for chunk in chunks {
            state.entries.insert(chunk.metadata.id.clone(), chunk);
        }

        debug!("Inserted {} chunks", count);
        Ok(count)
    }

    async fn similarity_search(&self, query: &[f32], k: usize) -> Result<Vec<Chunk>> {
        let state = self.state.read();
        let dimensions = state.dimensions.ok_or_else(|| {
            AppError::Database("Vector database used before init".to_string())
        })?;

        if query.len() != dimensions {
            return Err(AppError::InvalidInput(format!(
                "Query has {} dimensions, expected {}",
                query.len(),
                dimensions
            )));
        }

        let mut scored: Vec<(f32, &EmbeddedChunk)> = state
            .entries
            .values()
            .map(|entry| (Self::cosine_similarity(query, &entry.vector), entry))
            .collect();

        // Sort by score descending
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!("Found {} results", scored.len());
        Ok(scored
            .into_iter()
            .map(|(_, entry)| Chunk {
                page_content: entry.page_content.clone(),
                metadata: entry.metadata.clone(),
            })
            .collect())
    }

    async fn get_vector_count(&self) -> Result<usize> {
        Ok(self.state.read().entries.len())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.state.read().entries.contains_key(key))
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<()> {
        let mut state = self.state.write();
        let before = state.entries.len();
        for key in keys {
            state.entries.remove(key);
        }
        debug!("Deleted {} of {} requested keys", before - state.entries.len(), keys.len());
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.state.write().entries.clear();
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;
    use std::collections::HashMap;

    fn create_test_chunk(id: &str, content: &str, vector: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            page_content: content.to_string(),
            vector,
            metadata: ChunkMetadata {
                id: id.to_string(),
                unique_loader_id: "test".to_string(),
                source: "test".to_string(),
                extra: HashMap::new(),
            },
        }
    }

    #[tokio::test]
    async fn test_inmemory_init_sets_dimensions() {
        let db = InMemoryVectorDb::new();
        assert_eq!(db.dimensions(), None);

        db.init(3).await.unwrap();
        assert_eq!(db.dimensions(), Some(3));
    }

    #[tokio::test]
    async fn test_inmemory_reinit() {
        let db = InMemoryVectorDb::new();
        db.init(3).await.unwrap();

        // Same dimensions is a no-op, different dimensions is rejected
        assert!(db.init(3).await.is_ok());
        assert!(matches!(db.init(4).await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_inmemory_insert_before_init() {
        let db = InMemoryVectorDb::new();
        let result = db
            .insert_chunks(vec![create_test_chunk("a", "A", vec![1.0, 0.0])])
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_inmemory_dimension_mismatch_inserts_nothing() {
        let db = InMemoryVectorDb::new();
        db.init(3).await.unwrap();

        let result = db
            .insert_chunks(vec![
                create_test_chunk("a", "A", vec![1.0, 0.0, 0.0]),
                create_test_chunk("b", "B", vec![1.0, 0.0]),
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(db.get_vector_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_inmemory_insert_and_search() {
        let db = InMemoryVectorDb::new();
        db.init(3).await.unwrap();

        let inserted = db
            .insert_chunks(vec![
                create_test_chunk("doc1", "Hello world", vec![1.0, 0.0, 0.0]),
                create_test_chunk("doc2", "Goodbye world", vec![0.0, 1.0, 0.0]),
                create_test_chunk("doc3", "Hello again", vec![0.9, 0.1, 0.0]),
            ])
            .await
            .unwrap();
        assert_eq!(inserted, 3);

        let results = db.similarity_search(&[1.0, 0.0, 0.0], 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metadata.id, "doc1"); // Exact match first
        assert_eq!(results[1].metadata.id, "doc3"); // Similar second
    }

    #[tokio::test]
    async fn test_inmemory_search_k_larger_than_store() {
        let db = InMemoryVectorDb::new();
        db.init(2).await.unwrap();
        db.insert_chunks(vec![create_test_chunk("a", "A", vec![1.0, 0.0])])
            .await
            .unwrap();

        let results = db.similarity_search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_inmemory_search_rejects_wrong_dimensions() {
        let db = InMemoryVectorDb::new();
        db.init(2).await.unwrap();
        db.insert_chunks(vec![
            create_test_chunk("a", "A", vec![1.0, 0.0]),
            create_test_chunk("b", "B", vec![0.0, 1.0]),
        ])
        .await
        .unwrap();

        let result = db.similarity_search(&[1.0, 0.0, 0.0, 0.0, 0.0], 2).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_inmemory_search_before_init() {
        let db = InMemoryVectorDb::new();
        let result = db.similarity_search(&[1.0, 0.0], 1).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_inmemory_has_key() {
        let db = InMemoryVectorDb::new();
        db.init(2).await.unwrap();
        db.insert_chunks(vec![create_test_chunk("a_0", "A", vec![1.0, 0.0])])
            .await
            .unwrap();

        assert!(db.has_key("a_0").await.unwrap());
        assert!(!db.has_key("a_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_inmemory_upsert_replaces() {
        let db = InMemoryVectorDb::new();
        db.init(2).await.unwrap();

        db.insert_chunks(vec![create_test_chunk("a", "old", vec![1.0, 0.0])])
            .await
            .unwrap();
        db.insert_chunks(vec![create_test_chunk("a", "new", vec![1.0, 0.0])])
            .await
            .unwrap();

        assert_eq!(db.get_vector_count().await.unwrap(), 1);
        let results = db.similarity_search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].page_content, "new");
    }

    #[tokio::test]
    async fn test_inmemory_delete_keys() {
        let db = InMemoryVectorDb::new();
        db.init(2).await.unwrap();
        db.insert_chunks(vec![
            create_test_chunk("a", "A", vec![1.0, 0.0]),
            create_test_chunk("b", "B", vec![0.0, 1.0]),
        ])
        .await
        .unwrap();

        db.delete_keys(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap();

        assert_eq!(db.get_vector_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_inmemory_reset_keeps_dimensions() {
        let db = InMemoryVectorDb::new();
        db.init(2).await.unwrap();
        db.insert_chunks(vec![create_test_chunk("a", "A", vec![1.0, 0.0])])
            .await
            .unwrap();

        db.reset().await.unwrap();

        assert_eq!(db.get_vector_count().await.unwrap(), 0);
        assert_eq!(db.dimensions(), Some(2));
    }

    #[test]
    fn test_cosine_similarity() {
        // Identical vectors
        assert!((InMemoryVectorDb::cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);

        // Orthogonal vectors
        assert!(InMemoryVectorDb::cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);

        // Zero vector
        assert_eq!(InMemoryVectorDb::cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
