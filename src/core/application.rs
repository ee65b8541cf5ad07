use std::sync::Arc;

use futures::{stream, StreamExt, TryStreamExt};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::core::builder::{BuilderParts, RagApplicationBuilder, QUERY_PLACEHOLDER};
use crate::db::VectorDb;
use crate::llm::Model;
use crate::loaders::{Loader, SOURCE_METADATA_KEY};
use crate::rag::cache::Cache;
use crate::rag::embeddings::Embeddings;
use crate::types::{
    chunk_key, AppError, Chunk, ChunkMetadata, EmbeddedChunk, LoaderChunk, LoaderSummary,
    QueryResponse, Result,
};

/// Texts sent to the embedding model per request.
pub const EMBEDDING_BATCH_SIZE: usize = 64;

/// Embedding requests in flight at once during ingestion.
const EMBEDDING_CONCURRENCY: usize = 4;

const SYSTEM_PROMPT: &str = "Answer the user using the numbered passages below. \
If they do not contain the answer, say that you don't know.";

/// An assembled RAG application: loaders, embeddings, storage, and a model.
///
/// Obtained from [`RagApplicationBuilder::build`], which has already run
/// [`init`](Self::init).
pub struct RagApplication {
    search_result_count: usize,
    query_template: String,
    loader_init: bool,
    loaders: RwLock<Vec<Arc<dyn Loader>>>,
    vector_db: Option<Arc<dyn VectorDb>>,
    cache: Option<Arc<dyn Cache>>,
    embedding_model: Arc<dyn Embeddings>,
    model: Arc<dyn Model>,
    /// unique loader id -> number of chunks stored, in ingestion order
    registry: RwLock<Vec<(String, usize)>>,
}

impl RagApplication {
    /// Take over the builder's configuration. Nothing is initialized yet.
    pub fn new(builder: RagApplicationBuilder) -> Self {
        let BuilderParts {
            search_result_count,
            loaders,
            vector_db,
            query_template,
            cache,
            embedding_model,
            loader_init,
            model,
        } = builder.into_parts();

        Self {
            search_result_count,
            query_template,
            loader_init,
            loaders: RwLock::new(loaders),
            vector_db,
            cache,
            embedding_model,
            model,
            registry: RwLock::new(Vec::new()),
        }
    }

    /// Initialize every component, then ingest the loaders if loader init is on.
    ///
    /// Order: cache, vector database (sized by the embedding model), model,
    /// loaders in registration order.
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache.init().await?;
        }

        let vector_db = self.vector_db()?;
        let dimensions = self.embedding_model.dimensions();
        vector_db.init(dimensions).await?;
        debug!(dimensions, "Vector database initialized");

        self.model.init().await?;

        if self.loader_init {
            let loaders = self.loaders.read().clone();
            for loader in loaders {
                self.ingest(loader.as_ref()).await?;
            }
        }

        Ok(())
    }

    /// Register and ingest another loader.
    pub async fn add_loader(&self, loader: Arc<dyn Loader>) -> Result<LoaderSummary> {
        self.loaders.write().push(Arc::clone(&loader));
        self.ingest(loader.as_ref()).await
    }

    #[instrument(skip(self, loader), fields(loader = %loader.unique_id()))]
    async fn ingest(&self, loader: &dyn Loader) -> Result<LoaderSummary> {
        loader.init().await?;
        let unique_id = loader.unique_id().to_string();

        let cache_key = self.cache.as_ref().map(|cache| cache.compute_key(&unique_id));
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(seen) = cache.get_seen(key).await? {
                let chunks = usize::try_from(seen)
                    .map_err(|_| AppError::Cache(format!("invalid chunk count {}", seen)))?;

                if self.is_stored(&unique_id, chunks).await? {
                    info!(loader = %unique_id, "Loader already ingested, skipping");
                    self.record(&unique_id, chunks);
                    return Ok(LoaderSummary {
                        unique_id,
                        chunks,
                        from_cache: true,
                    });
                }

                warn!(loader = %unique_id, "Cached loader missing from vector database, re-ingesting");
                cache.delete(key).await?;
            }
        }

        let chunks = loader.get_chunks().await?;
        let embedded = self.embed_chunks(&unique_id, chunks).await?;
        let inserted = self.vector_db()?.insert_chunks(embedded).await?;

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            cache.add_seen(key, inserted as u64).await?;
        }

        info!(loader = %unique_id, chunks = inserted, "Loader ingested");
        self.record(&unique_id, inserted);

        Ok(LoaderSummary {
            unique_id,
            chunks: inserted,
            from_cache: false,
        })
    }

    async fn embed_chunks(
        &self,
        unique_id: &str,
        chunks: Vec<LoaderChunk>,
    ) -> Result<Vec<EmbeddedChunk>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.page_content.clone()).collect();

        let vectors: Vec<Vec<f32>> = stream::iter(texts.chunks(EMBEDDING_BATCH_SIZE))
            .map(|batch| {
                let model = Arc::clone(&self.embedding_model);
                async move { model.embed_documents(batch).await }
            })
            .buffered(EMBEDDING_CONCURRENCY)
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .flatten()
            .collect();

        if vectors.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        Ok(chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(index, (mut chunk, vector))| {
                let source = chunk
                    .metadata
                    .remove(SOURCE_METADATA_KEY)
                    .unwrap_or_else(|| unique_id.to_string());
                EmbeddedChunk {
                    page_content: chunk.page_content,
                    vector,
                    metadata: ChunkMetadata {
                        id: chunk_key(unique_id, index),
                        unique_loader_id: unique_id.to_string(),
                        source,
                        extra: chunk.metadata,
                    },
                }
            })
            .collect())
    }

    /// A cache entry is only trusted while the store still holds the loader's
    /// first and last chunk.
    async fn is_stored(&self, unique_id: &str, chunks: usize) -> Result<bool> {
        if chunks == 0 {
            return Ok(true);
        }
        let vector_db = self.vector_db()?;
        Ok(vector_db.has_key(&chunk_key(unique_id, 0)).await?
            && vector_db.has_key(&chunk_key(unique_id, chunks - 1)).await?)
    }

    fn record(&self, unique_id: &str, chunks: usize) {
        let mut registry = self.registry.write();
        match registry.iter_mut().find(|(id, _)| id == unique_id) {
            Some(entry) => entry.1 = chunks,
            None => registry.push((unique_id.to_string(), chunks)),
        }
    }

    fn vector_db(&self) -> Result<&Arc<dyn VectorDb>> {
        self.vector_db
            .as_ref()
            .ok_or_else(|| AppError::Configuration("vector database is not configured".to_string()))
    }

    // ============= Retrieval =============

    /// Chunks most similar to `query`, at most `search_result_count` of them.
    #[instrument(skip(self))]
    pub async fn get_context(&self, query: &str) -> Result<Vec<Chunk>> {
        let vector = self.embedding_model.embed_query(query).await?;
        self.vector_db()?
            .similarity_search(&vector, self.search_result_count)
            .await
    }

    /// Answer `query` with retrieved context.
    #[instrument(skip(self))]
    pub async fn query(&self, query: &str) -> Result<QueryResponse> {
        let context = self.get_context(query).await?;
        debug!(chunks = context.len(), "Retrieved context");

        let system = build_system_prompt(&context);
        let prompt = self.query_template.replace(QUERY_PLACEHOLDER, query);
        let result = self.model.generate(&system, &prompt).await?;

        let mut sources: Vec<String> = Vec::new();
        for chunk in context {
            if !sources.contains(&chunk.metadata.source) {
                sources.push(chunk.metadata.source);
            }
        }

        Ok(QueryResponse { result, sources })
    }

    // ============= Maintenance =============

    pub async fn get_embeddings_count(&self) -> Result<usize> {
        self.vector_db()?.get_vector_count().await
    }

    /// Remove everything a loader contributed. Returns `false` for an
    /// unknown loader.
    #[instrument(skip(self))]
    pub async fn delete_loader(&self, unique_id: &str) -> Result<bool> {
        let registered = self
            .registry
            .read()
            .iter()
            .find(|(id, _)| id == unique_id)
            .map(|(_, count)| *count);

        let cache_key = self.cache.as_ref().map(|cache| cache.compute_key(unique_id));
        let count = match (registered, &self.cache, &cache_key) {
            (Some(count), _, _) => Some(count),
            (None, Some(cache), Some(key)) => cache
                .get_seen(key)
                .await?
                .and_then(|seen| usize::try_from(seen).ok()),
            _ => None,
        };

        let Some(count) = count else {
            debug!(loader = %unique_id, "Unknown loader, nothing to delete");
            return Ok(false);
        };

        let keys: Vec<String> = (0..count).map(|index| chunk_key(unique_id, index)).collect();
        self.vector_db()?.delete_keys(&keys).await?;

        // Only forget the loader once its vectors are gone
        self.registry.write().retain(|(id, _)| id != unique_id);
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            cache.delete(key).await?;
        }
        self.loaders.write().retain(|l| l.unique_id() != unique_id);

        info!(loader = %unique_id, chunks = count, "Loader deleted");
        Ok(true)
    }

    /// Clear the vector database and forget ingested loaders, including
    /// their cache entries.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<()> {
        self.vector_db()?.reset().await?;

        let ids = self.loader_ids();
        if let Some(cache) = &self.cache {
            for id in &ids {
                cache.delete(&cache.compute_key(id)).await?;
            }
        }
        self.registry.write().clear();

        info!(loaders = ids.len(), "Application reset");
        Ok(())
    }

    // ============= Accessors =============

    pub fn search_result_count(&self) -> usize {
        self.search_result_count
    }

    pub fn query_template(&self) -> &str {
        &self.query_template
    }

    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    pub fn embedding_model(&self) -> &Arc<dyn Embeddings> {
        &self.embedding_model
    }

    /// Ids of ingested loaders, in ingestion order.
    pub fn loader_ids(&self) -> Vec<String> {
        self.registry.read().iter().map(|(id, _)| id.clone()).collect()
    }
}

fn build_system_prompt(context: &[Chunk]) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    prompt.push_str("\n\n");
    for (i, chunk) in context.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, chunk.page_content));
    }
    prompt
}
