//! Mock implementations for testing.
//!
//! This module provides mock models, embeddings, loaders and a recording
//! vector database that can be used across different test files without
//! duplication. None of them touch the network.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use ragloom::db::{InMemoryVectorDb, VectorDb};
use ragloom::llm::Model;
use ragloom::loaders::Loader;
use ragloom::rag::embeddings::Embeddings;
use ragloom::types::{AppError, Chunk, EmbeddedChunk, LoaderChunk, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock model that records every prompt it receives.
///
/// ```ignore
/// let model = MockModel::new("The answer");
/// let app = builder.set_model(Arc::new(model.clone()) as Arc<dyn Model>);
/// assert_eq!(model.calls().len(), 1);
/// ```
#[derive(Clone)]
pub struct MockModel {
    name: String,
    response: String,
    temperature: f32,
    should_fail: bool,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    init_calls: Arc<AtomicUsize>,
}

impl MockModel {
    /// Create a new mock model that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            name: "mock-model".to_string(),
            response: response.to_string(),
            temperature: 0.0,
            should_fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
            init_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock model that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Recorded `(system, prompt)` pairs.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    pub fn init_count(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Model for MockModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    async fn init(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(AppError::LLM("Mock failure".to_string()));
        }
        self.calls
            .lock()
            .push((system.to_string(), prompt.to_string()));
        Ok(self.response.clone())
    }
}

/// Keyword-based embeddings: dimension `i` is 1.0 when the text mentions
/// `keywords[i]` (case-insensitive), plus a small constant bias.
///
/// Texts sharing keywords end up close under cosine similarity, which is
/// enough to make retrieval order predictable in tests.
#[derive(Clone)]
pub struct MockEmbeddings {
    keywords: Vec<String>,
    batch_sizes: Arc<Mutex<Vec<usize>>>,
    query_calls: Arc<AtomicUsize>,
}

impl MockEmbeddings {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            batch_sizes: Arc::new(Mutex::new(Vec::new())),
            query_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sizes of every `embed_documents` batch, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().clone()
    }

    pub fn query_count(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .map(|k| if text.contains(k.as_str()) { 1.0 } else { 0.01 })
            .collect()
    }
}

#[async_trait]
impl Embeddings for MockEmbeddings {
    fn dimensions(&self) -> usize {
        self.keywords.len()
    }

    fn model_name(&self) -> &str {
        "mock-embeddings"
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batch_sizes.lock().push(texts.len());
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vectorize(text))
    }
}

/// Loader returning fixed chunks and counting `init` calls.
#[derive(Clone)]
pub struct MockLoader {
    id: String,
    chunks: Vec<LoaderChunk>,
    init_calls: Arc<AtomicUsize>,
    chunk_calls: Arc<AtomicUsize>,
}

impl MockLoader {
    pub fn new(id: &str, texts: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            chunks: texts
                .iter()
                .map(|t| LoaderChunk::new(*t).with_metadata("source", id))
                .collect(),
            init_calls: Arc::new(AtomicUsize::new(0)),
            chunk_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A loader with `count` numbered chunks.
    pub fn numbered(id: &str, count: usize) -> Self {
        let texts: Vec<String> = (0..count).map(|i| format!("chunk number {}", i)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        Self::new(id, &refs)
    }

    pub fn init_count(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Loader for MockLoader {
    fn unique_id(&self) -> &str {
        &self.id
    }

    async fn init(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_chunks(&self) -> Result<Vec<LoaderChunk>> {
        self.chunk_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chunks.clone())
    }
}

/// Vector database that delegates to [`InMemoryVectorDb`] and records calls.
#[derive(Clone, Default)]
pub struct RecordingVectorDb {
    inner: InMemoryVectorDb,
    init_dimensions: Arc<Mutex<Vec<usize>>>,
    inserted_keys: Arc<Mutex<Vec<String>>>,
    deleted_keys: Arc<Mutex<Vec<String>>>,
    fail_deletes: Arc<AtomicBool>,
}

impl RecordingVectorDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_dimensions(&self) -> Vec<usize> {
        self.init_dimensions.lock().clone()
    }

    /// Keys of every inserted chunk, in insertion order.
    pub fn inserted_keys(&self) -> Vec<String> {
        self.inserted_keys.lock().clone()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted_keys.lock().clone()
    }

    /// Make `delete_keys` fail until switched back off.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl VectorDb for RecordingVectorDb {
    async fn init(&self, dimensions: usize) -> Result<()> {
        self.init_dimensions.lock().push(dimensions);
        self.inner.init(dimensions).await
    }

    async fn insert_chunks(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize> {
        self.inserted_keys
            .lock()
            .extend(chunks.iter().map(|c| c.key().to_string()));
        self.inner.insert_chunks(chunks).await
    }

    async fn similarity_search(&self, query: &[f32], k: usize) -> Result<Vec<Chunk>> {
        self.inner.similarity_search(query, k).await
    }

    async fn get_vector_count(&self) -> Result<usize> {
        self.inner.get_vector_count().await
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        self.inner.has_key(key).await
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Database("delete failed".to_string()));
        }
        self.deleted_keys.lock().extend(keys.iter().cloned());
        self.inner.delete_keys(keys).await
    }

    async fn reset(&self) -> Result<()> {
        self.inner.reset().await
    }
}
