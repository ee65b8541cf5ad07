//! Retrieval Augmented Generation (RAG) building blocks
//!
//! # Module Structure
//!
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedding model contract and the OpenAI client
//! - [`rag::chunker`](crate::rag::chunker) - Word-window text chunking for loaders
//! - [`rag::cache`](crate::rag::cache) - Ingestion cache that skips already-embedded loaders
//!
//! # RAG Pipeline
//!
//! The pipeline driven by [`RagApplication`](crate::core::RagApplication):
//!
//! 1. **Ingestion** - Loader content is chunked and embedded
//! 2. **Storage** - Embedded chunks are stored in the vector database
//! 3. **Retrieval** - The query is embedded and similar chunks retrieved
//! 4. **Generation** - The model answers with the retrieved context

#![allow(missing_docs)]

pub mod cache;
pub mod chunker;
pub mod embeddings;
