//! # ragloom
//!
//! Assemble a retrieval-augmented generation (RAG) application from pluggable
//! parts: document loaders, an embedding model, a vector database, a language
//! model, an optional ingestion cache and a prompt template.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragloom::{InMemoryVectorDb, RagApplicationBuilder, SimpleModel, TextLoader};
//!
//! #[tokio::main]
//! async fn main() -> ragloom::Result<()> {
//!     let app = RagApplicationBuilder::new()
//!         .add_loader(Arc::new(TextLoader::new("The Eiffel Tower is 330 metres tall.")))
//!         .set_vector_db(Arc::new(InMemoryVectorDb::new()))
//!         .set_model(SimpleModel::OpenAiGpt4)
//!         .build()
//!         .await?;
//!
//!     let answer = app.query("How tall is the Eiffel Tower?").await?;
//!     println!("{}", answer.result);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Builder and application
//! - [`db`] - Vector storage contract and the in-memory backend
//! - [`llm`] - Model contract, presets and the OpenAI chat model
//! - [`loaders`] - Loader contract, text and file loaders
//! - [`rag`] - Embeddings, chunking and the ingestion cache
//! - [`types`] - Chunk types and error handling
//! - [`utils`] - Environment and TOML configuration
//!
//! ## Configuration
//!
//! The OpenAI clients read `OPENAI_API_KEY` and `OPENAI_API_BASE` from the
//! environment (a `.env` file is honored). Builder defaults can be kept in a
//! TOML file, see [`ApplicationConfig`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Application builder and runtime.
pub mod core;
/// Vector database contract and backends.
pub mod db;
/// Language model contract and clients.
pub mod llm;
/// Document loaders.
pub mod loaders;
/// Embeddings, chunking and caching.
pub mod rag;
/// Core types (chunks, responses, errors).
#[allow(missing_docs)]
pub mod types;
/// Configuration utilities (environment, TOML).
pub mod utils;

// Re-export commonly used types
pub use crate::core::{RagApplication, RagApplicationBuilder};
pub use db::{InMemoryVectorDb, VectorDb};
pub use llm::{Model, ModelSelection, OpenAi, SimpleModel};
pub use loaders::{FileLoader, Loader, TextChunker, TextLoader};
pub use rag::cache::{Cache, CacheStats, InMemoryCache, JsonFileCache};
pub use rag::embeddings::{Embeddings, OpenAiEmbeddingModel, OpenAiEmbeddings};
pub use types::{AppError, Chunk, EmbeddedChunk, QueryResponse, Result};
pub use utils::{ApplicationConfig, ConfigError, OpenAiSettings};
