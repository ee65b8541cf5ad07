//! Document loaders
//!
//! A [`Loader`] yields the chunks of one document source. Its
//! [`unique_id`](Loader::unique_id) must be stable for unchanged content: the
//! application derives chunk keys and cache keys from it.
//!
//! - [`TextLoader`] - inline text
//! - [`FileLoader`] - a UTF-8 file on disk

#![allow(missing_docs)]

pub mod file;
pub mod text;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::types::{LoaderChunk, Result};

pub use crate::rag::chunker::TextChunker;
pub use file::FileLoader;
pub use text::TextLoader;

/// Metadata key every bundled loader sets on its chunks.
pub const SOURCE_METADATA_KEY: &str = "source";

/// Source of document chunks.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Stable identifier of this loader's content
    fn unique_id(&self) -> &str;

    /// Fetch or parse the underlying source. Called once before `get_chunks`
    /// during ingestion.
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Chunks in a stable order; chunk keys are derived from their positions
    async fn get_chunks(&self) -> Result<Vec<LoaderChunk>>;
}

/// `{prefix}_{hex sha256 of input}`, the id scheme of the bundled loaders.
pub(crate) fn content_id(prefix: &str, input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{}_{:x}", prefix, hasher.finalize())
}
