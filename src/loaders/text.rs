use async_trait::async_trait;

use super::{content_id, Loader, TextChunker, SOURCE_METADATA_KEY};
use crate::types::{LoaderChunk, Result};

/// Loads a string held in memory.
pub struct TextLoader {
    id: String,
    text: String,
    source: String,
    chunker: TextChunker,
}

impl TextLoader {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: content_id("TextLoader", &text),
            text,
            source: "inline".to_string(),
            chunker: TextChunker::default(),
        }
    }

    /// Value reported as the chunk `source`; defaults to `inline`.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[async_trait]
impl Loader for TextLoader {
    fn unique_id(&self) -> &str {
        &self.id
    }

    async fn get_chunks(&self) -> Result<Vec<LoaderChunk>> {
        Ok(self
            .chunker
            .chunk(&self.text)
            .into_iter()
            .map(|chunk| LoaderChunk::new(chunk).with_metadata(SOURCE_METADATA_KEY, &self.source))
            .collect())
    }
}
