use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{content_id, Loader, TextChunker, SOURCE_METADATA_KEY};
use crate::types::{AppError, LoaderChunk, Result};

/// Loads a UTF-8 text file.
///
/// The file is read once by [`open`](Self::open), and the loader id is
/// derived from its path and content. Editing the file therefore yields a
/// different id, and the edited document is ingested again.
pub struct FileLoader {
    id: String,
    path: PathBuf,
    chunker: TextChunker,
    content: String,
}

impl FileLoader {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = read_utf8(&path).await?;
        debug!(path = %path.display(), bytes = content.len(), "Loaded file");

        Ok(Self {
            id: file_id(&path, &content),
            path,
            chunker: TextChunker::default(),
            content,
        })
    }

    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn file_id(path: &Path, content: &str) -> String {
    content_id("FileLoader", &format!("{}\0{}", path.to_string_lossy(), content))
}

async fn read_utf8(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Loader(format!("Failed to read {}: {}", path.display(), e)))?;

    String::from_utf8(bytes)
        .map_err(|e| AppError::Loader(format!("{} is not valid UTF-8: {}", path.display(), e)))
}

#[async_trait]
impl Loader for FileLoader {
    fn unique_id(&self) -> &str {
        &self.id
    }

    /// Fails if the file changed since it was opened, since the id would no
    /// longer describe what is on disk.
    async fn init(&self) -> Result<()> {
        let current = read_utf8(&self.path).await?;
        if current != self.content {
            return Err(AppError::Loader(format!(
                "{} changed since it was opened",
                self.path.display()
            )));
        }
        Ok(())
    }

    async fn get_chunks(&self) -> Result<Vec<LoaderChunk>> {
        let source = self.path.to_string_lossy();
        Ok(self
            .chunker
            .chunk(&self.content)
            .into_iter()
            .map(|chunk| LoaderChunk::new(chunk).with_metadata(SOURCE_METADATA_KEY, source.as_ref()))
            .collect())
    }
}
