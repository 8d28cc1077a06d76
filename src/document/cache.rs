//! On-disk cache of built document indexes
//!
//! One JSON file per (document, embedding model, chunking) combination.
//! A cache entry is only reused when the document's size and modification
//! time still match; anything else is treated as a miss.

use crate::document::chunker::Chunker;
use crate::document::embedding::Embedder;
use crate::document::index::{DocumentIndex, IndexedChunk};
use crate::errors::{PipelineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};

/// Identity of a cached index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub document: PathBuf,
    pub file_len: u64,
    pub modified_secs: u64,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl CacheKey {
    /// Derive the key from the document's current metadata
    pub fn for_document(path: &Path, embedding_model: &str, chunker: &Chunker) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::FileAccess {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let modified_secs = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let document = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        Ok(Self {
            document,
            file_len: metadata.len(),
            modified_secs,
            embedding_model: embedding_model.to_string(),
            chunk_size: chunker.chunk_size(),
            chunk_overlap: chunker.overlap(),
        })
    }

    /// File name of the cache entry
    fn file_name(&self) -> String {
        let stem = self
            .document
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        let mut hasher = DefaultHasher::new();
        self.document.hash(&mut hasher);
        self.embedding_model.hash(&mut hasher);
        self.chunk_size.hash(&mut hasher);
        self.chunk_overlap.hash(&mut hasher);

        format!("{}-{:016x}.json", stem, hasher.finish())
    }
}

/// Serialized form of a built index
#[derive(Debug, Serialize, Deserialize)]
struct CachedIndex {
    key: CacheKey,
    built_at: DateTime<Utc>,
    chunks: Vec<IndexedChunk>,
}

/// Directory of cached indexes
#[derive(Debug, Clone)]
pub struct IndexCache {
    dir: PathBuf,
}

impl IndexCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the entry for `key` is stored at
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Load chunks for `key`; stale or unreadable entries are misses
    pub fn load(&self, key: &CacheKey) -> Option<Vec<IndexedChunk>> {
        let path = self.entry_path(key);
        let contents = std::fs::read_to_string(&path).ok()?;

        match serde_json::from_str::<CachedIndex>(&contents) {
            Ok(cached) if &cached.key == key => {
                debug!(path = %path.display(), built_at = %cached.built_at, "Index cache hit");
                Some(cached.chunks)
            }
            Ok(_) => {
                debug!(path = %path.display(), "Index cache entry is stale");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable index cache entry");
                None
            }
        }
    }

    /// Persist chunks for `key`
    pub fn store(&self, key: &CacheKey, chunks: &[IndexedChunk]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let cached = CachedIndex {
            key: key.clone(),
            built_at: Utc::now(),
            chunks: chunks.to_vec(),
        };

        let path = self.entry_path(key);
        std::fs::write(&path, serde_json::to_vec(&cached)?)?;
        Ok(path)
    }

    /// Reuse a cached index for `path`, or build and cache a fresh one
    ///
    /// Cache write failures are logged and otherwise ignored.
    pub async fn load_or_build(
        &self,
        path: &Path,
        embedder: Arc<dyn Embedder>,
        chunker: Chunker,
    ) -> Result<DocumentIndex> {
        let key = CacheKey::for_document(path, embedder.model(), &chunker)?;

        if let Some(chunks) = self.load(&key) {
            info!(source = %path.display(), chunks = chunks.len(), "Reusing cached document index");
            return Ok(DocumentIndex::from_chunks(
                path.display().to_string(),
                chunks,
                embedder,
            ));
        }

        self.build_and_store(key, path, embedder, chunker).await
    }

    /// Build a fresh index for `path` and overwrite any cached entry
    pub async fn rebuild(
        &self,
        path: &Path,
        embedder: Arc<dyn Embedder>,
        chunker: Chunker,
    ) -> Result<DocumentIndex> {
        let key = CacheKey::for_document(path, embedder.model(), &chunker)?;
        self.build_and_store(key, path, embedder, chunker).await
    }

    async fn build_and_store(
        &self,
        key: CacheKey,
        path: &Path,
        embedder: Arc<dyn Embedder>,
        chunker: Chunker,
    ) -> Result<DocumentIndex> {
        let index = DocumentIndex::build(path, embedder, chunker).await?;

        match self.store(&key, index.chunks()) {
            Ok(entry) => debug!(path = %entry.display(), "Wrote index cache entry"),
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "Failed to write index cache"),
        }

        Ok(index)
    }
}
