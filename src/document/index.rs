//! Searchable embedding index over one document
//!
//! Built once, read-only afterwards. Search is a brute-force cosine scan
//! over every chunk, which keeps results reproducible for a fixed query
//! embedding: ordering is by descending score with ties broken by chunk
//! ordinal.

use crate::document::chunker::Chunker;
use crate::document::embedding::Embedder;
use crate::document::pdf;
use crate::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Search parameters for retrieval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Maximum number of passages to return
    pub top_k: usize,
    /// Minimum cosine similarity (-1.0 to 1.0)
    pub min_score: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_score: 0.0,
        }
    }
}

/// One chunk of the document with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub ordinal: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A retrieved fragment of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Position of the chunk within the document
    pub ordinal: usize,
    pub text: String,
    pub score: f32,
}

/// Ordered passages returned for one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassageSet {
    passages: Vec<Passage>,
}

impl PassageSet {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Passage> {
        self.passages.iter()
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// Chunk ordinals in result order
    pub fn ordinals(&self) -> Vec<usize> {
        self.passages.iter().map(|p| p.ordinal).collect()
    }
}

impl<'a> IntoIterator for &'a PassageSet {
    type Item = &'a Passage;
    type IntoIter = std::slice::Iter<'a, Passage>;

    fn into_iter(self) -> Self::IntoIter {
        self.passages.iter()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for empty, mismatched or zero-length vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Embedding index over a single document
#[derive(Clone)]
pub struct DocumentIndex {
    source: String,
    chunks: Vec<IndexedChunk>,
    embedder: Arc<dyn Embedder>,
}

impl fmt::Debug for DocumentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentIndex")
            .field("source", &self.source)
            .field("chunks", &self.chunks.len())
            .field("embedding_model", &self.embedder.model())
            .finish()
    }
}

impl DocumentIndex {
    /// Extract, chunk and embed a PDF
    pub async fn build(path: &Path, embedder: Arc<dyn Embedder>, chunker: Chunker) -> Result<Self> {
        let text = pdf::extract_text(path).await?;
        Self::from_text(path.display().to_string(), &text, embedder, chunker).await
    }

    /// Chunk and embed already-extracted text
    pub async fn from_text(
        source: impl Into<String>,
        text: &str,
        embedder: Arc<dyn Embedder>,
        chunker: Chunker,
    ) -> Result<Self> {
        let source = source.into();
        let texts = chunker.chunk(text);
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != texts.len() {
            return Err(PipelineError::service(
                "embedding",
                format!(
                    "expected {} embeddings, received {}",
                    texts.len(),
                    embeddings.len()
                ),
            ));
        }

        let chunks = texts
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(ordinal, (text, embedding))| IndexedChunk {
                ordinal,
                text,
                embedding,
            })
            .collect::<Vec<_>>();

        info!(
            source = %source,
            chunks = chunks.len(),
            model = %embedder.model(),
            "Built document index"
        );

        Ok(Self {
            source,
            chunks,
            embedder,
        })
    }

    /// Reassemble an index from previously embedded chunks
    pub fn from_chunks(
        source: impl Into<String>,
        chunks: Vec<IndexedChunk>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            source: source.into(),
            chunks,
            embedder,
        }
    }

    /// Rank chunks by similarity to the query
    pub async fn search(&self, query: &str, params: &SearchParams) -> Result<PassageSet> {
        if self.chunks.is_empty() || params.top_k == 0 {
            return Ok(PassageSet::empty());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<Passage> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, &query_embedding);
                (score >= params.min_score).then(|| Passage {
                    ordinal: chunk.ordinal,
                    text: chunk.text.clone(),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        scored.truncate(params.top_k);

        Ok(PassageSet::new(scored))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn chunks(&self) -> &[IndexedChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn embedding_model(&self) -> &str {
        self.embedder.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Counts occurrences of a few fixed keywords
    struct KeywordEmbedder;

    const KEYWORDS: [&str; 4] = ["attention", "transformer", "inspection", "roof"];

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(KEYWORDS
                .iter()
                .map(|k| lower.matches(k).count() as f32)
                .collect())
        }

        fn model(&self) -> &str {
            "keyword"
        }
    }

    async fn index(text: &str) -> DocumentIndex {
        DocumentIndex::from_text(
            "test.pdf",
            text,
            Arc::new(KeywordEmbedder),
            Chunker::new(4, 0).unwrap(),
        )
        .await
        .unwrap()
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_and_degenerate() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let idx = index("roof has minor damage overall attention is all you need today").await;
        assert_eq!(idx.len(), 3);

        let params = SearchParams {
            top_k: 5,
            min_score: 0.5,
        };
        let passages = idx.search("attention please", &params).await.unwrap();
        assert_eq!(passages.len(), 1);
        assert!(passages.passages()[0].text.contains("attention"));
    }

    #[tokio::test]
    async fn test_search_is_reproducible_and_tie_ordered() {
        let idx = index("attention one two three attention four five six attention").await;
        let params = SearchParams::default();

        let first = idx.search("attention", &params).await.unwrap();
        let second = idx.search("attention", &params).await.unwrap();

        assert_eq!(first.ordinals(), second.ordinals());
        // Equal scores fall back to document order
        assert_eq!(first.ordinals(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_search_respects_top_k() {
        let idx = index("attention a b c attention d e f attention g h i").await;
        let params = SearchParams {
            top_k: 2,
            min_score: 0.0,
        };
        assert_eq!(idx.search("attention", &params).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty_set() {
        let idx = index("").await;
        assert!(idx.is_empty());
        let passages = idx.search("anything", &SearchParams::default()).await.unwrap();
        assert!(passages.is_empty());
    }

    #[tokio::test]
    async fn test_from_chunks_preserves_embeddings() {
        let built = index("attention is all you need").await;
        let rebuilt = DocumentIndex::from_chunks(
            built.source(),
            built.chunks().to_vec(),
            Arc::new(KeywordEmbedder),
        );
        assert_eq!(rebuilt.chunks(), built.chunks());
        assert_eq!(rebuilt.embedding_model(), "keyword");
    }
}
