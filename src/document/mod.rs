//! Document index
//!
//! Turns one PDF into a searchable embedding index:
//! - PDF: text extraction and startup checks
//! - Chunker: overlapping word windows
//! - Embedding: the `Embedder` seam and its Ollama implementation
//! - Index: cosine-similarity search producing a `PassageSet`
//! - Cache: optional on-disk reuse of built indexes

pub mod cache;
pub mod chunker;
pub mod embedding;
pub mod index;
pub mod pdf;

// Re-export key types
pub use cache::IndexCache;
pub use chunker::Chunker;
pub use embedding::{Embedder, OllamaEmbedder};
pub use index::{cosine_similarity, DocumentIndex, IndexedChunk, Passage, PassageSet, SearchParams};
