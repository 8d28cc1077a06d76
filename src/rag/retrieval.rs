//! Retriever stage: semantic search over the document index

use crate::document::{DocumentIndex, PassageSet, SearchParams};
use crate::errors::{PipelineError, Result};
use std::sync::Arc;
use tracing::info;

/// Finds passages relevant to a question
#[derive(Debug, Clone)]
pub struct Retriever {
    index: Arc<DocumentIndex>,
    params: SearchParams,
}

impl Retriever {
    /// Create retriever with default search parameters
    pub fn new(index: Arc<DocumentIndex>) -> Self {
        Self::with_params(index, SearchParams::default())
    }

    /// Create with custom search parameters
    pub fn with_params(index: Arc<DocumentIndex>, params: SearchParams) -> Self {
        Self { index, params }
    }

    /// Retrieve passages for a question
    ///
    /// An empty result is valid and means nothing relevant was found.
    pub async fn retrieve(&self, question: &str) -> Result<PassageSet> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::EmptyQuestion);
        }

        let passages = self.index.search(question, &self.params).await?;

        info!(
            source = %self.index.source(),
            passages = passages.len(),
            top_k = self.params.top_k,
            "Retrieved passages"
        );

        Ok(passages)
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }
}
