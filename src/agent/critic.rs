//! Critic stage: the Expert Agent reviews the retrieved passages

use crate::agent::profiles::{self, CRITIQUE_TASK, EXPERT_AGENT};
use crate::document::PassageSet;
use crate::errors::Result;
use crate::llm::CompletionService;
use crate::rag::ContextBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Commentary on the relevance and correctness of the findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critique(String);

impl Critique {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Critique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runs one completion per critique; model output is accepted as-is
pub struct Critic {
    llm: Arc<dyn CompletionService>,
    context: ContextBuilder,
}

impl Critic {
    pub fn new(llm: Arc<dyn CompletionService>, context: ContextBuilder) -> Self {
        Self { llm, context }
    }

    pub async fn critique(&self, question: &str, passages: &PassageSet) -> Result<Critique> {
        let findings = self.context.build(passages);
        let messages = profiles::render(
            &EXPERT_AGENT,
            &CRITIQUE_TASK,
            question,
            &[("Research agent's findings", findings.as_str())],
        );

        let text = self.llm.complete(&messages).await?;
        info!(model = %self.llm.model(), chars = text.len(), "Critique received");

        Ok(Critique::new(text))
    }
}
