//! Composer stage: the Professional Writer turns findings and critique
//! into one paragraph for the user

use crate::agent::critic::Critique;
use crate::agent::profiles::{self, PROFESSIONAL_WRITER, SUMMARIZING_TASK};
use crate::document::PassageSet;
use crate::errors::Result;
use crate::llm::CompletionService;
use crate::rag::ContextBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Used when the model returns nothing but whitespace
pub const FALLBACK_ANSWER: &str =
    "The document did not provide enough material to answer this question.";

/// Final answer paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer(String);

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runs one completion per answer
pub struct Composer {
    llm: Arc<dyn CompletionService>,
    context: ContextBuilder,
}

impl Composer {
    pub fn new(llm: Arc<dyn CompletionService>, context: ContextBuilder) -> Self {
        Self { llm, context }
    }

    pub async fn compose(
        &self,
        question: &str,
        passages: &PassageSet,
        critique: &Critique,
    ) -> Result<Answer> {
        let findings = self.context.build(passages);
        let messages = profiles::render(
            &PROFESSIONAL_WRITER,
            &SUMMARIZING_TASK,
            question,
            &[
                ("Research agent's findings", findings.as_str()),
                ("Expert agent's critique", critique.as_str()),
            ],
        );

        let text = self.llm.complete(&messages).await?;
        let text = text.trim();

        if text.is_empty() {
            warn!(model = %self.llm.model(), "Composer returned an empty answer; using fallback");
            return Ok(Answer::new(FALLBACK_ANSWER));
        }

        info!(model = %self.llm.model(), chars = text.len(), "Answer composed");
        Ok(Answer::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        reply: &'static str,
        last_prompt: Mutex<Option<String>>,
    }

    impl Canned {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl CompletionService for Canned {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            *self.last_prompt.lock().unwrap() = messages.last().map(|m| m.content.clone());
            Ok(self.reply.to_string())
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn test_compose_includes_critique() {
        let llm = Arc::new(Canned::new("\nThe paper introduces the Transformer.\n"));
        let composer = Composer::new(llm.clone(), ContextBuilder::new());

        let answer = composer
            .compose(
                "What is the main topic?",
                &PassageSet::empty(),
                &Critique::new("Findings are thin"),
            )
            .await
            .unwrap();

        assert_eq!(answer.as_str(), "The paper introduces the Transformer.");
        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Findings are thin"));
        assert!(prompt.contains("What is the main topic?"));
    }

    #[tokio::test]
    async fn test_blank_reply_falls_back() {
        let composer = Composer::new(Arc::new(Canned::new("   \n")), ContextBuilder::new());
        let answer = composer
            .compose("Q", &PassageSet::empty(), &Critique::new(""))
            .await
            .unwrap();
        assert_eq!(answer.as_str(), FALLBACK_ANSWER);
    }
}
