//! Context builder for stage prompts
//!
//! Renders a `PassageSet` into the "research findings" block embedded in
//! the Critic and Composer instructions.

use serde::{Deserialize, Serialize};

use crate::document::{Passage, PassageSet};

/// Text used in place of findings when retrieval returned nothing
pub const NO_PASSAGES_NOTICE: &str =
    "No supporting passages were found in the document for this question.";

/// Context assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum tokens of passage text (rough: ~4 chars per token)
    pub max_context_tokens: usize,
    /// Include similarity score and chunk position for each passage
    pub include_metadata: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: 4000,
            include_metadata: true,
        }
    }
}

/// Context builder for assembling research findings
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    config: ContextConfig,
}

impl ContextBuilder {
    /// Create new context builder with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Render passages, best first, until the token budget is used up.
    /// The first passage is always included.
    pub fn build(&self, passages: &PassageSet) -> String {
        if passages.is_empty() {
            return NO_PASSAGES_NOTICE.to_string();
        }

        let mut parts = Vec::new();
        let mut total_tokens = 0;

        for (idx, passage) in passages.iter().enumerate() {
            let tokens = passage.text.len() / 4;
            if idx > 0 && total_tokens + tokens > self.config.max_context_tokens {
                break;
            }

            parts.push(self.format_passage(idx + 1, passage));
            total_tokens += tokens;
        }

        format!(
            "Retrieved passages ({} of {}):\n\n{}",
            parts.len(),
            passages.len(),
            parts.join("\n\n")
        )
    }

    fn format_passage(&self, index: usize, passage: &Passage) -> String {
        if self.config.include_metadata {
            format!(
                "[Passage {}] (score: {:.2}, chunk: {})\n{}",
                index, passage.score, passage.ordinal, passage.text
            )
        } else {
            format!("[Passage {}]\n{}", index, passage.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(ordinal: usize, text: &str, score: f32) -> Passage {
        Passage {
            ordinal,
            text: text.to_string(),
            score,
        }
    }

    #[test]
    fn test_build_empty_passages() {
        let builder = ContextBuilder::new();
        assert_eq!(builder.build(&PassageSet::empty()), NO_PASSAGES_NOTICE);
    }

    #[test]
    fn test_build_single_passage() {
        let builder = ContextBuilder::new();
        let set = PassageSet::new(vec![passage(3, "The Transformer uses attention", 0.91)]);

        let text = builder.build(&set);
        assert!(text.contains("[Passage 1] (score: 0.91, chunk: 3)"));
        assert!(text.contains("The Transformer uses attention"));
        assert!(text.starts_with("Retrieved passages (1 of 1)"));
    }

    #[test]
    fn test_build_respects_token_limit() {
        let builder = ContextBuilder::with_config(ContextConfig {
            max_context_tokens: 10,
            include_metadata: false,
        });
        let set = PassageSet::new(vec![
            passage(0, "Short", 0.9),
            passage(1, "This is a much longer passage that will exceed the token limit", 0.8),
        ]);

        let text = builder.build(&set);
        assert!(text.contains("(1 of 2)"));
        assert!(!text.contains("much longer"));
    }

    #[test]
    fn test_first_passage_always_included() {
        let builder = ContextBuilder::with_config(ContextConfig {
            max_context_tokens: 1,
            include_metadata: false,
        });
        let set = PassageSet::new(vec![passage(0, "A passage longer than the budget", 0.5)]);
        assert!(builder.build(&set).contains("A passage longer than the budget"));
    }
}
