//! Message types and the completion service trait

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One chat message sent to the completion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A blocking (awaited) request to a language-model service
///
/// Implementations return the generated text unmodified; callers decide
/// what to do with it.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Generate a reply for the given conversation
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier used for completions
    fn model(&self) -> &str;
}
