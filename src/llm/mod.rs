//! Language-model completion client
//!
//! Provides the `CompletionService` seam used by the Critic and Composer
//! stages, and an OpenAI-compatible HTTP implementation of it.

pub mod client;
pub mod types;

// Re-export commonly used types
pub use client::{ChatClient, DEFAULT_LLM_URL, DEFAULT_MODEL};
pub use types::{ChatMessage, ChatRole, CompletionService};
