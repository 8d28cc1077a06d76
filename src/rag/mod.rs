//! Retrieval stage
//!
//! - Retriever: question -> PassageSet via the document index
//! - Context Builder: renders a PassageSet into prompt text for the
//!   Critic and Composer stages

pub mod context;
pub mod retrieval;

// Re-export key types
pub use context::{ContextBuilder, ContextConfig, NO_PASSAGES_NOTICE};
pub use retrieval::Retriever;
