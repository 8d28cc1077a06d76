//! pdfcrew - Question answering over a PDF with a three-agent pipeline
//!
//! A Research Agent retrieves passages from one PDF, an Expert Agent
//! critiques them, and a Professional Writer turns both into a single
//! answer paragraph.
//!
//! # Architecture
//!
//! - **document**: PDF extraction, chunking, embeddings and the searchable index
//! - **rag**: Retriever stage and prompt context rendering
//! - **llm**: completion service seam and OpenAI-compatible client
//! - **agent**: Critic and Composer stages, state machine, `Crew` driver

pub mod errors;

// Re-export commonly used types
pub use errors::{PipelineError, Result};

pub mod agent;
pub mod cli;
pub mod config;
pub mod display;
pub mod document;
pub mod llm;
pub mod rag;
pub mod telemetry;
