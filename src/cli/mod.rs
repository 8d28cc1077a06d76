//! CLI module for pdfcrew
//!
//! Handles command-line argument parsing and reading the question.

pub mod args;
pub mod input;

pub use args::{Args, Commands, Verbosity};
pub use input::{normalize_question, QuestionPrompt, QUESTION_PROMPT};
