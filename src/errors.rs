//! Error types for pdfcrew
//!
//! Every fatal condition of a pipeline run maps onto one `PipelineError`
//! variant. Configuration-class errors surface before any stage executes;
//! service-class errors surface at the stage that issued the failing call.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the question-answering pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Pipeline state machine transition errors
    #[error("Invalid state transition from {from} on {event}: {reason}")]
    InvalidTransition {
        from: String,
        event: String,
        reason: String,
    },

    /// Configuration errors (bad values, unreadable config file or environment)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The configured PDF is missing or unreadable
    #[error("Cannot access document {path}: {reason}")]
    FileAccess { path: PathBuf, reason: String },

    /// The file exists but no text could be extracted from it
    #[error("Failed to extract text from {path}: {reason}")]
    PdfExtraction { path: PathBuf, reason: String },

    /// The question was empty or whitespace only
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// Completion or embedding service returned an error
    #[error("{service} service error: {message}")]
    ServiceError { service: String, message: String },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelineError {
    /// Build a service error for the named collaborator
    pub fn service(service: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::ServiceError {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Errors raised while reading configuration or opening the document
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PipelineError::ConfigError(_)
                | PipelineError::FileAccess { .. }
                | PipelineError::PdfExtraction { .. }
                | PipelineError::EmptyQuestion
        )
    }

    /// Errors raised by an external language-model or embedding service
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            PipelineError::ServiceError { .. } | PipelineError::HttpError(_)
        )
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::FileAccess {
            path: PathBuf::from("./missing.pdf"),
            reason: "No such file or directory".to_string(),
        };
        assert!(err.to_string().contains("missing.pdf"));
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = PipelineError::InvalidTransition {
            from: "Idle".to_string(),
            event: "AnswerReady".to_string(),
            reason: "Composer has not run".to_string(),
        };
        assert!(err.to_string().contains("Idle"));
        assert!(err.to_string().contains("AnswerReady"));
    }

    #[test]
    fn test_error_classification() {
        assert!(PipelineError::EmptyQuestion.is_configuration_error());
        assert!(PipelineError::ConfigError("bad".into()).is_configuration_error());
        assert!(!PipelineError::EmptyQuestion.is_service_error());

        let err = PipelineError::service("completion", "HTTP 500");
        assert!(err.is_service_error());
        assert!(!err.is_configuration_error());
        assert_eq!(err.to_string(), "completion service error: HTTP 500");
    }
}
