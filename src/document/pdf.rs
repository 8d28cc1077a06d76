//! PDF text extraction
//!
//! Extraction runs on the blocking pool; `pdf-extract` can panic on
//! malformed input, and a panicking task surfaces as a `JoinError` which is
//! reported as a `PdfExtraction` error.

use crate::errors::{PipelineError, Result};
use std::path::Path;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Confirm the document path is a regular file this process can open
///
/// Called at startup, before any stage runs.
pub fn check_readable(path: &Path) -> Result<()> {
    let access_error = |e: std::io::Error| PipelineError::FileAccess {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let file = std::fs::File::open(path).map_err(access_error)?;
    let metadata = file.metadata().map_err(access_error)?;

    if !metadata.is_file() {
        return Err(PipelineError::FileAccess {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }

    Ok(())
}

/// Read a PDF and return its text with whitespace runs collapsed
pub async fn extract_text(path: &Path) -> Result<String> {
    check_readable(path)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| PipelineError::FileAccess {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(PipelineError::PdfExtraction {
            path: path.to_path_buf(),
            reason: "missing %PDF- header".to_string(),
        });
    }

    let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| PipelineError::PdfExtraction {
            path: path.to_path_buf(),
            reason: format!("extractor aborted: {}", e),
        })?
        .map_err(|e| PipelineError::PdfExtraction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(PipelineError::PdfExtraction {
            path: path.to_path_buf(),
            reason: "document contains no extractable text".to_string(),
        });
    }

    debug!(path = %path.display(), chars = text.len(), "Extracted PDF text");
    Ok(text)
}

/// Collapse every whitespace run into a single space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  Attention\n\nIs   All\tYou Need "),
            "Attention Is All You Need"
        );
        assert_eq!(normalize_whitespace("\n\n"), "");
    }

    #[test]
    fn test_check_readable_missing() {
        let err = check_readable(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, PipelineError::FileAccess { .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_check_readable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_readable(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::FileAccess { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_readable_without_permission() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        std::fs::write(&path, "%PDF-1.4").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores file modes; only check where the open really fails
        if std::fs::File::open(&path).is_err() {
            let err = check_readable(&path).unwrap_err();
            assert!(matches!(err, PipelineError::FileAccess { .. }));
        } else {
            assert!(check_readable(&path).is_ok());
        }
    }

    #[test]
    fn test_check_readable_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        std::fs::write(&path, "%PDF-1.4").unwrap();
        assert!(check_readable(&path).is_ok());
    }

    #[tokio::test]
    async fn test_extract_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, "just some plain text").unwrap();

        let err = extract_text(&path).await.unwrap_err();
        assert!(matches!(err, PipelineError::PdfExtraction { .. }));
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let err = extract_text(Path::new("./no-such-paper.pdf")).await.unwrap_err();
        assert!(matches!(err, PipelineError::FileAccess { .. }));
    }

    #[tokio::test]
    async fn test_extract_fixture() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/attention.pdf");
        let text = extract_text(&path).await.unwrap();
        assert_eq!(text, "Attention Is All You Need");
    }
}
