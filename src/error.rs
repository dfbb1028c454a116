//! Error types for pdflayout library.

use std::io;
use thiserror::Error;

/// Result type alias for pdflayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout reconstruction.
///
/// Most variants are absorbed inside the pipeline with a fallback; only
/// [`Error::InvalidGeometry`] and document-level failures reach callers of
/// [`crate::LayoutSession::analyze`].
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A bounding box violated `x0 <= x1` / `y0 <= y1` or held a non-finite value.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A fragment from the extraction boundary could not be used.
    #[error("Malformed fragment: {0}")]
    MalformedFragment(String),

    /// Column detection could not produce a usable partition.
    #[error("Column detection failed: {0}")]
    ColumnDetection(String),

    /// The table-finding collaborator failed.
    #[error("Table detection failed: {0}")]
    TableDetection(String),

    /// A page's analysis pipeline failed.
    #[error("Failed to analyze page {page}: {reason}")]
    PageAnalysis {
        /// 1-indexed page number
        page: u32,
        /// What went wrong
        reason: String,
    },

    /// The document could not be loaded.
    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// A configuration value is unusable (e.g. a pattern that does not compile).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error during rendering (tables, Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Wrap any error as a page analysis failure for `page`.
    pub fn page_analysis(page: u32, reason: impl std::fmt::Display) -> Self {
        Error::PageAnalysis {
            page,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::page_analysis(3, "boom");
        assert_eq!(err.to_string(), "Failed to analyze page 3: boom");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
