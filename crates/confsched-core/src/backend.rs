use std::path::Path;

use thiserror::Error;

use crate::PageLines;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract lines: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for positioned-line extraction backends.
///
/// Implementors provide the low-level page-to-lines step; the scan logic
/// (session segmentation, header classification, participant parsing) lives
/// in `confsched_parsing::ScheduleExtractor`. The returned pages must be in
/// document order, each with its lines in reading order, fully materialized
/// before parsing starts.
pub trait PageBackend: Send + Sync {
    /// Extract the positioned lines of every page of a document.
    fn extract_lines(&self, path: &Path) -> Result<Vec<PageLines>, BackendError>;
}
