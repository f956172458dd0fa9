use std::path::Path;

use thiserror::Error;

pub mod config;
pub mod cursor;
pub mod extractor;
pub mod header;
pub mod participants;
pub mod segmenter;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use cursor::LineCursor;
pub use extractor::ScheduleExtractor;
pub use header::HeaderRule;
// Re-export domain types from core (canonical definitions live there)
pub use confsched_core::{
    BackendError, ExtractStats, PageBackend, PageLines, Paper, ScheduleExtraction, Session,
    TextLine,
};

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Extract session records from a document using the given backend for
/// positioned-line extraction.
///
/// Pipeline:
/// 1. Extract positioned lines per page via `backend`
/// 2. Scan the flattened line stream for session-start lines
/// 3. Classify header lines into time/location/section/title
/// 4. Reconstruct (paper, author) entries from each Participants block
/// 5. Drop below-minimum blocks and orphan lines, counting them in the stats
///
/// `day` is the caller-chosen label stamped on every session from this
/// document.
pub fn extract_sessions(
    path: &Path,
    day: &str,
    backend: &dyn PageBackend,
) -> Result<ScheduleExtraction, ScheduleError> {
    ScheduleExtractor::new().extract_from_document(path, day, backend)
}
