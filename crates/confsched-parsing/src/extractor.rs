use std::path::Path;

use confsched_core::{PageBackend, PageLines, ScheduleExtraction, TextLine};

use crate::ScheduleError;
use crate::config::ParsingConfig;
use crate::segmenter::Segmenter;

/// A configurable schedule extraction pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`ScheduleExtractor::with_config`] to supply custom thresholds, patterns,
/// and keyword sets.
pub struct ScheduleExtractor {
    config: ParsingConfig,
}

impl Default for ScheduleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParsingConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Scan an already-materialized line stream.
    ///
    /// Re-running on the same stream yields identical output; the scan
    /// carries no state between calls.
    pub fn extract_from_lines(&self, lines: &[TextLine], day: &str) -> ScheduleExtraction {
        Segmenter::new(&self.config).scan(lines, day)
    }

    /// Scan a document's pages in order.
    ///
    /// Pages are flattened into one stream first: sessions routinely span
    /// page breaks, and the scan does not care where they fall.
    pub fn extract_from_pages(&self, pages: &[PageLines], day: &str) -> ScheduleExtraction {
        let lines: Vec<TextLine> = pages
            .iter()
            .flat_map(|page| page.lines.iter().cloned())
            .collect();
        self.extract_from_lines(&lines, day)
    }

    /// Run the full pipeline on a document file via the given backend.
    pub fn extract_from_document(
        &self,
        path: &Path,
        day: &str,
        backend: &dyn PageBackend,
    ) -> Result<ScheduleExtraction, ScheduleError> {
        let pages = backend.extract_lines(path)?;
        Ok(self.extract_from_pages(&pages, day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsched_core::BackendError;

    fn line(text: &str, x0: f64) -> TextLine {
        TextLine::new(text, x0, 0.0, 10.0)
    }

    #[test]
    fn pages_are_flattened_in_order() {
        let pages = vec![
            PageLines {
                index: 0,
                lines: vec![
                    line("2100 Political Psychology", 60.0),
                    line("8:00am-9:15am", 139.58),
                ],
            },
            PageLines {
                index: 1,
                lines: vec![line("Emotions in Voting", 139.58)],
            },
        ];
        let result = ScheduleExtractor::new().extract_from_pages(&pages, "Thursday");
        assert_eq!(result.sessions.len(), 1);
        let session = &result.sessions[0];
        assert_eq!(session.start_time, "8:00am");
        // Title line lives on the next page but still lands in the session
        assert_eq!(session.title, "Emotions in Voting");
    }

    #[test]
    fn session_spanning_a_page_break_stays_whole() {
        let pages = vec![
            PageLines {
                index: 0,
                lines: vec![
                    line("2100 Political Psychology", 60.0),
                    line("Participants", 139.58),
                    line("Fear and Turnout", 139.58),
                ],
            },
            PageLines {
                index: 1,
                lines: vec![line("Jane Doe, State University", 161.18)],
            },
        ];
        let result = ScheduleExtractor::new().extract_from_pages(&pages, "Thursday");
        assert_eq!(result.sessions.len(), 1);
        assert_eq!(result.sessions[0].participants.len(), 1);
        assert_eq!(result.sessions[0].participants[0].name, "Jane Doe");
    }

    #[test]
    fn backend_error_is_propagated() {
        struct FailingBackend;
        impl PageBackend for FailingBackend {
            fn extract_lines(&self, _path: &Path) -> Result<Vec<PageLines>, BackendError> {
                Err(BackendError::OpenError("no such document".into()))
            }
        }
        let result = ScheduleExtractor::new().extract_from_document(
            Path::new("missing.pdf"),
            "Thursday",
            &FailingBackend,
        );
        assert!(matches!(result, Err(ScheduleError::Backend(_))));
    }
}
