use std::path::Path;

use mupdf::{Document, TextPageFlags};

use confsched_core::{BackendError, PageBackend, PageLines, TextLine};

/// MuPDF-based implementation of [`PageBackend`].
///
/// This crate is the sole AGPL island — it isolates the mupdf dependency
/// (which is AGPL-3.0) so that consumers parsing pre-extracted line streams
/// do not transitively depend on it.
///
/// Each MuPDF text line becomes one [`TextLine`] carrying the line's left,
/// top, and bottom edges in page coordinates. By default, blocks in the
/// bottom 5% of each page (footers) and top 4% (headers) are excluded so
/// running page furniture like "Annual Meeting Program  212" never lands
/// inside a session record.
pub struct MupdfBackend {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    /// Default 0.05. `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    /// Default 0.04. `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self {
            footer_exclusion_ratio: Some(0.05),
            header_exclusion_ratio: Some(0.04),
        }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }
}

impl PageBackend for MupdfBackend {
    fn extract_lines(&self, path: &Path) -> Result<Vec<PageLines>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages = Vec::new();

        for (index, page_result) in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
            .enumerate()
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            // Page bounds for header/footer exclusion
            let page_bounds = page
                .bounds()
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let page_height = page_bounds.y1 - page_bounds.y0;

            let header_threshold = self
                .header_exclusion_ratio
                .map(|r| page_bounds.y0 + page_height * r);
            let footer_threshold = self
                .footer_exclusion_ratio
                .map(|r| page_bounds.y1 - page_height * r);

            let mut lines = Vec::new();
            for block in text_page.blocks() {
                let block_bounds = block.bounds();

                // Skip blocks entirely within the header region
                if let Some(threshold) = header_threshold {
                    if block_bounds.y1 <= threshold {
                        continue;
                    }
                }

                // Skip blocks whose top edge is in the footer region
                if let Some(threshold) = footer_threshold {
                    if block_bounds.y0 >= threshold {
                        continue;
                    }
                }

                for line in block.lines() {
                    let text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    if text.trim().is_empty() {
                        continue;
                    }
                    let line_bounds = line.bounds();
                    lines.push(TextLine {
                        text,
                        x0: f64::from(line_bounds.x0),
                        top: f64::from(line_bounds.y0),
                        bottom: f64::from(line_bounds.y1),
                    });
                }
            }

            pages.push(PageLines { index, lines });
        }

        Ok(pages)
    }
}
