use std::io::Write;
use std::path::Path;

use confsched_core::{ScheduleExtraction, Session};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a non-fatal warning (missing file, unreadable document).
pub fn print_warning(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "Warning:".yellow(), message)
    } else {
        writeln!(w, "Warning: {}", message)
    }
}

/// Print the per-document summary after a scan.
pub fn print_document_summary(
    w: &mut dyn Write,
    label: &str,
    extraction: &ScheduleExtraction,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(
        w,
        "Found {} sessions for {}",
        extraction.sessions.len(),
        label
    )?;

    let stats = &extraction.stats;
    if stats.dropped_short_blocks + stats.orphan_lines > 0 {
        let note = format!(
            "(Dropped {} short blocks, {} orphan lines)",
            stats.dropped_short_blocks, stats.orphan_lines
        );
        if color.enabled() {
            writeln!(w, "{}", note.dimmed())?;
        } else {
            writeln!(w, "{}", note)?;
        }
    }
    Ok(())
}

/// Print the whole-run summary.
pub fn print_run_summary(
    w: &mut dyn Write,
    documents: usize,
    total_sessions: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!(
        "Extracted {} sessions from {} documents",
        total_sessions, documents
    );
    if color.enabled() {
        writeln!(w, "{}", line.bold())
    } else {
        writeln!(w, "{}", line)
    }
}

/// Write sessions to a JSON file, field order as declared on [`Session`].
pub fn write_sessions_json(path: &Path, sessions: &[Session]) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(sessions)?;
    std::fs::write(path, content)?;
    Ok(())
}
