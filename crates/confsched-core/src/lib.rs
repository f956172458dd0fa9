use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;

pub use backend::{BackendError, PageBackend};

/// A positioned text line from a document page.
///
/// Produced by a [`PageBackend`]; the parser treats it as immutable. Offsets
/// are in page coordinates (points), origin at the top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// Left edge of the line.
    pub x0: f64,
    /// Top edge of the line.
    pub top: f64,
    /// Bottom edge of the line.
    pub bottom: f64,
}

impl TextLine {
    pub fn new(text: impl Into<String>, x0: f64, top: f64, bottom: f64) -> Self {
        Self {
            text: text.into(),
            x0,
            top,
            bottom,
        }
    }
}

/// The ordered lines of one document page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLines {
    /// 0-based page index.
    pub index: usize,
    pub lines: Vec<TextLine>,
}

/// One scheduled conference block, identified by a 4-digit code.
///
/// Field order is the wire order: the JSON projection of a `Session` emits
/// fields exactly as declared here. Sessions are emitted in document
/// encounter order and never deduplicated; the same `id` may legitimately
/// appear under different `day` labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub day: String,
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub section: String,
    pub title: String,
    pub participants: Vec<Paper>,
}

impl Session {
    /// A fresh session with only `day` and `id` filled in.
    pub fn new(day: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            id: id.into(),
            start_time: String::new(),
            end_time: String::new(),
            location: String::new(),
            section: String::new(),
            title: String::new(),
            participants: Vec::new(),
        }
    }
}

/// One (paper title, author) pairing within a session's participant list.
///
/// A paper with N co-authors yields N entries sharing the same `title` text
/// and differing `name`/`affiliation`. `name` is empty only when no author
/// line was ever attached to the title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub name: String,
    pub affiliation: String,
}

/// Counters describing what the scan saw and discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Session-start lines detected, including ones later dropped as noise.
    pub session_starts: usize,
    /// Candidate blocks dropped for being shorter than the minimum length.
    pub dropped_short_blocks: usize,
    /// Author/title lines discarded because no paper builder was open.
    pub orphan_lines: usize,
}

/// Result of extracting sessions from one document.
#[derive(Debug, Clone, Default)]
pub struct ScheduleExtraction {
    pub sessions: Vec<Session>,
    pub stats: ExtractStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_json_field_order_is_stable() {
        let mut session = Session::new("Thursday", "2100");
        session.participants.push(Paper {
            title: "Fear and Turnout".into(),
            name: "Jane Doe".into(),
            affiliation: "State University".into(),
        });
        let json = serde_json::to_string(&session).unwrap();

        let order = [
            "\"day\"",
            "\"id\"",
            "\"start_time\"",
            "\"end_time\"",
            "\"location\"",
            "\"section\"",
            "\"title\"",
            "\"participants\"",
        ];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "field order drifted: {json}"
        );
    }

    #[test]
    fn paper_json_round_trip() {
        let paper = Paper {
            title: "Fear and Turnout".into(),
            name: "Jane Doe".into(),
            affiliation: "State University".into(),
        };
        let json = serde_json::to_string(&paper).unwrap();
        let back: Paper = serde_json::from_str(&json).unwrap();
        assert_eq!(paper, back);
    }

    #[test]
    fn new_session_has_empty_fields() {
        let session = Session::new("Friday", "3305");
        assert_eq!(session.day, "Friday");
        assert_eq!(session.id, "3305");
        assert!(session.start_time.is_empty());
        assert!(session.participants.is_empty());
    }
}
