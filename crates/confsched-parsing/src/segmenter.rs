use once_cell::sync::Lazy;
use regex::Regex;

use confsched_core::{ExtractStats, ScheduleExtraction, Session, TextLine};

use crate::config::ParsingConfig;
use crate::cursor::LineCursor;
use crate::header;
use crate::participants::ParticipantParser;

/// Marker opening a participants block. Matched case-sensitively, anywhere
/// in the line.
pub(crate) const PARTICIPANTS_MARKER: &str = "Participants";

static SESSION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:\s+(\S.*))?$").unwrap());

/// A recognized session-start line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionStart {
    pub id: String,
    /// Text after the identifier, if any; seeds the `section` field.
    pub trailing: Option<String>,
}

/// A session-start line is a 4-digit code at the left margin, optionally
/// followed by trailing section text. When both readings are possible the
/// trailing-text form takes precedence (group 2 of the pattern).
pub(crate) fn match_session_start(line: &TextLine, config: &ParsingConfig) -> Option<SessionStart> {
    if line.x0 >= config.session_id_x_max {
        return None;
    }
    let re = config.session_id_re.as_ref().unwrap_or(&SESSION_ID_RE);
    let caps = re.captures(line.text.trim())?;
    Some(SessionStart {
        id: caps.get(1)?.as_str().to_string(),
        trailing: caps.get(2).map(|m| m.as_str().to_string()),
    })
}

/// A session under construction, with the running character count used for
/// the minimum-length noise check.
struct OpenBlock {
    session: Session,
    chars: usize,
}

/// Walks a document's line stream and emits completed session records in
/// encounter order.
pub(crate) struct Segmenter<'c> {
    config: &'c ParsingConfig,
    location_keywords: Vec<String>,
    institution_keywords: Vec<String>,
}

impl<'c> Segmenter<'c> {
    pub(crate) fn new(config: &'c ParsingConfig) -> Self {
        Self {
            config,
            location_keywords: config.location_keywords(),
            institution_keywords: config.institution_keywords(),
        }
    }

    /// Scan one document's ordered lines, stamping `day` on every session.
    pub(crate) fn scan(&self, lines: &[TextLine], day: &str) -> ScheduleExtraction {
        let mut cursor = LineCursor::new(lines);
        let mut sessions = Vec::new();
        let mut stats = ExtractStats::default();
        let mut open: Option<OpenBlock> = None;

        while let Some(line) = cursor.advance() {
            if let Some(start) = match_session_start(line, self.config) {
                self.close_block(open.take(), &mut sessions, &mut stats);
                stats.session_starts += 1;
                tracing::debug!(id = %start.id, line = cursor.position() - 1, "session start");

                let mut session = Session::new(day, start.id);
                if let Some(trailing) = start.trailing {
                    session.section = trailing;
                }
                let mut block = OpenBlock {
                    session,
                    chars: line.text.trim().chars().count(),
                };
                let consumed = self.scan_header(&mut cursor, &mut block.session);
                block.chars += consumed;
                open = Some(block);
            } else if let Some(block) = open.as_mut() {
                if line.text.contains(PARTICIPANTS_MARKER) {
                    block.chars += line.text.trim().chars().count();
                    let parser = ParticipantParser::new(self.config, &self.institution_keywords);
                    let consumed =
                        parser.parse_block(&mut cursor, &mut block.session, &mut stats);
                    block.chars += consumed;
                }
                // Anything else between a finished participants block and the
                // next session start (discussant listings, page furniture) is
                // not part of any record.
            }
        }

        self.close_block(open.take(), &mut sessions, &mut stats);
        ScheduleExtraction { sessions, stats }
    }

    /// Consume header lines until the next boundary (session start or
    /// participants marker), which is unread for the caller. Returns the
    /// trimmed character count consumed.
    fn scan_header(&self, cursor: &mut LineCursor<'_>, session: &mut Session) -> usize {
        let mut chars = 0;
        while let Some(line) = cursor.advance() {
            if match_session_start(line, self.config).is_some()
                || line.text.contains(PARTICIPANTS_MARKER)
            {
                cursor.unread();
                break;
            }
            let text = line.text.trim();
            if text.is_empty() {
                continue;
            }
            chars += text.chars().count();
            header::apply_header_line(text, session, self.config, &self.location_keywords);
        }
        chars
    }

    /// Emit a finished block, unless it is too short to be a real session.
    fn close_block(
        &self,
        block: Option<OpenBlock>,
        sessions: &mut Vec<Session>,
        stats: &mut ExtractStats,
    ) {
        let Some(block) = block else { return };
        if block.chars < self.config.min_block_chars {
            tracing::debug!(id = %block.session.id, chars = block.chars, "dropping short block");
            stats.dropped_short_blocks += 1;
        } else {
            sessions.push(block.session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARGIN_X: f64 = 60.0;
    const HEADER_X: f64 = 139.58;

    fn line(text: &str, x0: f64) -> TextLine {
        TextLine::new(text, x0, 0.0, 10.0)
    }

    fn scan(lines: &[TextLine]) -> ScheduleExtraction {
        let config = ParsingConfig::default();
        Segmenter::new(&config).scan(lines, "Thursday")
    }

    #[test]
    fn bare_id_line_starts_a_session() {
        let config = ParsingConfig::default();
        let start = match_session_start(&line("2100", MARGIN_X), &config).unwrap();
        assert_eq!(start.id, "2100");
        assert_eq!(start.trailing, None);
    }

    #[test]
    fn trailing_text_takes_precedence_and_seeds_section() {
        let config = ParsingConfig::default();
        let start = match_session_start(&line("2100 Political Psychology", MARGIN_X), &config)
            .unwrap();
        assert_eq!(start.id, "2100");
        assert_eq!(start.trailing.as_deref(), Some("Political Psychology"));
    }

    #[test]
    fn indented_id_is_not_a_session_start() {
        let config = ParsingConfig::default();
        assert!(match_session_start(&line("2100", 150.0), &config).is_none());
    }

    #[test]
    fn five_digit_code_is_not_a_session_start() {
        let config = ParsingConfig::default();
        assert!(match_session_start(&line("21000", MARGIN_X), &config).is_none());
        assert!(match_session_start(&line("210", MARGIN_X), &config).is_none());
    }

    #[test]
    fn sessions_emitted_in_encounter_order() {
        let lines = vec![
            line("2100 Political Psychology", MARGIN_X),
            line("Emotions in Voting", HEADER_X),
            line("2205 Comparative Politics", MARGIN_X),
            line("Coalitions in Parliament", HEADER_X),
        ];
        let result = scan(&lines);
        assert_eq!(result.sessions.len(), 2);
        assert_eq!(result.sessions[0].id, "2100");
        assert_eq!(result.sessions[1].id, "2205");
        assert_eq!(result.stats.session_starts, 2);
    }

    #[test]
    fn duplicate_ids_are_kept_distinct() {
        let lines = vec![
            line("2100 Morning Block", MARGIN_X),
            line("2100 Evening Block", MARGIN_X),
        ];
        let result = scan(&lines);
        assert_eq!(result.sessions.len(), 2);
        assert_eq!(result.sessions[0].id, "2100");
        assert_eq!(result.sessions[1].id, "2100");
        assert_eq!(result.sessions[0].section, "Morning Block");
        assert_eq!(result.sessions[1].section, "Evening Block");
    }

    #[test]
    fn short_block_is_dropped_as_noise() {
        let lines = vec![
            line("2100", MARGIN_X),
            line("2205 Comparative Politics", MARGIN_X),
            line("Coalitions in Parliament", HEADER_X),
        ];
        let result = scan(&lines);
        assert_eq!(result.sessions.len(), 1);
        assert_eq!(result.sessions[0].id, "2205");
        assert_eq!(result.stats.session_starts, 2);
        assert_eq!(result.stats.dropped_short_blocks, 1);
    }

    #[test]
    fn lines_before_first_session_are_ignored() {
        let lines = vec![
            line("2026 Annual Meeting Program", HEADER_X),
            line("2100 Political Psychology", MARGIN_X),
        ];
        let result = scan(&lines);
        assert_eq!(result.sessions.len(), 1);
        assert_eq!(result.sessions[0].id, "2100");
    }

    #[test]
    fn orphan_participants_marker_is_skipped() {
        let lines = vec![
            line("Participants", HEADER_X),
            line("2100 Political Psychology", MARGIN_X),
        ];
        let result = scan(&lines);
        assert_eq!(result.sessions.len(), 1);
        assert!(result.sessions[0].participants.is_empty());
    }

    #[test]
    fn lines_after_discussants_are_not_recorded() {
        let lines = vec![
            line("2100 Political Psychology", MARGIN_X),
            line("Emotions in Voting", HEADER_X),
            line("Participants", HEADER_X),
            line("Fear and Turnout", 139.58),
            line("Jane Doe, State University", 161.18),
            line("Discussants", HEADER_X),
            line("Jim Poe, Plains University", 161.18),
            line("2205 Comparative Politics", MARGIN_X),
            line("Coalitions in Parliament", HEADER_X),
        ];
        let result = scan(&lines);
        assert_eq!(result.sessions.len(), 2);
        assert_eq!(result.sessions[0].participants.len(), 1);
        assert_eq!(result.sessions[0].participants[0].name, "Jane Doe");
        assert_eq!(result.sessions[1].id, "2205");
        assert!(result.sessions[1].participants.is_empty());
    }

    #[test]
    fn custom_session_id_regex_takes_effect() {
        let config = crate::ParsingConfigBuilder::new()
            .session_id_regex(r"^#(\d{4})(?:\s+(\S.*))?$")
            .build()
            .unwrap();
        let start = match_session_start(&line("#2100 Opening", MARGIN_X), &config).unwrap();
        assert_eq!(start.id, "2100");
        assert_eq!(start.trailing.as_deref(), Some("Opening"));
        assert!(match_session_start(&line("2100 Opening", MARGIN_X), &config).is_none());
    }
}
