use confsched_core::{ExtractStats, Paper, Session};

use crate::config::ParsingConfig;
use crate::cursor::LineCursor;
use crate::segmenter::match_session_start;

/// Markers that terminate a participants block. The terminating line is
/// unread so the segmenter re-examines it.
pub(crate) static STOP_MARKERS: &[&str] = &["Chair", "Discussants"];

/// Indentation role of a line inside a participants block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndentClass {
    /// Within the tolerance band of the paper-title offset.
    Title,
    /// Within the tolerance band of the author offset.
    Author,
    /// Any other indentation; absorbed as a continuation.
    Other,
}

/// Accumulates one (paper title, author) entry.
///
/// The builder is owned by the parse call and flushed explicitly: when a new
/// title starts, when a second author arrives for the same title, or when
/// the block ends. Before `name` is set, unattributed text continues the
/// title; afterwards it continues the affiliation.
#[derive(Debug, Clone)]
pub(crate) struct PaperBuilder {
    title: String,
    name: String,
    affiliation: String,
}

impl PaperBuilder {
    pub(crate) fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            name: String::new(),
            affiliation: String::new(),
        }
    }

    /// A sibling entry for the same paper with a different author.
    pub(crate) fn co_author(title: String, name: String, affiliation: String) -> Self {
        Self {
            title,
            name,
            affiliation,
        }
    }

    pub(crate) fn has_author(&self) -> bool {
        !self.name.is_empty()
    }

    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn set_author(&mut self, name: String, affiliation: String) {
        self.name = name;
        self.affiliation = affiliation;
    }

    pub(crate) fn append_title(&mut self, text: &str) {
        self.title.push(' ');
        self.title.push_str(text);
    }

    pub(crate) fn append_affiliation(&mut self, text: &str) {
        if self.affiliation.is_empty() {
            self.affiliation.push_str(text);
        } else {
            self.affiliation.push(' ');
            self.affiliation.push_str(text);
        }
    }

    pub(crate) fn build(self) -> Paper {
        Paper {
            title: self.title,
            name: self.name,
            affiliation: self.affiliation,
        }
    }
}

/// Reconstructs (paper, author) entries from the line window following a
/// `Participants` marker.
pub(crate) struct ParticipantParser<'c> {
    config: &'c ParsingConfig,
    institution_keywords: &'c [String],
}

impl<'c> ParticipantParser<'c> {
    pub(crate) fn new(config: &'c ParsingConfig, institution_keywords: &'c [String]) -> Self {
        Self {
            config,
            institution_keywords,
        }
    }

    /// Consume lines until a stop marker, a session-start line, or end of
    /// input, appending completed entries to `session.participants`.
    ///
    /// The terminating line is unread. Returns the trimmed character count
    /// of the lines consumed, for the caller's block-length accounting.
    pub(crate) fn parse_block(
        &self,
        cursor: &mut LineCursor<'_>,
        session: &mut Session,
        stats: &mut ExtractStats,
    ) -> usize {
        let mut chars = 0;
        let mut builder: Option<PaperBuilder> = None;

        while let Some(line) = cursor.advance() {
            let text = line.text.trim();
            if STOP_MARKERS.iter().any(|m| text.contains(m))
                || match_session_start(line, self.config).is_some()
            {
                cursor.unread();
                break;
            }
            if text.is_empty() {
                continue;
            }
            chars += text.chars().count();

            match self.classify_indent(line.x0) {
                IndentClass::Title => match builder.as_mut() {
                    Some(b) if !b.has_author() => b.append_title(text),
                    _ => {
                        if let Some(done) = builder.take() {
                            session.participants.push(done.build());
                        }
                        builder = Some(PaperBuilder::new(text));
                    }
                },
                IndentClass::Author => {
                    if let Some((name, affiliation)) = self.split_author_line(text) {
                        match builder.take() {
                            Some(mut b) if !b.has_author() => {
                                b.set_author(name, affiliation);
                                builder = Some(b);
                            }
                            Some(done) => {
                                // Second co-author: same title, fresh entry
                                let title = done.title().to_string();
                                session.participants.push(done.build());
                                builder = Some(PaperBuilder::co_author(title, name, affiliation));
                            }
                            None => self.drop_orphan(text, stats),
                        }
                    } else {
                        self.continue_current(text, builder.as_mut(), stats);
                    }
                }
                IndentClass::Other => {
                    self.continue_current(text, builder.as_mut(), stats);
                }
            }
        }

        if let Some(done) = builder.take() {
            session.participants.push(done.build());
        }
        chars
    }

    /// Continuation for lines that carry no author marker: title before an
    /// author is attached, affiliation after.
    fn continue_current(
        &self,
        text: &str,
        builder: Option<&mut PaperBuilder>,
        stats: &mut ExtractStats,
    ) {
        match builder {
            Some(b) if !b.has_author() => b.append_title(text),
            Some(b) => b.append_affiliation(text),
            None => self.drop_orphan(text, stats),
        }
    }

    fn drop_orphan(&self, text: &str, stats: &mut ExtractStats) {
        tracing::debug!(line = text, "dropping orphan participant line");
        stats.orphan_lines += 1;
    }

    pub(crate) fn classify_indent(&self, x0: f64) -> IndentClass {
        if (x0 - self.config.paper_title_x).abs() < self.config.indent_tolerance {
            IndentClass::Title
        } else if (x0 - self.config.author_x).abs() < self.config.indent_tolerance {
            IndentClass::Author
        } else {
            IndentClass::Other
        }
    }

    /// Split an author line into (name, affiliation) on the first comma.
    /// Returns `None` when the line carries neither a comma nor an
    /// institution keyword and so cannot be an author line.
    pub(crate) fn split_author_line(&self, text: &str) -> Option<(String, String)> {
        let looks_like_author = text.contains(',')
            || self
                .institution_keywords
                .iter()
                .any(|k| text.contains(k.as_str()));
        if !looks_like_author {
            return None;
        }
        match text.split_once(',') {
            Some((name, affiliation)) => {
                Some((name.trim().to_string(), affiliation.trim().to_string()))
            }
            None => Some((text.trim().to_string(), String::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsched_core::TextLine;

    const TITLE_X: f64 = 139.58;
    const AUTHOR_X: f64 = 161.18;

    fn parser_fixture(config: &ParsingConfig) -> (Vec<String>, &ParsingConfig) {
        (config.institution_keywords(), config)
    }

    fn line(text: &str, x0: f64) -> TextLine {
        TextLine::new(text, x0, 0.0, 10.0)
    }

    fn parse(lines: &[TextLine]) -> (Session, ExtractStats) {
        let config = ParsingConfig::default();
        let keywords = config.institution_keywords();
        let parser = ParticipantParser::new(&config, &keywords);
        let mut session = Session::new("Thursday", "2100");
        let mut stats = ExtractStats::default();
        let mut cursor = LineCursor::new(lines);
        parser.parse_block(&mut cursor, &mut session, &mut stats);
        (session, stats)
    }

    #[test]
    fn title_then_author_yields_one_entry() {
        let lines = vec![
            line("Fear and Turnout", TITLE_X),
            line("Jane Doe, State University", AUTHOR_X),
        ];
        let (session, _) = parse(&lines);
        assert_eq!(session.participants.len(), 1);
        let p = &session.participants[0];
        assert_eq!(p.title, "Fear and Turnout");
        assert_eq!(p.name, "Jane Doe");
        assert_eq!(p.affiliation, "State University");
    }

    #[test]
    fn two_author_lines_share_the_title() {
        let lines = vec![
            line("Fear and Turnout", TITLE_X),
            line("Jane Doe, State University", AUTHOR_X),
            line("John Roe, City College", AUTHOR_X),
        ];
        let (session, _) = parse(&lines);
        assert_eq!(session.participants.len(), 2);
        assert_eq!(session.participants[0].title, session.participants[1].title);
        assert_eq!(session.participants[0].name, "Jane Doe");
        assert_eq!(session.participants[1].name, "John Roe");
        assert_eq!(session.participants[1].affiliation, "City College");
    }

    #[test]
    fn multi_line_title_accumulates_before_author() {
        let lines = vec![
            line("Fear and Turnout in", TITLE_X),
            line("Local Elections", TITLE_X),
            line("Jane Doe, State University", AUTHOR_X),
        ];
        let (session, _) = parse(&lines);
        assert_eq!(session.participants.len(), 1);
        assert_eq!(
            session.participants[0].title,
            "Fear and Turnout in Local Elections"
        );
    }

    #[test]
    fn author_offset_line_without_marker_continues_title() {
        let lines = vec![
            line("Fear and Turnout", TITLE_X),
            line("in Local Elections", AUTHOR_X),
            line("Jane Doe, State University", AUTHOR_X),
        ];
        let (session, _) = parse(&lines);
        assert_eq!(session.participants.len(), 1);
        assert_eq!(
            session.participants[0].title,
            "Fear and Turnout in Local Elections"
        );
        assert_eq!(session.participants[0].name, "Jane Doe");
    }

    #[test]
    fn affiliation_continues_after_author_set() {
        let lines = vec![
            line("Fear and Turnout", TITLE_X),
            line("Jane Doe, State University", AUTHOR_X),
            line("Department of Politics", AUTHOR_X + 50.0),
        ];
        let (session, _) = parse(&lines);
        assert_eq!(session.participants.len(), 1);
        assert_eq!(
            session.participants[0].affiliation,
            "State University Department of Politics"
        );
    }

    #[test]
    fn keyword_without_comma_is_a_bare_author() {
        let lines = vec![
            line("Fear and Turnout", TITLE_X),
            line("Jane Doe of State University", AUTHOR_X),
        ];
        let (session, _) = parse(&lines);
        assert_eq!(session.participants.len(), 1);
        assert_eq!(session.participants[0].name, "Jane Doe of State University");
        assert_eq!(session.participants[0].affiliation, "");
    }

    #[test]
    fn orphan_author_line_is_dropped_and_counted() {
        let lines = vec![line("Jane Doe, State University", AUTHOR_X)];
        let (session, stats) = parse(&lines);
        assert!(session.participants.is_empty());
        assert_eq!(stats.orphan_lines, 1);
    }

    #[test]
    fn stop_marker_is_unread_for_the_caller() {
        let lines = vec![
            line("Fear and Turnout", TITLE_X),
            line("Jane Doe, State University", AUTHOR_X),
            line("Discussants", TITLE_X),
        ];
        let config = ParsingConfig::default();
        let (keywords, config) = parser_fixture(&config);
        let parser = ParticipantParser::new(config, &keywords);
        let mut session = Session::new("Thursday", "2100");
        let mut stats = ExtractStats::default();
        let mut cursor = LineCursor::new(&lines);
        parser.parse_block(&mut cursor, &mut session, &mut stats);
        assert_eq!(session.participants.len(), 1);
        assert_eq!(cursor.peek().unwrap().text, "Discussants");
    }

    #[test]
    fn pending_builder_is_flushed_at_end_of_input() {
        let lines = vec![line("Fear and Turnout", TITLE_X)];
        let (session, _) = parse(&lines);
        assert_eq!(session.participants.len(), 1);
        assert_eq!(session.participants[0].title, "Fear and Turnout");
        assert_eq!(session.participants[0].name, "");
    }

    #[test]
    fn second_title_flushes_the_previous_entry() {
        let lines = vec![
            line("Fear and Turnout", TITLE_X),
            line("Jane Doe, State University", AUTHOR_X),
            line("Hope and Abstention", TITLE_X),
            line("John Roe, City College", AUTHOR_X),
        ];
        let (session, _) = parse(&lines);
        assert_eq!(session.participants.len(), 2);
        assert_eq!(session.participants[1].title, "Hope and Abstention");
        assert_eq!(session.participants[1].name, "John Roe");
    }

    #[test]
    fn indent_classification_uses_tolerance_band() {
        let config = ParsingConfig::default();
        let keywords = config.institution_keywords();
        let parser = ParticipantParser::new(&config, &keywords);
        assert_eq!(parser.classify_indent(TITLE_X + 9.9), IndentClass::Title);
        assert_eq!(parser.classify_indent(AUTHOR_X - 9.9), IndentClass::Author);
        assert_eq!(parser.classify_indent(300.0), IndentClass::Other);
    }
}
