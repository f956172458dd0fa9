use once_cell::sync::Lazy;
use regex::Regex;

use confsched_core::Session;

use crate::config::ParsingConfig;

static TIME_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}:\d{2}[ap]m)-(\d{1,2}:\d{2}[ap]m)").unwrap());

pub(crate) fn time_range_re(config: &ParsingConfig) -> &Regex {
    config.time_range_re.as_ref().unwrap_or(&TIME_RANGE_RE)
}

/// One rule of the header-line classifier.
///
/// Session headers carry no markup, so classification relies on the
/// empirically observed field ordering (section → time → location → title)
/// and on pattern priority. The rules are evaluated top-to-bottom in
/// [`HEADER_RULES`] order; the first rule whose [`applies`](Self::applies)
/// returns true wins. The last rule always applies, so every line is
/// absorbed: a pathological document may misclassify a line, but the
/// classifier never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRule {
    /// The line carries a time range. Only the first match per session sets
    /// the time fields; later matches are absorbed without effect.
    TimeRange,
    /// The line carries a location keyword; space-joined onto `location`.
    Location,
    /// `section` is still empty; the line becomes the section text.
    SectionStart,
    /// `section` is set but no time has been seen yet, so the line is still
    /// part of a multi-line section heading.
    SectionContinuation,
    /// `title` is still empty; the line becomes the session title.
    TitleStart,
    /// Fallback: continuation of the most recently populated field, in
    /// title → location → section priority order.
    Continuation,
}

/// Classifier rules in evaluation order.
pub const HEADER_RULES: [HeaderRule; 6] = [
    HeaderRule::TimeRange,
    HeaderRule::Location,
    HeaderRule::SectionStart,
    HeaderRule::SectionContinuation,
    HeaderRule::TitleStart,
    HeaderRule::Continuation,
];

impl HeaderRule {
    /// Whether this rule matches the line given the session's current state.
    pub fn applies(
        &self,
        text: &str,
        session: &Session,
        config: &ParsingConfig,
        location_keywords: &[String],
    ) -> bool {
        match self {
            HeaderRule::TimeRange => time_range_re(config).is_match(text),
            HeaderRule::Location => location_keywords.iter().any(|k| text.contains(k.as_str())),
            HeaderRule::SectionStart => session.section.is_empty(),
            HeaderRule::SectionContinuation => {
                !session.section.is_empty() && session.start_time.is_empty()
            }
            HeaderRule::TitleStart => session.title.is_empty(),
            HeaderRule::Continuation => true,
        }
    }

    /// Apply this rule's field update to the session.
    pub fn apply(&self, text: &str, session: &mut Session, config: &ParsingConfig) {
        match self {
            HeaderRule::TimeRange => {
                if session.start_time.is_empty()
                    && let Some(caps) = time_range_re(config).captures(text)
                {
                    session.start_time = caps[1].to_string();
                    session.end_time = caps[2].to_string();
                }
            }
            HeaderRule::Location => push_joined(&mut session.location, text),
            HeaderRule::SectionStart => session.section = text.to_string(),
            HeaderRule::SectionContinuation => push_joined(&mut session.section, text),
            HeaderRule::TitleStart => session.title = text.to_string(),
            HeaderRule::Continuation => {
                if !session.title.is_empty() {
                    push_joined(&mut session.title, text);
                } else if !session.location.is_empty() {
                    push_joined(&mut session.location, text);
                } else {
                    push_joined(&mut session.section, text);
                }
            }
        }
    }
}

/// First rule in [`HEADER_RULES`] order that matches the line.
pub fn classify_header_line(
    text: &str,
    session: &Session,
    config: &ParsingConfig,
    location_keywords: &[String],
) -> HeaderRule {
    HEADER_RULES
        .into_iter()
        .find(|rule| rule.applies(text, session, config, location_keywords))
        .expect("Continuation rule always applies")
}

/// Classify and apply in one step; updates exactly one field.
pub(crate) fn apply_header_line(
    text: &str,
    session: &mut Session,
    config: &ParsingConfig,
    location_keywords: &[String],
) {
    let rule = classify_header_line(text, session, config, location_keywords);
    rule.apply(text, session, config);
}

fn push_joined(field: &mut String, text: &str) {
    if field.is_empty() {
        field.push_str(text);
    } else {
        field.push(' ');
        field.push_str(text);
    }
}
