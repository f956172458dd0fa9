use regex::Regex;

/// Controls how a list of keywords is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

impl ListOverride<String> {
    /// Resolve against borrowed string defaults.
    pub(crate) fn resolve_str(&self, defaults: &[&str]) -> Vec<String> {
        match self {
            ListOverride::Default => defaults.iter().map(|s| s.to_string()).collect(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result: Vec<String> = defaults.iter().map(|s| s.to_string()).collect();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Tokens that mark a header line as a location line.
pub(crate) static DEFAULT_LOCATION_KEYWORDS: &[&str] =
    &["Floor", "Building", "Room", "Hall", "Level"];

/// Tokens that mark an author-offset line as carrying an affiliation.
pub(crate) static DEFAULT_INSTITUTION_KEYWORDS: &[&str] = &["University", "College"];

/// Configuration for the schedule extraction scan.
///
/// All regex fields are `Option<Regex>` — `None` means "use the built-in
/// default". Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── segmenter.rs ──
    /// Regex matching a trimmed session-start line. Group 1 must capture the
    /// 4-digit identifier; optional group 2 captures trailing section text.
    pub(crate) session_id_re: Option<Regex>,
    /// Left-margin cutoff below which a matching line opens a session.
    pub(crate) session_id_x_max: f64,
    /// Blocks whose accumulated trimmed text is shorter than this are
    /// dropped as noise.
    pub(crate) min_block_chars: usize,

    // ── header.rs ──
    /// Regex matching a time range. Groups 1 and 2 must capture the start
    /// and end times.
    pub(crate) time_range_re: Option<Regex>,
    /// Tokens marking a header line as a location line.
    pub(crate) location_keywords: ListOverride<String>,

    // ── participants.rs ──
    /// Indentation of paper title lines.
    pub(crate) paper_title_x: f64,
    /// Indentation of author/affiliation lines.
    pub(crate) author_x: f64,
    /// Tolerance band around the title/author offsets.
    pub(crate) indent_tolerance: f64,
    /// Tokens marking an indented line as an author line.
    pub(crate) institution_keywords: ListOverride<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            session_id_re: None,
            session_id_x_max: 100.0,
            min_block_chars: 10,
            time_range_re: None,
            location_keywords: ListOverride::Default,
            paper_title_x: 139.58,
            author_x: 161.18,
            indent_tolerance: 10.0,
            institution_keywords: ListOverride::Default,
        }
    }
}

impl ParsingConfig {
    pub fn session_id_x_max(&self) -> f64 {
        self.session_id_x_max
    }

    pub fn paper_title_x(&self) -> f64 {
        self.paper_title_x
    }

    pub fn author_x(&self) -> f64 {
        self.author_x
    }

    pub fn indent_tolerance(&self) -> f64 {
        self.indent_tolerance
    }

    pub fn min_block_chars(&self) -> usize {
        self.min_block_chars
    }

    /// The location keyword set with overrides applied.
    pub fn location_keywords(&self) -> Vec<String> {
        self.location_keywords.resolve_str(DEFAULT_LOCATION_KEYWORDS)
    }

    /// The institution keyword set with overrides applied.
    pub fn institution_keywords(&self) -> Vec<String> {
        self.institution_keywords
            .resolve_str(DEFAULT_INSTITUTION_KEYWORDS)
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in
/// [`build()`](Self::build). Fails fast with `regex::Error` if any pattern is
/// invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    session_id_re: Option<String>,
    time_range_re: Option<String>,
    session_id_x_max: Option<f64>,
    paper_title_x: Option<f64>,
    author_x: Option<f64>,
    indent_tolerance: Option<f64>,
    min_block_chars: Option<usize>,
    location_keywords: ListOverride<String>,
    institution_keywords: ListOverride<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Patterns ──

    /// Override the session-start pattern. Group 1 must capture the session
    /// identifier; optional group 2 captures trailing section text.
    pub fn session_id_regex(mut self, pattern: &str) -> Self {
        self.session_id_re = Some(pattern.to_string());
        self
    }

    /// Override the time-range pattern. Groups 1 and 2 must capture the
    /// start and end times.
    pub fn time_range_regex(mut self, pattern: &str) -> Self {
        self.time_range_re = Some(pattern.to_string());
        self
    }

    // ── Layout thresholds ──

    pub fn session_id_x_max(mut self, x: f64) -> Self {
        self.session_id_x_max = Some(x);
        self
    }

    pub fn paper_title_x(mut self, x: f64) -> Self {
        self.paper_title_x = Some(x);
        self
    }

    pub fn author_x(mut self, x: f64) -> Self {
        self.author_x = Some(x);
        self
    }

    pub fn indent_tolerance(mut self, tolerance: f64) -> Self {
        self.indent_tolerance = Some(tolerance);
        self
    }

    pub fn min_block_chars(mut self, n: usize) -> Self {
        self.min_block_chars = Some(n);
        self
    }

    // ── Location keywords ──

    pub fn set_location_keywords(mut self, keywords: Vec<String>) -> Self {
        self.location_keywords = ListOverride::Replace(keywords);
        self
    }

    pub fn add_location_keyword(mut self, keyword: String) -> Self {
        match &mut self.location_keywords {
            ListOverride::Extend(v) => v.push(keyword),
            _ => self.location_keywords = ListOverride::Extend(vec![keyword]),
        }
        self
    }

    // ── Institution keywords ──

    pub fn set_institution_keywords(mut self, keywords: Vec<String>) -> Self {
        self.institution_keywords = ListOverride::Replace(keywords);
        self
    }

    pub fn add_institution_keyword(mut self, keyword: String) -> Self {
        match &mut self.institution_keywords {
            ListOverride::Extend(v) => v.push(keyword),
            _ => self.institution_keywords = ListOverride::Extend(vec![keyword]),
        }
        self
    }

    /// Compile all string patterns into regexes and produce a
    /// [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let compile = |opt: Option<String>| -> Result<Option<Regex>, regex::Error> {
            opt.map(|p| Regex::new(&p)).transpose()
        };

        Ok(ParsingConfig {
            session_id_re: compile(self.session_id_re)?,
            session_id_x_max: self.session_id_x_max.unwrap_or(100.0),
            min_block_chars: self.min_block_chars.unwrap_or(10),
            time_range_re: compile(self.time_range_re)?,
            location_keywords: self.location_keywords,
            paper_title_x: self.paper_title_x.unwrap_or(139.58),
            author_x: self.author_x.unwrap_or(161.18),
            indent_tolerance: self.indent_tolerance.unwrap_or(10.0),
            institution_keywords: self.institution_keywords,
        })
    }
}
