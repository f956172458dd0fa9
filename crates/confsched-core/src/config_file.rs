use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub layout: Option<LayoutConfig>,
    pub keywords: Option<KeywordsConfig>,
    pub extraction: Option<ExtractionConfig>,
}

/// Horizontal-offset thresholds used to assign structural roles to lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Left-margin cutoff below which a 4-digit line opens a session.
    pub session_id_x_max: Option<f64>,
    /// Indentation of paper title lines inside a participants block.
    pub paper_title_x: Option<f64>,
    /// Indentation of author/affiliation lines inside a participants block.
    pub author_x: Option<f64>,
    /// Tolerance band applied to the title/author offsets.
    pub indent_tolerance: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordsConfig {
    /// Tokens that mark a header line as a location (venue/building/room).
    pub location: Option<Vec<String>>,
    /// Tokens that mark an indented line as an author affiliation.
    pub institution: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Blocks with fewer trimmed characters than this are dropped as noise.
    pub min_block_chars: Option<usize>,
}

/// Platform config directory path: `<config_dir>/confsched/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("confsched").join("config.toml"))
}

/// Load config by cascading CWD `.confsched.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".confsched.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        layout: Some(LayoutConfig {
            session_id_x_max: overlay
                .layout
                .as_ref()
                .and_then(|l| l.session_id_x_max)
                .or_else(|| base.layout.as_ref().and_then(|l| l.session_id_x_max)),
            paper_title_x: overlay
                .layout
                .as_ref()
                .and_then(|l| l.paper_title_x)
                .or_else(|| base.layout.as_ref().and_then(|l| l.paper_title_x)),
            author_x: overlay
                .layout
                .as_ref()
                .and_then(|l| l.author_x)
                .or_else(|| base.layout.as_ref().and_then(|l| l.author_x)),
            indent_tolerance: overlay
                .layout
                .as_ref()
                .and_then(|l| l.indent_tolerance)
                .or_else(|| base.layout.as_ref().and_then(|l| l.indent_tolerance)),
        }),
        keywords: Some(KeywordsConfig {
            location: overlay
                .keywords
                .as_ref()
                .and_then(|k| k.location.clone())
                .or_else(|| base.keywords.as_ref().and_then(|k| k.location.clone())),
            institution: overlay
                .keywords
                .as_ref()
                .and_then(|k| k.institution.clone())
                .or_else(|| base.keywords.as_ref().and_then(|k| k.institution.clone())),
        }),
        extraction: Some(ExtractionConfig {
            min_block_chars: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.min_block_chars)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.min_block_chars)),
        }),
    }
}
