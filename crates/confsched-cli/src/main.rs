use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use confsched_core::{PageBackend, Session, config_file};
use confsched_parsing::{ParsingConfig, ParsingConfigBuilder, ScheduleExtractor};
use confsched_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Conference Schedule Extractor - Rebuild structured session records from program PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract session records from one or more program PDFs
    Extract {
        /// Documents to process, as PATH=LABEL pairs; the label defaults to
        /// the file stem when omitted
        #[arg(required = true)]
        docs: Vec<String>,

        /// Directory for per-document JSON files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Also write one merged JSON file across all documents
        #[arg(long)]
        merged: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to a TOML config file (default: cascading lookup)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Left-margin cutoff for session identifier lines
        #[arg(long)]
        id_margin: Option<f64>,

        /// Indentation of paper title lines
        #[arg(long)]
        title_indent: Option<f64>,

        /// Indentation of author lines
        #[arg(long)]
        author_indent: Option<f64>,

        /// Tolerance band around the title/author indents
        #[arg(long)]
        indent_tolerance: Option<f64>,

        /// Minimum session block length in characters
        #[arg(long)]
        min_block_chars: Option<usize>,

        /// Additional location keyword (repeatable)
        #[arg(long = "location-keyword")]
        location_keywords: Vec<String>,

        /// Additional institution keyword (repeatable)
        #[arg(long = "institution-keyword")]
        institution_keywords: Vec<String>,
    },

    /// Dump positioned lines from a document to calibrate thresholds
    Inspect {
        /// Path to the PDF to inspect
        doc: PathBuf,

        /// Restrict to one 0-based page
        #[arg(long)]
        page: Option<usize>,

        /// Only print lines whose text contains this token
        #[arg(long)]
        find: Option<String>,

        /// Skip lines left of the session-identifier margin
        #[arg(long)]
        body_only: bool,

        /// Print page text only, without offsets
        #[arg(long)]
        raw: bool,

        /// Emit the selected pages as JSON instead of the table
        #[arg(long)]
        json: bool,
    },

    /// Check a previously written JSON file for extraction quality
    Verify {
        /// Path to the JSON file written by `extract`
        json: PathBuf,

        /// Session id to look up and pretty-print
        #[arg(long)]
        target: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            docs,
            out_dir,
            merged,
            no_color,
            config,
            id_margin,
            title_indent,
            author_indent,
            indent_tolerance,
            min_block_chars,
            location_keywords,
            institution_keywords,
        } => {
            let parsing_config = build_config(
                config.as_ref(),
                id_margin,
                title_indent,
                author_indent,
                indent_tolerance,
                min_block_chars,
                location_keywords,
                institution_keywords,
            )?;
            extract(docs, &out_dir, merged, no_color, parsing_config)
        }
        Command::Inspect {
            doc,
            page,
            find,
            body_only,
            raw,
            json,
        } => inspect(&doc, page, find.as_deref(), body_only, raw, json),
        Command::Verify { json, target } => verify(&json, target.as_deref()),
    }
}

/// Resolve the parsing configuration: CLI flags > config file > defaults.
#[allow(clippy::too_many_arguments)]
fn build_config(
    config_path: Option<&PathBuf>,
    id_margin: Option<f64>,
    title_indent: Option<f64>,
    author_indent: Option<f64>,
    indent_tolerance: Option<f64>,
    min_block_chars: Option<usize>,
    location_keywords: Vec<String>,
    institution_keywords: Vec<String>,
) -> anyhow::Result<ParsingConfig> {
    let file = match config_path {
        Some(path) => config_file::load_from_path(path).ok_or_else(|| {
            anyhow::anyhow!("Failed to read config file: {}", path.display())
        })?,
        None => config_file::load_config(),
    };
    let layout = file.layout.unwrap_or_default();
    let keywords = file.keywords.unwrap_or_default();
    let extraction = file.extraction.unwrap_or_default();

    let mut builder = ParsingConfigBuilder::new();
    if let Some(x) = id_margin.or(layout.session_id_x_max) {
        builder = builder.session_id_x_max(x);
    }
    if let Some(x) = title_indent.or(layout.paper_title_x) {
        builder = builder.paper_title_x(x);
    }
    if let Some(x) = author_indent.or(layout.author_x) {
        builder = builder.author_x(x);
    }
    if let Some(t) = indent_tolerance.or(layout.indent_tolerance) {
        builder = builder.indent_tolerance(t);
    }
    if let Some(n) = min_block_chars.or(extraction.min_block_chars) {
        builder = builder.min_block_chars(n);
    }

    // A keyword list in the config file replaces the defaults; CLI keywords
    // extend whichever base is in effect.
    if let Some(mut list) = keywords.location {
        list.extend(location_keywords);
        builder = builder.set_location_keywords(list);
    } else {
        for keyword in location_keywords {
            builder = builder.add_location_keyword(keyword);
        }
    }
    if let Some(mut list) = keywords.institution {
        list.extend(institution_keywords);
        builder = builder.set_institution_keywords(list);
    } else {
        for keyword in institution_keywords {
            builder = builder.add_institution_keyword(keyword);
        }
    }

    Ok(builder.build()?)
}

/// Split a `PATH=LABEL` document spec; the label defaults to the file stem.
fn parse_doc_spec(spec: &str) -> (PathBuf, String) {
    if let Some((path, label)) = spec.rsplit_once('=') {
        (PathBuf::from(path), label.to_string())
    } else {
        let path = PathBuf::from(spec);
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| spec.to_string());
        (path, label)
    }
}

fn extract(
    docs: Vec<String>,
    out_dir: &Path,
    merged: Option<PathBuf>,
    no_color: bool,
    config: ParsingConfig,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let extractor = ScheduleExtractor::with_config(config);
    let backend = MupdfBackend::new();
    let mut stdout = std::io::stdout();

    std::fs::create_dir_all(out_dir)?;

    let mut all_sessions: Vec<Session> = Vec::new();
    let mut processed = 0usize;

    for spec in &docs {
        let (path, label) = parse_doc_spec(spec);
        if !path.exists() {
            output::print_warning(
                &mut stdout,
                &format!("File {} not found, skipping", path.display()),
                color,
            )?;
            continue;
        }

        writeln!(stdout, "Processing {}...", path.display())?;
        let result = match extractor.extract_from_document(&path, &label, &backend) {
            Ok(result) => result,
            Err(e) => {
                output::print_warning(
                    &mut stdout,
                    &format!("Failed to extract {}: {}", path.display(), e),
                    color,
                )?;
                continue;
            }
        };
        output::print_document_summary(&mut stdout, &label, &result, color)?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| label.clone());
        let out_path = out_dir.join(format!("{}.json", stem));
        output::write_sessions_json(&out_path, &result.sessions)?;
        writeln!(stdout, "Wrote {}", out_path.display())?;

        all_sessions.extend(result.sessions);
        processed += 1;
    }

    if let Some(merged_path) = merged {
        output::write_sessions_json(&merged_path, &all_sessions)?;
        writeln!(stdout, "Wrote {}", merged_path.display())?;
    }

    writeln!(stdout)?;
    output::print_run_summary(&mut stdout, processed, all_sessions.len(), color)?;
    Ok(())
}

fn inspect(
    doc: &Path,
    page: Option<usize>,
    find: Option<&str>,
    body_only: bool,
    raw: bool,
    json: bool,
) -> anyhow::Result<()> {
    if !doc.exists() {
        anyhow::bail!("File not found: {}", doc.display());
    }

    let backend = MupdfBackend::new();
    let pages = backend.extract_lines(doc)?;
    let config = ParsingConfig::default();
    let mut stdout = std::io::stdout();

    let selected: Vec<_> = pages
        .into_iter()
        .filter(|p| page.is_none_or(|n| p.index == n))
        .collect();

    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&selected)?)?;
        return Ok(());
    }

    if raw {
        for page in &selected {
            writeln!(stdout, "--- Page {} ---", page.index + 1)?;
            for line in &page.lines {
                writeln!(stdout, "{}", line.text)?;
            }
            writeln!(stdout)?;
        }
        return Ok(());
    }

    for page in &selected {
        writeln!(stdout, "--- Page {} ---", page.index + 1)?;
        let mut last_bottom: Option<f64> = None;
        for line in &page.lines {
            if body_only && line.x0 < config.session_id_x_max() {
                continue;
            }
            if let Some(token) = find
                && !line.text.contains(token)
            {
                continue;
            }
            match last_bottom {
                Some(bottom) => writeln!(
                    stdout,
                    "{} | x0: {:.2} | gap: {:.2}",
                    line.text,
                    line.x0,
                    line.top - bottom
                )?,
                None => writeln!(stdout, "{} | x0: {:.2}", line.text, line.x0)?,
            }
            last_bottom = Some(line.bottom);
        }
        writeln!(stdout)?;
    }
    Ok(())
}

fn verify(json_path: &Path, target: Option<&str>) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(json_path)?;
    let sessions: Vec<Session> = serde_json::from_str(&content)?;
    let mut stdout = std::io::stdout();

    writeln!(stdout, "Total sessions: {}", sessions.len())?;

    if let Some(target) = target {
        match sessions.iter().find(|s| s.id == target) {
            Some(session) => {
                writeln!(stdout, "\n--- Session {} ---", target)?;
                writeln!(stdout, "{}", serde_json::to_string_pretty(session)?)?;
            }
            None => writeln!(stdout, "\nSession {} not found", target)?,
        }
    }

    writeln!(stdout, "\n--- Empty field counts ---")?;
    let count = |pred: &dyn Fn(&Session) -> bool| sessions.iter().filter(|s| pred(s)).count();
    writeln!(
        stdout,
        "start_time: {}",
        count(&|s| s.start_time.is_empty())
    )?;
    writeln!(stdout, "location: {}", count(&|s| s.location.is_empty()))?;
    writeln!(stdout, "section: {}", count(&|s| s.section.is_empty()))?;
    writeln!(stdout, "title: {}", count(&|s| s.title.is_empty()))?;
    writeln!(
        stdout,
        "participants: {}",
        count(&|s| s.participants.is_empty())
    )?;

    writeln!(stdout, "\n--- Participant samples ---")?;
    for session in sessions.iter().filter(|s| !s.participants.is_empty()).take(3) {
        writeln!(stdout, "Session {}:", session.id)?;
        for paper in session.participants.iter().take(2) {
            writeln!(
                stdout,
                "  - {} | {} | {}",
                paper.title, paper.name, paper.affiliation
            )?;
        }
    }
    Ok(())
}
