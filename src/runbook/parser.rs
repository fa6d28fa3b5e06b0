//! Runbook loading and discovery.
//!
//! Splits optional front matter from the script body, validates that the
//! body parses as a template, and discovers runbook files under the
//! conventional directories.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{FrontMatter, Runbook};
use crate::config::Config;
use crate::template::ParseError;

/// Errors raised while loading a runbook file.
#[derive(Debug, Error)]
pub enum RunbookError {
    /// The file could not be read.
    #[error("failed to read runbook: {0}")]
    Io(#[from] std::io::Error),

    /// The front matter block is not valid YAML.
    #[error("invalid runbook front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    /// The script body is empty.
    #[error("runbook '{0}' has an empty body")]
    EmptyBody(String),

    /// The script body does not parse as a template.
    #[error("runbook '{name}' has an invalid template: {source}")]
    Template {
        name: String,
        #[source]
        source: ParseError,
    },
}

/// Parse a runbook from a file.
pub fn parse_runbook(path: &Path) -> Result<Runbook, RunbookError> {
    let content = std::fs::read_to_string(path)?;
    let stem = path.file_stem().and_then(|n| n.to_str()).unwrap_or("unnamed");
    let mut runbook = parse_runbook_str(&content, stem)?;
    runbook.path = Some(path.to_path_buf());
    Ok(runbook)
}

/// Parse a runbook from a string, with a fallback name (usually the file
/// stem) used when the front matter does not set one.
pub fn parse_runbook_str(content: &str, fallback_name: &str) -> Result<Runbook, RunbookError> {
    let (front, body) = split_front_matter(content);

    let front: FrontMatter = match front {
        Some(block) => serde_yaml::from_str(block)?,
        None => FrontMatter::default(),
    };

    let name = front.name.unwrap_or_else(|| fallback_name.to_string());

    if body.trim().is_empty() {
        return Err(RunbookError::EmptyBody(name));
    }

    // Fail fast on templates that can never render.
    if let Err(source) = crate::template::Template::parse(body) {
        return Err(RunbookError::Template { name, source });
    }

    Ok(Runbook {
        name,
        description: front.description,
        interpreter: front.interpreter,
        tags: front.tags,
        body: body.to_string(),
        path: None,
    })
}

/// Split a leading `---` front matter block from the body.
///
/// The body keeps its bytes exactly as authored; only the front matter
/// block and its delimiters are removed.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    if let Some(after) = content.strip_prefix("---\n") {
        if let Some(end) = after.find("\n---\n") {
            return (Some(&after[..end]), &after[end + 5..]);
        }
        if let Some(block) = after.strip_suffix("\n---") {
            return (Some(block), "");
        }
    }
    (None, content)
}

/// Discover runbooks under a root directory.
///
/// Scans the configured runbook directories (by default `.opsrun/runbooks/`
/// and `runbooks/`), recursively, keeping files whose extension is in the
/// configured set. Files that fail to load are skipped with a warning so a
/// single broken runbook does not hide the rest.
pub fn discover_runbooks(root: &Path, config: &Config) -> Vec<Runbook> {
    let mut runbooks = Vec::new();

    for dir in config.runbooks.expanded_dirs(root) {
        if !dir.exists() {
            continue;
        }
        runbooks.extend(scan_runbook_dir(&dir, &config.runbooks.extensions));
    }

    runbooks.sort_by(|a, b| a.name.cmp(&b.name));
    runbooks
}

/// Scan a single directory tree for runbook files.
fn scan_runbook_dir(dir: &Path, extensions: &[String]) -> Vec<Runbook> {
    let mut runbooks = Vec::new();

    for entry in walkdir::WalkDir::new(dir).follow_links(true).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|known| known.eq_ignore_ascii_case(e)));
        if !matches_extension {
            continue;
        }

        match parse_runbook(path) {
            Ok(runbook) => runbooks.push(runbook),
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Skipping unparseable runbook");
            }
        }
    }

    runbooks
}

/// Resolve a name-or-path argument to a runbook.
///
/// An argument that names an existing file loads directly; anything else is
/// matched by name against the discovered runbooks.
pub fn resolve_runbook(arg: &str, root: &Path, config: &Config) -> Option<Result<Runbook, RunbookError>> {
    let as_path = PathBuf::from(arg);
    if as_path.is_file() {
        return Some(parse_runbook(&as_path));
    }

    discover_runbooks(root, config).into_iter().find(|r| r.name == arg).map(Ok)
}
