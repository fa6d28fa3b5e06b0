//! Runbook documents: parameterized operator scripts.
//!
//! Runbooks are standalone shell/SQL/JS files with `{{ .var | ... }}`
//! placeholders and optional YAML front matter for metadata.

mod parser;
mod schema;

pub use parser::{discover_runbooks, parse_runbook, parse_runbook_str, resolve_runbook, RunbookError};
pub use schema::{FrontMatter, Runbook};
