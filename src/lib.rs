//! # Opsrun
//!
//! Render and validate parameterized operator runbooks.
//!
//! Runbooks are standalone shell/SQL/JS snippets with inline
//! `{{ .var | filter "arg" }}` placeholders. Opsrun parses the
//! placeholders, validates and coerces the supplied variables through each
//! filter chain, and produces fully substituted text - or every validation
//! error at once, so a half-rendered script never reaches live
//! infrastructure.
//!
//! ## Features
//!
//! - **Safe substitution**: all-or-nothing rendering with complete error
//!   reports (`required`, `type`, `pattern` filters)
//! - **Defaults & docs**: `default` and `description` filters drive form
//!   generation and runbook documentation
//! - **Discovery**: finds runbooks under `.opsrun/runbooks/` and
//!   `runbooks/`
//! - **Byte-faithful**: literal text outside placeholders is preserved
//!   exactly, whitespace and all
//!
//! ## Quick Start
//!
//! ```bash
//! # Install
//! cargo install opsrun
//!
//! # Render a runbook
//! opsrun render update-email --var email=a@b.com --var user_id=42
//!
//! # Or use the short alias
//! opr render update-email --var email=a@b.com --var user_id=42
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]

pub mod config;
pub mod runbook;
pub mod template;

pub use config::{Config, ConfigError, RunbookConfig};
pub use runbook::{
    discover_runbooks, parse_runbook, parse_runbook_str, resolve_runbook, FrontMatter, Runbook,
    RunbookError,
};
pub use template::{
    render, Filter, IssueKind, ParseError, Placeholder, PlaceholderInfo, RenderErrors, RenderIssue,
    Segment, Template, TemplateError, TypeKind, VariableError, Variables,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "opsrun";

/// Short alias
pub const APP_ALIAS: &str = "opr";
