//! Template engine error types.

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing a template.
///
/// Parse errors are fatal: a template that does not parse is never rendered,
/// so these abort before any variable resolution happens. Every variant
/// carries the byte offset of the offending placeholder in the source text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A `{{` with no matching `}}`.
    #[error("unterminated placeholder starting at byte {offset}")]
    UnterminatedPlaceholder { offset: usize },

    /// A placeholder that does not start with a `.`-prefixed variable path.
    #[error("expected a variable path like `.name` at byte {offset}")]
    ExpectedVariablePath { offset: usize },

    /// A filter name that is not in the registry.
    #[error("unknown filter '{name}' at byte {offset}")]
    UnknownFilter { name: String, offset: usize },

    /// Wrong number of arguments for a known filter.
    #[error("filter '{filter}' takes {expected} argument(s), found {found} at byte {offset}")]
    InvalidArity { filter: &'static str, expected: usize, found: usize, offset: usize },

    /// A filter argument that is not a double-quoted string.
    #[error("expected a quoted argument for filter '{filter}' at byte {offset}")]
    ExpectedQuotedArgument { filter: String, offset: usize },

    /// A quoted argument with no closing quote.
    #[error("unterminated quoted argument at byte {offset}")]
    UnterminatedArgument { offset: usize },

    /// `type` with a typename outside number/string/bool.
    #[error("unknown type '{name}' at byte {offset} (expected \"number\", \"string\", or \"bool\")")]
    UnknownTypeName { name: String, offset: usize },

    /// `pattern` with a regex that does not compile.
    #[error("invalid pattern '{pattern}' at byte {offset}: {reason}")]
    InvalidPattern { pattern: String, reason: String, offset: usize },

    /// Unexpected token inside a placeholder.
    #[error("unexpected character '{found}' in placeholder at byte {offset}")]
    UnexpectedToken { found: char, offset: usize },
}

/// The kind of a render-time validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A `required` filter saw an absent or empty value.
    RequiredMissing,
    /// A `type` filter could not coerce the value.
    TypeMismatch,
    /// A `pattern` filter did not match the full value.
    PatternMismatch,
}

/// A single validation failure for one placeholder.
///
/// Issues are fatal for their placeholder (the rest of its filter chain is
/// skipped) but rendering continues across the other placeholders so that
/// one pass surfaces every problem.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RenderIssue {
    /// Variable path of the placeholder, without the leading dot.
    pub path: String,

    /// Name of the filter that raised the issue.
    pub filter: &'static str,

    /// Human-readable message.
    pub message: String,

    /// Issue classification.
    pub kind: IssueKind,
}

impl fmt::Display for RenderIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{} ({}): {}", self.path, self.filter, self.message)
    }
}

/// The complete, ordered set of validation failures from one render pass.
///
/// Rendering is all-or-nothing: when this is returned, no partial text
/// exists, so a half-substituted runbook can never reach an interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderErrors {
    pub issues: Vec<RenderIssue>,
}

impl std::error::Error for RenderErrors {}

impl RenderErrors {
    pub fn new(issues: Vec<RenderIssue>) -> Self {
        Self { issues }
    }

    /// Number of collected issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Iterate over the collected issues in placeholder order.
    pub fn iter(&self) -> impl Iterator<Item = &RenderIssue> {
        self.issues.iter()
    }
}

impl fmt::Display for RenderErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_carries_offset() {
        let err = ParseError::UnterminatedPlaceholder { offset: 42 };
        assert!(err.to_string().contains("byte 42"));

        let err = ParseError::UnknownFilter { name: "upcase".to_string(), offset: 7 };
        assert!(err.to_string().contains("upcase"));
        assert!(err.to_string().contains("byte 7"));
    }

    #[test]
    fn test_render_errors_display_lists_all_issues() {
        let errors = RenderErrors::new(vec![
            RenderIssue {
                path: "email".to_string(),
                filter: "required",
                message: "New email is required".to_string(),
                kind: IssueKind::RequiredMissing,
            },
            RenderIssue {
                path: "user_id".to_string(),
                filter: "type",
                message: "expected number, got \"abc\"".to_string(),
                kind: IssueKind::TypeMismatch,
            },
        ]);

        let text = errors.to_string();
        assert!(text.starts_with("2 validation error(s)"));
        assert!(text.contains(".email (required): New email is required"));
        assert!(text.contains(".user_id (type)"));
    }
}
