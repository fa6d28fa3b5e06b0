//! Runbook document definitions.
//!
//! A runbook is a standalone script (shell, SQL, JS) whose body embeds
//! `{{ .var | ... }}` placeholders, optionally preceded by a YAML front
//! matter block carrying metadata.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::template::{ParseError, PlaceholderInfo, Template, TemplateError, Variables};

/// A loaded runbook document.
#[derive(Debug, Clone)]
pub struct Runbook {
    /// Name of the runbook (front matter `name`, else the file stem)
    pub name: String,

    /// Description of what this runbook does
    pub description: Option<String>,

    /// Interpreter hint for the rendered output (e.g. "bash", "psql")
    pub interpreter: Option<String>,

    /// Free-form tags for grouping in listings
    pub tags: Vec<String>,

    /// Raw script body with placeholders, exactly as authored
    pub body: String,

    /// Source file, when loaded from disk
    pub path: Option<PathBuf>,
}

/// Front matter block between `---` markers at the top of a runbook file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Name override for the runbook
    pub name: Option<String>,

    /// Description of what this runbook does
    pub description: Option<String>,

    /// Interpreter hint for the rendered output
    pub interpreter: Option<String>,

    /// Free-form tags
    pub tags: Vec<String>,
}

impl Runbook {
    /// Parse the body into a template.
    pub fn template(&self) -> Result<Template, ParseError> {
        Template::parse(&self.body)
    }

    /// Introspect the body's placeholders for documentation or UI forms.
    pub fn variables(&self) -> Result<Vec<PlaceholderInfo>, ParseError> {
        Ok(self.template()?.placeholders())
    }

    /// Render the body against a variable map.
    pub fn render(&self, vars: &Variables) -> Result<String, TemplateError> {
        crate::template::render(&self.body, vars)
    }

    /// Number of distinct variables referenced by the body.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.template().map(|t| t.placeholders().len()).unwrap_or(0)
    }
}
