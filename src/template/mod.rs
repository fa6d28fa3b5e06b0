//! Template engine for runbook bodies.
//!
//! Parses `{{ .name | filter "arg" | ... }}` expressions, validates and
//! coerces supplied values through each placeholder's filter chain, and
//! substitutes them into the surrounding text. Rendering is pure and
//! synchronous: no I/O, no shared state, all-or-nothing output.

mod ast;
mod error;
mod filters;
mod parser;
mod render;
mod vars;

pub use ast::{Filter, Placeholder, PlaceholderInfo, Segment, Template, TypeKind};
pub use error::{IssueKind, ParseError, RenderErrors, RenderIssue};
pub use render::{render, TemplateError};
pub use vars::{stringify, VariableError, Variables};
