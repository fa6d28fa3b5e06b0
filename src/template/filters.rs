//! Filter registry and chain evaluation.
//!
//! The filter set is closed: the parser consults the registry for names and
//! arity, and this module gives each filter its render-time semantics. A
//! filter receives the previous filter's output (`None` marks an absent
//! variable, distinct from an empty string) and either transforms the value
//! or raises a fatal issue that ends the chain for its placeholder.

use serde_json::Value;

use super::ast::{Filter, Placeholder, TypeKind};
use super::error::{IssueKind, RenderIssue};
use super::vars::stringify;

/// Registry entry: a known filter name and its argument count.
pub(crate) struct FilterSpec {
    pub name: &'static str,
    pub arity: usize,
}

const REGISTRY: &[FilterSpec] = &[
    FilterSpec { name: "required", arity: 1 },
    FilterSpec { name: "default", arity: 1 },
    FilterSpec { name: "type", arity: 1 },
    FilterSpec { name: "pattern", arity: 1 },
    FilterSpec { name: "description", arity: 1 },
];

/// Look up a filter by name.
pub(crate) fn lookup(name: &str) -> Option<&'static FilterSpec> {
    REGISTRY.iter().find(|spec| spec.name == name)
}

/// Run a placeholder's filter chain left-to-right.
///
/// Short-circuits on the first fatal issue; the caller keeps rendering the
/// remaining placeholders so all issues surface in one pass.
pub(super) fn apply_chain(
    placeholder: &Placeholder,
    input: Option<Value>,
) -> Result<Option<Value>, RenderIssue> {
    let mut value = input;
    for filter in &placeholder.filters {
        value = apply(filter, &placeholder.path, value)?;
    }
    Ok(value)
}

fn apply(
    filter: &Filter,
    path: &str,
    value: Option<Value>,
) -> Result<Option<Value>, RenderIssue> {
    match filter {
        Filter::Required { message } => {
            let empty = value.as_ref().is_none_or(|v| stringify(v).is_empty());
            if empty {
                Err(issue(path, "required", IssueKind::RequiredMissing, message.clone()))
            } else {
                Ok(value)
            }
        }
        Filter::Default { value: fallback } => match value {
            Some(v) => Ok(Some(v)),
            None => Ok(Some(Value::String(fallback.clone()))),
        },
        Filter::Type { kind } => match value {
            // Absent passes through: only `required` makes absence fatal,
            // and an unconstrained missing variable renders as "".
            None => Ok(None),
            Some(v) => coerce(*kind, v, path).map(Some),
        },
        Filter::Pattern { regex, raw } => match value {
            None => Ok(None),
            Some(v) => {
                let text = stringify(&v);
                if regex.is_match(&text) {
                    Ok(Some(v))
                } else {
                    Err(issue(
                        path,
                        "pattern",
                        IssueKind::PatternMismatch,
                        format!("value \"{text}\" does not match pattern \"{raw}\""),
                    ))
                }
            }
        },
        Filter::Description { .. } => Ok(value),
    }
}

/// Coerce a present value to the requested type, or fail.
fn coerce(kind: TypeKind, value: Value, path: &str) -> Result<Value, RenderIssue> {
    match kind {
        TypeKind::String => Ok(value),
        TypeKind::Bool => coerce_bool(value, path),
        TypeKind::Number => coerce_number(value, path),
    }
}

fn coerce_bool(value: Value, path: &str) -> Result<Value, RenderIssue> {
    if value.is_boolean() {
        return Ok(value);
    }
    let text = stringify(&value);
    if text.eq_ignore_ascii_case("true") {
        Ok(Value::Bool(true))
    } else if text.eq_ignore_ascii_case("false") {
        Ok(Value::Bool(false))
    } else {
        Err(type_mismatch(path, "bool", &text))
    }
}

fn coerce_number(value: Value, path: &str) -> Result<Value, RenderIssue> {
    if value.is_number() {
        return Ok(value);
    }

    let text = stringify(&value);
    let trimmed = text.trim();
    if !is_decimal(trimmed) {
        return Err(type_mismatch(path, "number", &text));
    }

    if !trimmed.contains('.') {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| type_mismatch(path, "number", &text))
}

/// Whole-string base-10 integer or decimal: optional sign, digits, at most
/// one dot. No partial parses, no exponents, no hex.
fn is_decimal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() {
        return false;
    }
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

fn type_mismatch(path: &str, expected: &str, actual: &str) -> RenderIssue {
    issue(path, "type", IssueKind::TypeMismatch, format!("expected {expected}, got \"{actual}\""))
}

fn issue(path: &str, filter: &'static str, kind: IssueKind, message: String) -> RenderIssue {
    RenderIssue { path: path.to_string(), filter, message, kind }
}
