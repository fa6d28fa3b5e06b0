//! Renderer orchestration.
//!
//! Walks the parsed segments, resolves each placeholder against the
//! variable map, runs its filter chain, and assembles the output. Issues
//! from independent placeholders accumulate so one pass reports every
//! problem, and a non-empty issue list means no text is returned at all:
//! a half-rendered runbook must never reach an interpreter.

use super::ast::{Segment, Template};
use super::error::{ParseError, RenderErrors};
use super::filters;
use super::vars::{stringify, Variables};

use thiserror::Error;

/// Failure of the combined parse-and-render entry point.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    /// The template did not parse; nothing was resolved or rendered.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The template parsed but one or more placeholders failed validation.
    #[error(transparent)]
    Invalid(#[from] RenderErrors),
}

/// Parse and render in one call.
pub fn render(source: &str, vars: &Variables) -> Result<String, TemplateError> {
    let template = Template::parse(source)?;
    Ok(template.render(vars)?)
}

impl Template {
    /// Render against a variable map.
    ///
    /// Returns the fully substituted text, or every validation issue
    /// collected across all placeholders.
    pub fn render(&self, vars: &Variables) -> Result<String, RenderErrors> {
        let mut out = String::new();
        let mut issues = Vec::new();

        for segment in self.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(placeholder) => {
                    let input = vars.lookup(&placeholder.path).cloned();
                    match filters::apply_chain(placeholder, input) {
                        Ok(Some(value)) => out.push_str(&stringify(&value)),
                        // Absent with no required/default: empty string.
                        Ok(None) => {}
                        Err(issue) => issues.push(issue),
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(out)
        } else {
            Err(RenderErrors::new(issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::error::IssueKind;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        let mut vars = Variables::new();
        for (key, value) in pairs {
            vars.insert(*key, *value);
        }
        vars
    }

    #[test]
    fn test_literal_template_is_unchanged() {
        let source = "#!/bin/bash\nset -euo pipefail\n\naws sts get-caller-identity\n";
        assert_eq!(render(source, &Variables::new()).unwrap(), source);
        assert_eq!(render(source, &vars(&[("unused", "x")])).unwrap(), source);
    }

    #[test]
    fn test_sql_update_scenario() {
        let source = "UPDATE users SET email = '{{ .email | required \"New email is required\" }}' WHERE user_id = {{ .user_id | type \"number\" | required \"User ID is required\"}};";

        let mut variables = Variables::new();
        variables.insert("email", "a@b.com");
        variables.insert("user_id", 42);

        assert_eq!(
            render(source, &variables).unwrap(),
            "UPDATE users SET email = 'a@b.com' WHERE user_id = 42;"
        );
    }

    #[test]
    fn test_all_errors_reported_in_one_pass() {
        let source = "UPDATE users SET email = '{{ .email | required \"New email is required\" }}' WHERE user_id = {{ .user_id | type \"number\" | required \"User ID is required\"}};";

        let err = render(source, &vars(&[("user_id", "not-a-number")])).unwrap_err();
        let TemplateError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.issues[0].path, "email");
        assert_eq!(errors.issues[0].kind, IssueKind::RequiredMissing);
        assert_eq!(errors.issues[0].message, "New email is required");
        assert_eq!(errors.issues[1].path, "user_id");
        assert_eq!(errors.issues[1].kind, IssueKind::TypeMismatch);
    }

    #[test]
    fn test_default_scenario() {
        let source = "{{ .s3_key_prefix | default \"hoop-sessions\" }}";
        assert_eq!(render(source, &Variables::new()).unwrap(), "hoop-sessions");
        assert_eq!(render(source, &vars(&[("s3_key_prefix", "archive")])).unwrap(), "archive");
    }

    #[test]
    fn test_unconstrained_missing_variable_renders_empty() {
        assert_eq!(render("[{{ .missing }}]", &Variables::new()).unwrap(), "[]");
    }

    #[test]
    fn test_parse_error_aborts_before_resolution() {
        let err = render("{{ .x | bogus }}", &vars(&[("x", "1")])).unwrap_err();
        assert!(matches!(err, TemplateError::Parse(ParseError::UnknownFilter { .. })));
    }

    #[test]
    fn test_no_partial_output_on_failure() {
        let source = "ok: {{ .present }} bad: {{ .gone | required \"missing\" }}";
        let result = Template::parse(source).unwrap().render(&vars(&[("present", "yes")]));
        // Err carries issues only; there is no rendered text to leak.
        assert!(result.is_err());
    }

    #[test]
    fn test_number_stringification_is_canonical() {
        let mut variables = Variables::new();
        variables.insert("a", serde_json::json!(42));
        variables.insert("b", serde_json::json!(42.5));
        variables.insert("c", "7.0");

        let out =
            render("{{ .a }} {{ .b }} {{ .c | type \"number\" }}", &variables).unwrap();
        assert_eq!(out, "42 42.5 7");
    }

    #[test]
    fn test_bool_renders_lowercase() {
        let out = render(
            "{{ .dry_run | type \"bool\" }}",
            &vars(&[("dry_run", "TRUE")]),
        )
        .unwrap();
        assert_eq!(out, "true");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let source = "export BUCKET={{ .bucket | default \"hoop\" }}/{{ .prefix }}";
        let variables = vars(&[("prefix", "sessions")]);

        let first = render(source, &variables).unwrap();
        let second = render(source, &variables).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nested_variable_map() {
        let mut variables = Variables::new();
        variables.insert("aws", serde_json::json!({"region": "us-east-1"}));

        let out = render("--region {{ .aws.region }}", &variables).unwrap();
        assert_eq!(out, "--region us-east-1");
    }

    #[test]
    fn test_issue_order_follows_template_order() {
        let source = "{{ .a | required \"a missing\" }}{{ .b | required \"b missing\" }}{{ .c | required \"c missing\" }}";
        let err = Template::parse(source).unwrap().render(&Variables::new()).unwrap_err();
        let paths: Vec<_> = err.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b", "c"]);
    }
}
