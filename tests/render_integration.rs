//! Rendering Integration Tests
//!
//! Exercises the template engine through the public library API with
//! realistic runbook bodies.

use opsrun::{parse_runbook_str, IssueKind, Template, TemplateError, Variables};

// ============================================================================
// Literal Fidelity
// ============================================================================

#[test]
fn test_placeholder_free_script_roundtrips_byte_for_byte() {
    let body = "#!/bin/bash\nset -euo pipefail\n\n# fetch instance metadata\ncurl -s http://169.254.169.254/latest/meta-data/instance-id\n";

    let template = Template::parse(body).unwrap();
    assert_eq!(template.render(&Variables::new()).unwrap(), body);
}

#[test]
fn test_indentation_and_newlines_survive_rendering() {
    let body = "if [ -n \"$1\" ]; then\n\tqueue=\"{{ .queue | default \"default\" }}\"\nfi\n";

    let template = Template::parse(body).unwrap();
    let rendered = template.render(&Variables::new()).unwrap();
    assert_eq!(rendered, "if [ -n \"$1\" ]; then\n\tqueue=\"default\"\nfi\n");
}

// ============================================================================
// Corpus-Shaped Scenarios
// ============================================================================

#[test]
fn test_sql_update_with_full_variables() {
    let body = "UPDATE users SET email = '{{ .email | required \"New email is required\" }}' WHERE user_id = {{ .user_id | type \"number\" | required \"User ID is required\"}};";

    let mut vars = Variables::new();
    vars.insert("email", "a@b.com");
    vars.insert("user_id", 42);

    let rendered = opsrun::render(body, &vars).unwrap();
    assert_eq!(rendered, "UPDATE users SET email = 'a@b.com' WHERE user_id = 42;");
}

#[test]
fn test_sql_update_collects_both_errors() {
    let body = "UPDATE users SET email = '{{ .email | required \"New email is required\" }}' WHERE user_id = {{ .user_id | type \"number\" | required \"User ID is required\"}};";

    let mut vars = Variables::new();
    vars.insert("user_id", "not-a-number");

    let err = opsrun::render(body, &vars).unwrap_err();
    let TemplateError::Invalid(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.issues[0].kind, IssueKind::RequiredMissing);
    assert_eq!(errors.issues[0].message, "New email is required");
    assert_eq!(errors.issues[1].kind, IssueKind::TypeMismatch);
    assert_eq!(errors.issues[1].path, "user_id");
}

#[test]
fn test_session_export_runbook_end_to_end() {
    let content = r#"---
name: export-sessions
description: Export session recordings to S3
interpreter: bash
---
aws s3 sync ./recordings \
  "s3://{{ .bucket | required "bucket is required" | pattern "[a-z0-9.-]+" }}/{{ .s3_key_prefix | default "hoop-sessions" }}/" \
  --storage-class {{ .storage_class | default "STANDARD_IA" }}
"#;

    let runbook = parse_runbook_str(content, "export-sessions").unwrap();

    let mut vars = Variables::new();
    vars.insert("bucket", "ops-archive");

    let rendered = runbook.render(&vars).unwrap();
    assert_eq!(
        rendered,
        "aws s3 sync ./recordings \\\n  \"s3://ops-archive/hoop-sessions/\" \\\n  --storage-class STANDARD_IA\n"
    );
}

#[test]
fn test_uppercase_bucket_fails_pattern() {
    let body = r#"aws s3 rb "s3://{{ .bucket | pattern "[a-z0-9-]+" }}" --force"#;

    let mut vars = Variables::new();
    vars.insert("bucket", "MyBucket");

    let err = opsrun::render(body, &vars).unwrap_err();
    let TemplateError::Invalid(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.issues[0].kind, IssueKind::PatternMismatch);
}

#[test]
fn test_repeated_variable_renders_consistently() {
    let body = "mongo --eval 'db.users.find({_id: \"{{ .user_id }}\"})' && echo \"checked {{ .user_id }}\"";

    let mut vars = Variables::new();
    vars.insert("user_id", "u-123");

    let rendered = opsrun::render(body, &vars).unwrap();
    assert_eq!(
        rendered,
        "mongo --eval 'db.users.find({_id: \"u-123\"})' && echo \"checked u-123\""
    );
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_rendering_is_deterministic() {
    let body = "export TTL={{ .ttl | default \"24\" | type \"number\" }}";
    let vars = Variables::new();

    let outputs: Vec<_> =
        (0..3).map(|_| opsrun::render(body, &vars).unwrap()).collect();
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(outputs[0], "export TTL=24");
}

// ============================================================================
// Error Reporting Shape
// ============================================================================

#[test]
fn test_error_display_is_operator_readable() {
    let body = "{{ .env | required \"environment is required\" }}";

    let err = opsrun::render(body, &Variables::new()).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("1 validation error(s)"));
    assert!(text.contains(".env (required): environment is required"));
}

#[test]
fn test_parse_error_reports_offset_before_any_rendering() {
    let body = "echo ok\necho {{ .x | ";

    let err = opsrun::render(body, &Variables::new()).unwrap_err();
    let TemplateError::Parse(parse) = err else {
        panic!("expected a parse error");
    };
    assert!(parse.to_string().contains("byte 13"));
}
