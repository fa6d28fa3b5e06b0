//! Template AST.
//!
//! A parsed template is an ordered sequence of segments, each either a
//! byte-faithful literal span or a placeholder with its filter chain.

use regex::Regex;
use serde::Serialize;

use super::error::ParseError;
use super::parser;

/// A parsed template, ready to render.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

/// One span of a template.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal text, copied verbatim to the output.
    Literal(String),

    /// A `{{ .path | ... }}` expression.
    Placeholder(Placeholder),
}

/// A variable reference plus its ordered filter chain.
#[derive(Debug, Clone)]
pub struct Placeholder {
    /// Variable path without the leading dot (e.g. `user_id`, `aws.region`).
    pub path: String,

    /// Byte offset of the opening `{{` in the template source.
    pub offset: usize,

    /// Filters applied left-to-right, each consuming the previous output.
    pub filters: Vec<Filter>,
}

/// A single filter application.
///
/// The filter set is closed and known at parse time, so arguments are
/// validated (and the pattern regex compiled) before any rendering happens.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Fatal error with the given message when the value is absent or empty.
    Required { message: String },

    /// Substitute the literal argument when the value is absent.
    Default { value: String },

    /// Coerce the value to the given type or fail.
    Type { kind: TypeKind },

    /// Full-value match against an anchored regex or fail.
    Pattern { regex: Regex, raw: String },

    /// Documentation metadata; identity at render time.
    Description { text: String },
}

impl Filter {
    /// Registry name of this filter.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required { .. } => "required",
            Self::Default { .. } => "default",
            Self::Type { .. } => "type",
            Self::Pattern { .. } => "pattern",
            Self::Description { .. } => "description",
        }
    }
}

/// Target of a `type` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Number,
    String,
    Bool,
}

impl TypeKind {
    /// Parse a typename argument.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Typename as written in templates.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Bool => "bool",
        }
    }
}

/// Introspection record for one placeholder, assembled from its filter
/// chain. Feeds documentation output and UI form generation; rendering
/// never consults it.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceholderInfo {
    /// Variable path without the leading dot.
    pub path: String,

    /// Whether a `required` filter is present.
    pub required: bool,

    /// Message of the `required` filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_message: Option<String>,

    /// Value of the `default` filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Declared type, if a `type` filter is present.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<&'static str>,

    /// Pattern source, if a `pattern` filter is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Text of the `description` filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Template {
    /// Parse template source into a segment sequence.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        parser::parse(source).map(|segments| Self { segments })
    }

    /// The parsed segments in source order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All placeholders in source order, including duplicates.
    pub fn iter_placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    /// Introspection records, deduplicated by path in order of first
    /// appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<PlaceholderInfo> {
        let mut seen = std::collections::HashSet::new();
        let mut infos = Vec::new();

        for placeholder in self.iter_placeholders() {
            if !seen.insert(placeholder.path.clone()) {
                continue;
            }

            let mut info = PlaceholderInfo {
                path: placeholder.path.clone(),
                required: false,
                required_message: None,
                default: None,
                type_name: None,
                pattern: None,
                description: None,
            };

            for filter in &placeholder.filters {
                match filter {
                    Filter::Required { message } => {
                        info.required = true;
                        info.required_message.get_or_insert_with(|| message.clone());
                    }
                    Filter::Default { value } => {
                        info.default.get_or_insert_with(|| value.clone());
                    }
                    Filter::Type { kind } => {
                        info.type_name.get_or_insert(kind.as_str());
                    }
                    Filter::Pattern { raw, .. } => {
                        info.pattern.get_or_insert_with(|| raw.clone());
                    }
                    Filter::Description { text } => {
                        info.description.get_or_insert_with(|| text.clone());
                    }
                }
            }

            infos.push(info);
        }

        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_kind_roundtrip() {
        assert_eq!(TypeKind::from_name("number"), Some(TypeKind::Number));
        assert_eq!(TypeKind::from_name("string"), Some(TypeKind::String));
        assert_eq!(TypeKind::from_name("bool"), Some(TypeKind::Bool));
        assert_eq!(TypeKind::from_name("float"), None);
        assert_eq!(TypeKind::Number.as_str(), "number");
    }

    #[test]
    fn test_placeholder_introspection() {
        let template = Template::parse(
            r#"aws s3 cp {{ .src | required "source is required" | description "Source path" }} \
  s3://{{ .bucket | default "backups" | pattern "[a-z0-9-]+" }}/{{ .src }}"#,
        )
        .unwrap();

        let infos = template.placeholders();
        assert_eq!(infos.len(), 2);

        assert_eq!(infos[0].path, "src");
        assert!(infos[0].required);
        assert_eq!(infos[0].required_message.as_deref(), Some("source is required"));
        assert_eq!(infos[0].description.as_deref(), Some("Source path"));

        assert_eq!(infos[1].path, "bucket");
        assert!(!infos[1].required);
        assert_eq!(infos[1].default.as_deref(), Some("backups"));
        assert_eq!(infos[1].pattern.as_deref(), Some("[a-z0-9-]+"));
    }

    #[test]
    fn test_iter_placeholders_keeps_duplicates() {
        let template = Template::parse("{{ .x }} and {{ .x }}").unwrap();
        assert_eq!(template.iter_placeholders().count(), 2);
        assert_eq!(template.placeholders().len(), 1);
    }
}
