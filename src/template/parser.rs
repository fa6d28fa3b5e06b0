//! Placeholder expression parser.
//!
//! Splits template source into byte-faithful literal spans and parsed
//! `{{ .path | filter "arg" | ... }}` placeholders. Filter names, argument
//! arity, typenames, and pattern regexes are all validated here, before any
//! variable resolution happens.

use regex::Regex;

use super::ast::{Filter, Placeholder, Segment, TypeKind};
use super::error::ParseError;
use super::filters;

/// Parse template source into segments.
pub(super) fn parse(source: &str) -> Result<Vec<Segment>, ParseError> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(rel) = source[pos..].find("{{") {
        let open = pos + rel;
        if open > pos {
            segments.push(Segment::Literal(source[pos..open].to_string()));
        }

        let mut cursor = Cursor { src: source, pos: open + 2 };
        let placeholder = parse_placeholder(&mut cursor, open)?;
        segments.push(Segment::Placeholder(placeholder));
        pos = cursor.pos;
    }

    if pos < source.len() {
        segments.push(Segment::Literal(source[pos..].to_string()));
    }

    Ok(segments)
}

/// Byte-indexed scanner over the template source.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }
}

/// Parse one placeholder body; the cursor sits just past the opening `{{`
/// and is left just past the closing `}}`.
fn parse_placeholder(cursor: &mut Cursor, open: usize) -> Result<Placeholder, ParseError> {
    cursor.skip_whitespace();

    if cursor.at_end() {
        return Err(ParseError::UnterminatedPlaceholder { offset: open });
    }
    if !cursor.eat(".") {
        return Err(ParseError::ExpectedVariablePath { offset: cursor.pos });
    }

    let path_start = cursor.pos;
    while cursor.peek().is_some_and(is_path_char) {
        cursor.bump();
    }
    let path = cursor.src[path_start..cursor.pos].to_string();
    if path.is_empty() {
        return Err(ParseError::ExpectedVariablePath { offset: path_start });
    }

    let mut filters = Vec::new();
    loop {
        cursor.skip_whitespace();

        if cursor.eat("}}") {
            return Ok(Placeholder { path, offset: open, filters });
        }
        if cursor.eat("|") {
            filters.push(parse_filter(cursor, open)?);
            continue;
        }
        match cursor.peek() {
            None => return Err(ParseError::UnterminatedPlaceholder { offset: open }),
            Some(found) => {
                return Err(ParseError::UnexpectedToken { found, offset: cursor.pos })
            }
        }
    }
}

/// Parse one `name "arg" ...` filter expression after a `|`.
fn parse_filter(cursor: &mut Cursor, open: usize) -> Result<Filter, ParseError> {
    cursor.skip_whitespace();

    let name_start = cursor.pos;
    while cursor.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
        cursor.bump();
    }
    let name = cursor.src[name_start..cursor.pos].to_string();
    if name.is_empty() {
        return match cursor.peek() {
            None => Err(ParseError::UnterminatedPlaceholder { offset: open }),
            Some(found) => Err(ParseError::UnexpectedToken { found, offset: cursor.pos }),
        };
    }

    let spec = filters::lookup(&name)
        .ok_or_else(|| ParseError::UnknownFilter { name: name.clone(), offset: name_start })?;

    let mut args = Vec::new();
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some('"') => args.push(parse_quoted(cursor)?),
            // `}`, `|`, or end terminate the argument list; arity is
            // checked below and stray tokens surface in the caller.
            Some('}' | '|') | None => break,
            Some(_) if args.len() < spec.arity => {
                return Err(ParseError::ExpectedQuotedArgument {
                    filter: name,
                    offset: cursor.pos,
                });
            }
            Some(_) => break,
        }
    }

    if args.len() != spec.arity {
        return Err(ParseError::InvalidArity {
            filter: spec.name,
            expected: spec.arity,
            found: args.len(),
            offset: name_start,
        });
    }

    build_filter(spec.name, args, name_start)
}

/// Construct the typed filter, validating argument domains.
fn build_filter(name: &'static str, mut args: Vec<String>, offset: usize) -> Result<Filter, ParseError> {
    let arg = args.remove(0);
    match name {
        "required" => Ok(Filter::Required { message: arg }),
        "default" => Ok(Filter::Default { value: arg }),
        "type" => TypeKind::from_name(&arg)
            .map(|kind| Filter::Type { kind })
            .ok_or(ParseError::UnknownTypeName { name: arg, offset }),
        "pattern" => {
            // Anchor the whole value: authors write `[a-z0-9-]+` and mean
            // "the entire value matches", not "contains a match".
            let anchored = format!("^(?:{arg})$");
            match Regex::new(&anchored) {
                Ok(regex) => Ok(Filter::Pattern { regex, raw: arg }),
                Err(err) => Err(ParseError::InvalidPattern {
                    pattern: arg,
                    reason: err.to_string(),
                    offset,
                }),
            }
        }
        "description" => Ok(Filter::Description { text: arg }),
        _ => unreachable!("filter '{name}' is in the registry but not constructible"),
    }
}

/// Parse a double-quoted string with `\"`, `\\`, `\n`, `\t`, `\r` escapes.
fn parse_quoted(cursor: &mut Cursor) -> Result<String, ParseError> {
    let start = cursor.pos;
    cursor.bump(); // opening quote

    let mut out = String::new();
    loop {
        match cursor.bump() {
            None => return Err(ParseError::UnterminatedArgument { offset: start }),
            Some('"') => return Ok(out),
            Some('\\') => match cursor.bump() {
                None => return Err(ParseError::UnterminatedArgument { offset: start }),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
            },
            Some(c) => out.push(c),
        }
    }
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}
