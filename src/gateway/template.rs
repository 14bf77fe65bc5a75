//! URL path templates.
//!
//! A template is a `/`-separated list of segments. Each segment is a literal,
//! a `{field}` variable capturing one segment into a request field, or `*`
//! matching any single segment. Literal matching is exact and case-sensitive.

use std::fmt;

use crate::{GatehouseError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
    Wildcard,
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template such as `/v1/greet/{name}`.
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            GatehouseError::Configuration(format!("invalid path template {template:?}: {reason}"))
        };

        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for raw in rest.split('/') {
                let segment = match raw {
                    "" => return Err(invalid("empty segment")),
                    "*" => Segment::Wildcard,
                    _ if raw.starts_with('{') => {
                        let name = raw
                            .strip_prefix('{')
                            .and_then(|r| r.strip_suffix('}'))
                            .ok_or_else(|| invalid("unclosed variable"))?;
                        if name.is_empty() || !name.chars().all(is_field_char) {
                            return Err(invalid("bad variable name"));
                        }
                        let duplicate = segments
                            .iter()
                            .any(|s| matches!(s, Segment::Variable(n) if n == name));
                        if duplicate {
                            return Err(invalid("duplicate variable"));
                        }
                        Segment::Variable(name.to_string())
                    }
                    _ if raw.contains(['{', '}']) => return Err(invalid("stray brace")),
                    _ => Segment::Literal(raw.to_string()),
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the variables bound by this template, in order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Match `path` and return the captured variables, or `None`.
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captures = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Wildcard if !part.is_empty() => {}
                Segment::Variable(name) if !part.is_empty() => {
                    captures.push((name.clone(), part.to_string()));
                }
                Segment::Wildcard | Segment::Variable(_) => return None,
            }
        }
        Some(captures)
    }
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
