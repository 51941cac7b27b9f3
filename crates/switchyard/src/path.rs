//! Path pattern compilation and rendering.

use std::collections::{BTreeSet, HashMap};
use std::iter::Peekable;
use std::str::Chars;

use regex::Regex;

use crate::condition::Condition;
use crate::error::{Result, RouterError};
use crate::request::{Attribute, Params};

/// Requirement applied to `:name` segments without an explicit one.
const DEFAULT_REQUIREMENT: &str = "[^/.?]+";

/// Requirement applied to `*name` glob segments without an explicit one.
const GLOB_REQUIREMENT: &str = ".+";

/// A segment in a path pattern.
#[derive(Debug, Clone)]
enum Segment {
    /// A literal string segment.
    Literal(String),
    /// A parameter segment (`:id` or `*path`).
    Param {
        name: String,
        requirement: String,
        check: Regex,
    },
    /// A group that may be absent (`(.:format)`).
    Optional(Vec<Segment>),
}

/// A compiled path pattern, usable both for matching and generation.
///
/// Pattern syntax:
/// - `/people` - literal path
/// - `/people/:id` - named parameter, one segment
/// - `/files/*path` - glob parameter, matches the rest of the path
/// - `/people(.:format)` - optional group, may nest
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The original pattern string.
    pattern: String,
    /// Parsed segments.
    segments: Vec<Segment>,
    /// Regex source for the whole pattern, without anchors.
    source: String,
    /// Parameter names in order of appearance.
    param_names: Vec<String>,
}

impl PathPattern {
    /// Parses a path pattern string.
    ///
    /// # Example
    ///
    /// ```
    /// use switchyard::PathPattern;
    ///
    /// let pattern = PathPattern::new("/posts/:id(.:format)").unwrap();
    /// assert_eq!(pattern.param_names(), ["id", "format"]);
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_requirements(pattern, &HashMap::new())
    }

    /// Parses a path pattern, constraining parameters by regex.
    ///
    /// A requirement must match a parameter value completely.
    pub fn with_requirements(
        pattern: &str,
        requirements: &HashMap<String, String>,
    ) -> Result<Self> {
        let trimmed = pattern.trim_end_matches('/');
        let mut names = BTreeSet::new();
        let mut chars = trimmed.chars().peekable();
        let segments = parse_segments(&mut chars, 0, requirements, &mut names)?;

        let mut source = String::new();
        let mut param_names = Vec::new();
        write_source(&segments, &mut source, &mut param_names);

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            source,
            param_names,
        })
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the parameter names.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Builds a path condition matching the whole path.
    ///
    /// A single trailing slash is tolerated.
    pub fn condition(&self) -> Result<Condition> {
        Condition::new(Attribute::PathInfo, &format!("{}/?", self.source), true)
    }

    /// Builds a path condition matching this pattern as a prefix.
    ///
    /// The prefix must end at a segment boundary, so `/admin` does not
    /// match `/administrator`.
    pub fn prefix_condition(&self) -> Result<Condition> {
        Condition::new(Attribute::PathInfo, &format!(r"{}(?:/|\z)", self.source), false)
    }

    /// Renders a path from `supplied` parameters, falling back to `defaults`.
    ///
    /// Optional groups are rendered only when a parameter inside them was
    /// supplied with a value different from its default. Returns `None` when
    /// a required parameter is missing or fails its requirement, including
    /// one inside an optional group that has to be rendered.
    ///
    /// # Example
    ///
    /// ```
    /// use switchyard::{Params, PathPattern};
    ///
    /// let pattern = PathPattern::new("/posts/:id").unwrap();
    /// let params: Params = [("id", "123")].into_iter().collect();
    /// let path = pattern.generate(&params, &Params::new()).unwrap();
    /// assert_eq!(path, "/posts/123");
    /// ```
    pub fn generate(&self, supplied: &Params, defaults: &Params) -> Option<String> {
        let mut path = String::new();
        render(&self.segments, supplied, defaults, &mut path)?;

        if path.is_empty() {
            path.push('/');
        }

        Some(path)
    }
}

fn parse_segments(
    chars: &mut Peekable<Chars<'_>>,
    depth: usize,
    requirements: &HashMap<String, String>,
    names: &mut BTreeSet<String>,
) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();

    loop {
        let Some(c) = chars.next() else {
            if depth > 0 {
                return Err(RouterError::InvalidPattern("unclosed '('".to_string()));
            }
            break;
        };

        match c {
            '(' => {
                flush_literal(&mut literal, &mut segments);
                let inner = parse_segments(chars, depth + 1, requirements, names)?;
                segments.push(Segment::Optional(inner));
            }
            ')' => {
                if depth == 0 {
                    return Err(RouterError::InvalidPattern("unmatched ')'".to_string()));
                }
                break;
            }
            ':' | '*' => {
                flush_literal(&mut literal, &mut segments);
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if !(n.is_ascii_alphanumeric() || n == '_') {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                if name.is_empty() {
                    return Err(RouterError::InvalidPattern(format!(
                        "parameter name expected after '{c}'"
                    )));
                }
                if !names.insert(name.clone()) {
                    return Err(RouterError::InvalidPattern(format!(
                        "duplicate parameter '{name}'"
                    )));
                }

                let fallback = if c == '*' {
                    GLOB_REQUIREMENT
                } else {
                    DEFAULT_REQUIREMENT
                };
                let requirement = requirements
                    .get(&name)
                    .map_or(fallback, String::as_str)
                    .to_string();
                let check = Regex::new(&format!(r"\A(?:{requirement})\z")).map_err(|e| {
                    RouterError::InvalidPattern(format!("requirement for '{name}': {e}"))
                })?;
                segments.push(Segment::Param {
                    name,
                    requirement,
                    check,
                });
            }
            _ => literal.push(c),
        }
    }

    flush_literal(&mut literal, &mut segments);
    Ok(segments)
}

fn flush_literal(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn write_source(segments: &[Segment], out: &mut String, names: &mut Vec<String>) {
    for segment in segments {
        match segment {
            Segment::Literal(s) => out.push_str(&regex::escape(s)),
            Segment::Param {
                name, requirement, ..
            } => {
                out.push_str(&format!("(?P<{name}>{requirement})"));
                names.push(name.clone());
            }
            Segment::Optional(inner) => {
                out.push_str("(?:");
                write_source(inner, out, names);
                out.push_str(")?");
            }
        }
    }
}

fn param_value<'p>(
    name: &str,
    check: &Regex,
    supplied: &'p Params,
    defaults: &'p Params,
) -> Option<&'p str> {
    let value = supplied.get(name).or_else(|| defaults.get(name))?;
    check.is_match(value).then_some(value)
}

fn render(
    segments: &[Segment],
    supplied: &Params,
    defaults: &Params,
    out: &mut String,
) -> Option<()> {
    for segment in segments {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Param { name, check, .. } => {
                out.push_str(param_value(name, check, supplied, defaults)?);
            }
            Segment::Optional(inner) => {
                if let Some(group) = render_optional(inner, supplied, defaults)? {
                    out.push_str(&group);
                }
            }
        }
    }
    Some(())
}

/// Renders an optional group.
///
/// `Some(None)` skips the group. `None` means the group has to be rendered
/// but one of its parameters has no usable value.
fn render_optional(
    segments: &[Segment],
    supplied: &Params,
    defaults: &Params,
) -> Option<Option<String>> {
    let mut significant = segments.iter().any(|segment| match segment {
        Segment::Param { name, .. } => supplied
            .get(name)
            .is_some_and(|v| defaults.get(name) != Some(v)),
        _ => false,
    });

    let mut out = String::new();
    let mut complete = true;
    for segment in segments {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Param { name, check, .. } => {
                let value = param_value(name, check, supplied, defaults);
                complete &= value.is_some();
                out.push_str(value.unwrap_or_default());
            }
            Segment::Optional(inner) => {
                if let Some(group) = render_optional(inner, supplied, defaults)? {
                    significant = true;
                    out.push_str(&group);
                }
            }
        }
    }

    if !significant {
        return Some(None);
    }
    complete.then_some(Some(out))
}
