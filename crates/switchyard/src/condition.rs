//! Single-attribute match predicates.

use regex::{Captures, Regex};

use crate::error::{Result, RouterError};
use crate::request::Attribute;

/// A compiled constraint on one request attribute.
///
/// An anchored condition must match the whole attribute value; an unanchored
/// one is satisfied by a match of any leading portion of it. Named captures
/// map capture-group indices to routing parameter names.
#[derive(Debug, Clone)]
pub struct Condition {
    attribute: Attribute,
    source: String,
    regex: Regex,
    anchored: bool,
    named_captures: Vec<(usize, String)>,
}

impl Condition {
    /// Compiles `pattern` into a condition on `attribute`.
    ///
    /// Named groups (`(?P<id>...)`) become named captures automatically.
    pub fn new(attribute: Attribute, pattern: &str, anchored: bool) -> Result<Self> {
        let wrapped = if anchored {
            format!(r"\A(?:{pattern})\z")
        } else {
            format!(r"\A(?:{pattern})")
        };
        let regex = Regex::new(&wrapped)?;

        let named_captures = regex
            .capture_names()
            .enumerate()
            .filter_map(|(i, name)| name.map(|n| (i, n.to_string())))
            .collect();

        Ok(Self {
            attribute,
            source: pattern.to_string(),
            regex,
            anchored,
            named_captures,
        })
    }

    /// Creates an anchored condition matching `literal` exactly.
    pub fn exact(attribute: Attribute, literal: &str) -> Result<Self> {
        Self::new(attribute, &regex::escape(literal), true)
    }

    /// Maps capture group `index` to the parameter `name`.
    ///
    /// Group 0 is the whole match and cannot be named.
    pub fn capture(mut self, index: usize, name: impl Into<String>) -> Result<Self> {
        let groups = self.regex.captures_len();
        if index == 0 || index >= groups {
            return Err(RouterError::InvalidCapture {
                index,
                groups: groups - 1,
            });
        }
        let name = name.into();
        self.named_captures.retain(|(i, _)| *i != index);
        self.named_captures.push((index, name));
        self.named_captures.sort_by_key(|(i, _)| *i);
        Ok(self)
    }

    /// Returns the attribute this condition tests.
    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Returns the pattern source as given at construction.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// Returns whether a match must consume the whole value.
    pub fn anchored(&self) -> bool {
        self.anchored
    }

    /// Returns the capture-group index to parameter name mapping.
    pub fn named_captures(&self) -> &[(usize, String)] {
        &self.named_captures
    }

    /// Returns the parameter names this condition can produce.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.named_captures.iter().map(|(_, name)| name.as_str())
    }

    /// Matches `value`, returning the capture groups on success.
    pub fn captures<'v>(&self, value: &'v str) -> Option<Captures<'v>> {
        self.regex.captures(value)
    }

    /// Returns true if `value` satisfies this condition.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}
