//! Error types for routing.

use thiserror::Error;

use crate::request::Attribute;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No route matched the request.
    #[error("no route matched: {method} {path}")]
    NotFound { method: String, path: String },

    /// A route matched everything but the request method.
    #[error("method not allowed: {method} for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Unrecognized HTTP method name.
    #[error("unknown request method: {0}")]
    UnknownMethod(String),

    /// Invalid path pattern.
    #[error("invalid path pattern: {0}")]
    InvalidPattern(String),

    /// A condition tests an attribute the route set does not recognize.
    #[error("unsupported condition attribute: {0}")]
    UnsupportedCondition(Attribute),

    /// A route was given two conditions on the same attribute.
    #[error("duplicate condition on attribute: {0}")]
    DuplicateCondition(Attribute),

    /// A named capture points at a group the pattern does not have.
    #[error("capture group {index} out of range for pattern with {groups} groups")]
    InvalidCapture { index: usize, groups: usize },

    /// Route name not found.
    #[error("route not found: {0}")]
    RouteNotFound(String),

    /// No route can render a path from the given parameters.
    #[error("no route can generate a path for {0}")]
    GenerationFailed(String),

    /// Condition regex failed to compile.
    #[error("invalid condition regex: {0}")]
    Regex(#[from] regex::Error),

    /// Route table could not be parsed.
    #[error("invalid route configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
