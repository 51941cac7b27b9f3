//! HTTP request type and the attributes routes can test.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
}

impl Method {
    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(RouterError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request attribute a [`Condition`](crate::Condition) can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    /// The path still to be routed (after any mounted prefix).
    PathInfo,
    /// The HTTP method name.
    RequestMethod,
    /// The `Host` header.
    Host,
    /// The URL scheme (`http`, `https`).
    Scheme,
}

impl Attribute {
    /// Every attribute a [`Request`] can provide.
    pub const ALL: [Self; 4] = [Self::PathInfo, Self::RequestMethod, Self::Host, Self::Scheme];

    /// Returns the attribute name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PathInfo => "path_info",
            Self::RequestMethod => "request_method",
            Self::Host => "host",
            Self::Scheme => "scheme",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing parameters: defaults merged with values captured by conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
    params: HashMap<String, String>,
}

impl Params {
    /// Creates new empty params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.params.insert(key.into(), value.into())
    }

    /// Gets a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns true if the parameter is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Gets a parameter value or returns an error.
    pub fn require(&self, key: &str) -> Result<&str, String> {
        self.get(key)
            .ok_or_else(|| format!("Missing routing parameter: {key}"))
    }

    /// Parses a parameter as a specific type.
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for Params {
    fn from(params: HashMap<String, String>) -> Self {
        Self { params }
    }
}

/// An HTTP request.
///
/// `params` and `prefix` are written by routing: `params` holds the merged
/// routing parameters of the matched route, `prefix` the portion of the path
/// consumed by an unanchored path condition.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Path still to be routed.
    pub path: String,
    /// Path already consumed by enclosing mounts.
    pub script_name: String,
    /// URL scheme.
    pub scheme: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Parameters published by the matched route.
    pub params: Params,
    /// Prefix consumed by an unanchored path match.
    pub prefix: Option<String>,
}

impl Request {
    /// Creates a new request. A query string in `target` is split off and parsed.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        let target = target.into();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Self::parse_query_string(query)),
            None => (target, HashMap::new()),
        };
        Self {
            method,
            path,
            script_name: String::new(),
            scheme: "http".to_string(),
            headers: HashMap::new(),
            query,
            params: Params::new(),
            prefix: None,
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Creates a PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// Creates a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        let key_lower = key.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == key_lower)
            .map(|(_, v)| v.as_str())
    }

    /// Gets a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns the value a condition on `attribute` is matched against.
    ///
    /// A missing `Host` header reads as the empty string.
    pub fn attribute(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::PathInfo => &self.path,
            Attribute::RequestMethod => self.method.as_str(),
            Attribute::Host => self.get_header("Host").unwrap_or(""),
            Attribute::Scheme => &self.scheme,
        }
    }

    /// Parses query parameters from a query string.
    pub fn parse_query_string(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (urlencoding_decode(key), urlencoding_decode(value))
            })
            .collect()
    }
}

/// Simple URL decoding.
fn urlencoding_decode(s: &str) -> String {
    let mut bytes = Vec::with_capacity(s.len());
    let mut rest = s.as_bytes();

    while let Some((&b, tail)) = rest.split_first() {
        match b {
            b'%' if tail.len() >= 2 => {
                let decoded = std::str::from_utf8(&tail[..2])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = decoded {
                    bytes.push(byte);
                    rest = &tail[2..];
                    continue;
                }
                bytes.push(b'%');
            }
            b'+' => bytes.push(b' '),
            _ => bytes.push(b),
        }
        rest = tail;
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>().ok(), Some(Method::Get));
        assert_eq!("post".parse::<Method>().ok(), Some(Method::Post));
        assert!(matches!(
            "INVALID".parse::<Method>(),
            Err(RouterError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_method_serde() {
        let method: Method = serde_json::from_str("\"DELETE\"").unwrap();
        assert_eq!(method, Method::Delete);
        assert_eq!(serde_json::to_string(&Method::Patch).unwrap(), "\"PATCH\"");
    }

    #[test]
    fn test_params() {
        let mut params = Params::new();
        params.insert("id", "123");
        params.insert("name", "test");

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.parse::<i64>("id"), Some(123));
        assert_eq!(params.get("missing"), None);
        assert!(params.require("missing").is_err());
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_request_attributes() {
        let req = Request::put("/people/1")
            .header("host", "example.com")
            .scheme("https");

        assert_eq!(req.attribute(Attribute::PathInfo), "/people/1");
        assert_eq!(req.attribute(Attribute::RequestMethod), "PUT");
        assert_eq!(req.attribute(Attribute::Host), "example.com");
        assert_eq!(req.attribute(Attribute::Scheme), "https");
        assert_eq!(Request::get("/").attribute(Attribute::Host), "");
    }

    #[test]
    fn test_request_target_splits_query() {
        let req = Request::get("/search?q=rust+router&page=2");
        assert_eq!(req.path, "/search");
        assert_eq!(req.get_query("q"), Some("rust router"));
        assert_eq!(req.get_query("page"), Some("2"));
    }

    #[test]
    fn test_query_string_parsing() {
        let query = Request::parse_query_string("name=John+Doe&age=30&city=New%20York&flag");
        assert_eq!(query.get("name"), Some(&"John Doe".to_string()));
        assert_eq!(query.get("age"), Some(&"30".to_string()));
        assert_eq!(query.get("city"), Some(&"New York".to_string()));
        assert_eq!(query.get("flag"), Some(&String::new()));
    }
}
