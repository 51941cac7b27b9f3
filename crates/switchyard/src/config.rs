//! Route tables loaded from JSON.
//!
//! ```json
//! {
//!   "resources": [{ "plural": "people", "singular": "person" }],
//!   "routes": [
//!     { "name": "archive", "path": "/archive/:year", "method": "GET",
//!       "defaults": { "controller": "posts" },
//!       "requirements": { "year": "\\d{4}" } }
//!   ]
//! }
//! ```
//!
//! Resources are registered before plain routes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::request::{Method, Params};
use crate::route::Handler;
use crate::router::{Mapping, RouteSet};

fn default_anchored() -> bool {
    true
}

/// One route described by a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Route name for generation.
    #[serde(default)]
    pub name: Option<String>,
    /// Path pattern, e.g. `/people/:id`.
    pub path: String,
    /// Request method the route is restricted to.
    #[serde(default)]
    pub method: Option<Method>,
    /// Host the route is restricted to.
    #[serde(default)]
    pub host: Option<String>,
    /// Whether the pattern must match the whole path.
    #[serde(default = "default_anchored")]
    pub anchored: bool,
    /// Default parameters.
    #[serde(default)]
    pub defaults: Params,
    /// Regex requirements per path parameter.
    #[serde(default)]
    pub requirements: HashMap<String, String>,
}

impl RouteConfig {
    fn mapping(&self) -> Mapping {
        let mut mapping = Mapping::new(&self.path).defaults(&self.defaults);
        if let Some(name) = &self.name {
            mapping = mapping.name(name);
        }
        if let Some(method) = self.method {
            mapping = mapping.method(method);
        }
        if let Some(host) = &self.host {
            mapping = mapping.host(host);
        }
        for (key, regex) in &self.requirements {
            mapping = mapping.requirement(key, regex);
        }
        if !self.anchored {
            mapping = mapping.prefix();
        }
        mapping
    }
}

/// A RESTful resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Collection name, also the controller.
    pub plural: String,
    /// Member name used in route names.
    pub singular: String,
}

/// A complete route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Resources, expanded first.
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
    /// Plain routes, in recognition order.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl RoutesConfig {
    /// Parses a route table from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds a route set dispatching every route to `handler`.
    pub fn build(&self, handler: Handler) -> Result<RouteSet> {
        let mut set = RouteSet::new();
        for resource in &self.resources {
            set.resources(&resource.plural, &resource.singular, Arc::clone(&handler))?;
        }
        for route in &self.routes {
            set.connect(route.mapping(), Arc::clone(&handler))?;
        }
        Ok(set)
    }
}
