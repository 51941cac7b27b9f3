//! Ordered route sets: recognition, dispatch and path generation.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use tracing::{debug, trace};

use crate::condition::Condition;
use crate::error::{Result, RouterError};
use crate::path::PathPattern;
use crate::request::{Attribute, Method, Params, Request};
use crate::response::Response;
use crate::route::{handler, Handler, Outcome, Route};

/// Describes a route built from a path pattern.
#[derive(Debug, Clone)]
pub struct Mapping {
    path: String,
    name: Option<String>,
    method: Option<Method>,
    host: Option<String>,
    defaults: Params,
    requirements: HashMap<String, String>,
    anchored: bool,
}

impl Mapping {
    /// Creates a mapping for `path`, matching the whole path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            method: None,
            host: None,
            defaults: Params::new(),
            requirements: HashMap::new(),
            anchored: true,
        }
    }

    /// Names the route for generation.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restricts the route to one request method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Restricts the route to one host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Adds a default parameter.
    #[must_use]
    pub fn default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key, value);
        self
    }

    /// Adds defaults from a parameter map.
    #[must_use]
    pub fn defaults(mut self, defaults: &Params) -> Self {
        for (key, value) in defaults.iter() {
            self.defaults.insert(key, value);
        }
        self
    }

    /// Constrains a path parameter by regex.
    #[must_use]
    pub fn requirement(mut self, key: impl Into<String>, regex: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), regex.into());
        self
    }

    /// Matches the path pattern as a prefix; the rest is left for the handler.
    #[must_use]
    pub fn prefix(mut self) -> Self {
        self.anchored = false;
        self
    }
}

/// An ordered collection of routes, tried in registration order.
#[derive(Debug)]
pub struct RouteSet {
    routes: Vec<Route>,
    valid_conditions: Vec<Attribute>,
}

impl Default for RouteSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSet {
    /// Creates an empty set accepting conditions on every attribute.
    pub fn new() -> Self {
        Self::with_valid_conditions(Attribute::ALL)
    }

    /// Creates an empty set accepting conditions only on `attributes`.
    pub fn with_valid_conditions(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        Self {
            routes: Vec::new(),
            valid_conditions: attributes.into_iter().collect(),
        }
    }

    /// Returns the attributes routes in this set may test.
    pub fn valid_conditions(&self) -> &[Attribute] {
        &self.valid_conditions
    }

    /// Returns the routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Adds a route built from raw conditions.
    pub fn add_route(
        &mut self,
        conditions: Vec<Condition>,
        defaults: Params,
        handler: Handler,
    ) -> Result<&Route> {
        let route = Route::new(conditions, defaults, handler, &self.valid_conditions)?;
        Ok(self.push(route))
    }

    /// Adds a named route built from raw conditions.
    pub fn add_named_route(
        &mut self,
        name: &str,
        conditions: Vec<Condition>,
        defaults: Params,
        handler: Handler,
    ) -> Result<&Route> {
        let route =
            Route::new(conditions, defaults, handler, &self.valid_conditions)?.with_name(name);
        Ok(self.push(route))
    }

    /// Adds a route from a path-pattern mapping.
    ///
    /// The path condition is evaluated first, then method, then host.
    pub fn connect(&mut self, mapping: Mapping, handler: Handler) -> Result<&Route> {
        let pattern = PathPattern::with_requirements(&mapping.path, &mapping.requirements)?;

        let mut conditions = vec![if mapping.anchored {
            pattern.condition()?
        } else {
            pattern.prefix_condition()?
        }];
        if let Some(method) = mapping.method {
            conditions.push(Condition::exact(Attribute::RequestMethod, method.as_str())?);
        }
        if let Some(host) = &mapping.host {
            conditions.push(Condition::exact(Attribute::Host, host)?);
        }

        let mut route = Route::new(conditions, mapping.defaults, handler, &self.valid_conditions)?
            .with_template(pattern);
        if let Some(name) = mapping.name {
            route = route.with_name(name);
        }
        Ok(self.push(route))
    }

    /// Mounts `nested` under `path`; it routes on the remainder of the path.
    pub fn mount(&mut self, path: &str, nested: Self) -> Result<&Route> {
        self.connect(Mapping::new(path).prefix(), nested.into_handler())
    }

    /// Adds the seven RESTful routes for a resource.
    ///
    /// Routes are named `plural` (index), `new_singular`, `edit_singular`
    /// and `singular` (show); every route defaults `controller` to `plural`.
    pub fn resources(&mut self, plural: &str, singular: &str, handler: Handler) -> Result<()> {
        let collection = format!("/{plural}");
        let member = format!("{collection}/:id");

        let actions = [
            (Some(plural.to_string()), Method::Get, collection.clone(), "index"),
            (None, Method::Post, collection.clone(), "create"),
            (Some(format!("new_{singular}")), Method::Get, format!("{collection}/new"), "new"),
            (Some(format!("edit_{singular}")), Method::Get, format!("{member}/edit"), "edit"),
            (Some(singular.to_string()), Method::Get, member.clone(), "show"),
            (None, Method::Put, member.clone(), "update"),
            (None, Method::Delete, member, "destroy"),
        ];

        for (name, method, path, action) in actions {
            let mut mapping = Mapping::new(path)
                .method(method)
                .default("controller", plural)
                .default("action", action);
            if let Some(name) = name {
                mapping = mapping.name(name);
            }
            self.connect(mapping, Arc::clone(&handler))?;
        }
        Ok(())
    }

    /// Finds the first route matching `request` without dispatching.
    ///
    /// Mounted sets are not descended into; the mount route itself matches.
    pub fn recognize(&self, request: &Request) -> Result<(&Route, Params)> {
        let mut method_not_allowed = false;

        for route in &self.routes {
            match route.recognize(request) {
                Ok(matched) => return Ok((route, matched.params)),
                Err(mismatch) => method_not_allowed |= mismatch.method_only(),
            }
        }

        Err(no_match(request, method_not_allowed))
    }

    /// Dispatches `request` to the first matching route.
    ///
    /// Yields 405 when some route failed only on its method condition,
    /// 404 otherwise.
    pub fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        debug!(method = %request.method, path = %request.path, "routing request");

        let mut request = request;
        let mut method_not_allowed = false;

        for route in &self.routes {
            match route.call(request) {
                Outcome::Dispatched(response) => {
                    debug!(route = route.name().unwrap_or("-"), "route matched");
                    return response;
                }
                Outcome::ExpectationFailed {
                    request: returned,
                    mismatch,
                } => {
                    trace!(
                        route = route.name().unwrap_or("-"),
                        failed = ?mismatch.failed(),
                        "route expectation failed"
                    );
                    method_not_allowed |= mismatch.method_only();
                    request = returned;
                }
            }
        }

        let err = no_match(&request, method_not_allowed);
        debug!(error = %err, "no route matched");
        let response = match err {
            RouterError::MethodNotAllowed { .. } => Response::method_not_allowed(),
            _ => Response::not_found(),
        };
        Box::pin(future::ready(response))
    }

    /// Generates a path from `params`.
    ///
    /// With a `name`, only that route is considered; otherwise the first
    /// route able to render the parameters wins.
    pub fn generate(&self, name: Option<&str>, params: &Params) -> Result<String> {
        match name {
            Some(name) => {
                let route = self
                    .routes
                    .iter()
                    .find(|route| route.name() == Some(name))
                    .ok_or_else(|| RouterError::RouteNotFound(name.to_string()))?;
                route
                    .generate(params)
                    .ok_or_else(|| RouterError::GenerationFailed(format!("route '{name}'")))
            }
            None => self
                .routes
                .iter()
                .find_map(|route| route.generate(params))
                .ok_or_else(|| RouterError::GenerationFailed(describe(params))),
        }
    }

    /// Wraps the set in a [`Handler`] so it can be mounted in another set.
    pub fn into_handler(self) -> Handler {
        let set = Arc::new(self);
        handler(move |request| {
            let set = Arc::clone(&set);
            async move { set.call(request).await }
        })
    }

    fn push(&mut self, route: Route) -> &Route {
        let index = self.routes.len();
        self.routes.push(route);
        &self.routes[index]
    }
}

fn no_match(request: &Request, method_not_allowed: bool) -> RouterError {
    let method = request.method.to_string();
    let path = request.path.clone();
    if method_not_allowed {
        RouterError::MethodNotAllowed { method, path }
    } else {
        RouterError::NotFound { method, path }
    }
}

fn describe(params: &Params) -> String {
    let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    format!("{{{}}}", pairs.join(", "))
}
