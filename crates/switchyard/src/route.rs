//! A single routing rule: conditions, defaults and a handler.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::condition::Condition;
use crate::error::{Result, RouterError};
use crate::path::PathPattern;
use crate::prefix::Prefix;
use crate::request::{Attribute, Params, Request};
use crate::response::Response;

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Boxes an async function into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| -> BoxFuture<'static, Response> { Box::pin(f(req)) })
}

/// The handler a route dispatches to, decided once at construction.
#[derive(Clone)]
pub enum Endpoint {
    /// Invoked with the request as routed.
    Direct(Handler),
    /// Invoked after the matched path prefix is shifted off.
    Prefix(Prefix),
}

impl Endpoint {
    /// Invokes the handler.
    pub fn call(&self, request: Request) -> BoxFuture<'static, Response> {
        match self {
            Self::Direct(handler) => handler(request),
            Self::Prefix(prefix) => prefix.call(request),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct"),
            Self::Prefix(prefix) => fmt::Debug::fmt(prefix, f),
        }
    }
}

/// Parameters and consumed prefix of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Defaults overridden by captured values.
    pub params: Params,
    /// Text consumed by an unanchored path condition.
    pub prefix: Option<String>,
}

/// Why a route did not match.
///
/// Lists the first failing attribute. When that is the request method, the
/// later conditions are checked too and any that fail follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    failed: Vec<Attribute>,
}

impl Mismatch {
    /// Returns the failed attributes, in route order.
    pub fn failed(&self) -> &[Attribute] {
        &self.failed
    }

    /// Returns true if only the request method kept the route from matching.
    pub fn method_only(&self) -> bool {
        self.failed == [Attribute::RequestMethod]
    }
}

/// Result of offering a request to a route.
pub enum Outcome {
    /// The route matched; the handler's response is pending.
    Dispatched(BoxFuture<'static, Response>),
    /// The route did not match. The request is handed back untouched.
    ExpectationFailed {
        /// The request, for the next route to try.
        request: Request,
        /// Which conditions failed.
        mismatch: Mismatch,
    },
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatched(_) => f.write_str("Dispatched"),
            Self::ExpectationFailed { mismatch, .. } => f
                .debug_struct("ExpectationFailed")
                .field("mismatch", mismatch)
                .finish_non_exhaustive(),
        }
    }
}

/// A single routing rule.
#[derive(Debug, Clone)]
pub struct Route {
    name: Option<String>,
    conditions: Vec<Condition>,
    defaults: Params,
    endpoint: Endpoint,
    keys: BTreeSet<String>,
    template: Option<PathPattern>,
}

impl Route {
    /// Creates a route.
    ///
    /// `valid_conditions` are the attributes the owning route set recognizes;
    /// a condition on any other attribute, or two conditions on the same one,
    /// is rejected. An unanchored path condition wraps `handler` in [`Prefix`].
    pub fn new(
        conditions: Vec<Condition>,
        defaults: Params,
        handler: Handler,
        valid_conditions: &[Attribute],
    ) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for condition in &conditions {
            let attribute = condition.attribute();
            if !valid_conditions.contains(&attribute) {
                return Err(RouterError::UnsupportedCondition(attribute));
            }
            if !seen.insert(attribute) {
                return Err(RouterError::DuplicateCondition(attribute));
            }
        }

        let consumes_prefix = conditions
            .iter()
            .any(|c| c.attribute() == Attribute::PathInfo && !c.anchored());
        let endpoint = if consumes_prefix {
            Endpoint::Prefix(Prefix::new(handler))
        } else {
            Endpoint::Direct(handler)
        };

        let keys = generate_keys(&conditions, valid_conditions);

        Ok(Self {
            name: None,
            conditions,
            defaults,
            endpoint,
            keys,
            template: None,
        })
    }

    /// Sets the route name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the pattern used to generate paths for this route.
    #[must_use]
    pub fn with_template(mut self, template: PathPattern) -> Self {
        self.template = Some(template);
        self
    }

    /// Returns the route name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the conditions in evaluation order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns the default parameters.
    pub fn defaults(&self) -> &Params {
        &self.defaults
    }

    /// Returns the generation template, if any.
    pub fn template(&self) -> Option<&PathPattern> {
        self.template.as_ref()
    }

    /// Returns every parameter name this route's conditions can capture.
    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    /// Returns the endpoint the route dispatches to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Evaluates the conditions against `request` without side effects.
    ///
    /// Captured values override defaults; a capture group that did not take
    /// part in the match leaves the default in place, while an empty capture
    /// still counts.
    pub fn recognize(&self, request: &Request) -> std::result::Result<RouteMatch, Mismatch> {
        let mut routing_args = self.defaults.clone();
        let mut prefix = None;

        for (position, condition) in self.conditions.iter().enumerate() {
            let value = request.attribute(condition.attribute());
            let Some(caps) = condition.captures(value) else {
                return Err(self.mismatch(request, position));
            };

            for (index, name) in condition.named_captures() {
                if let Some(m) = caps.get(*index) {
                    routing_args.insert(name.as_str(), m.as_str());
                }
            }

            if condition.attribute() == Attribute::PathInfo && !condition.anchored() {
                prefix = caps.get(0).map(|m| m.as_str().to_string());
            }
        }

        Ok(RouteMatch {
            params: routing_args,
            prefix,
        })
    }

    /// Publishes a match into `request` and invokes the handler.
    pub fn dispatch(
        &self,
        mut request: Request,
        matched: RouteMatch,
    ) -> BoxFuture<'static, Response> {
        request.params = matched.params;
        request.prefix = matched.prefix;
        self.endpoint.call(request)
    }

    /// Matches `request` and dispatches it, or hands it back on mismatch.
    pub fn call(&self, request: Request) -> Outcome {
        match self.recognize(&request) {
            Ok(matched) => Outcome::Dispatched(self.dispatch(request, matched)),
            Err(mismatch) => Outcome::ExpectationFailed { request, mismatch },
        }
    }

    /// Renders a path for this route, or `None` if `params` do not fit it.
    ///
    /// A supplied value for a default that the route cannot capture must
    /// equal that default.
    pub fn generate(&self, params: &Params) -> Option<String> {
        let template = self.template.as_ref()?;

        let conflicts = self.defaults.iter().any(|(key, default)| {
            !self.keys.contains(key) && params.get(key).is_some_and(|v| v != default)
        });
        if conflicts {
            return None;
        }

        template.generate(params, &self.defaults)
    }

    /// Builds a mismatch from the first failed condition. Only a method
    /// failure checks the rest, to tell "method not allowed" from "not found".
    fn mismatch(&self, request: &Request, first_failed: usize) -> Mismatch {
        let first = self.conditions[first_failed].attribute();
        let mut failed = vec![first];
        if first == Attribute::RequestMethod {
            failed.extend(
                self.conditions[first_failed + 1..]
                    .iter()
                    .filter(|c| !c.is_match(request.attribute(c.attribute())))
                    .map(Condition::attribute),
            );
        }
        Mismatch { failed }
    }
}

fn generate_keys(conditions: &[Condition], valid_conditions: &[Attribute]) -> BTreeSet<String> {
    valid_conditions
        .iter()
        .filter_map(|attribute| conditions.iter().find(|c| c.attribute() == *attribute))
        .flat_map(|condition| condition.keys().map(str::to_string))
        .collect()
}
