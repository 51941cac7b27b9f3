//! # switchyard
//!
//! Condition-based request routing.
//!
//! This crate provides:
//! - Routes built from per-attribute conditions (path, method, host, scheme)
//! - Named-capture extraction merged over route defaults
//! - Prefix routes that hand the rest of the path to a mounted route set
//! - 404 / 405 distinction across a whole route set
//! - Path generation from route names or parameters
//!
//! ## Quick Start
//!
//! ```ignore
//! use switchyard::{handler, Mapping, Method, Request, Response, RouteSet};
//!
//! let show = handler(|req: Request| async move {
//!     Response::json(&req.params)
//! });
//!
//! let mut routes = RouteSet::new();
//! routes.connect(
//!     Mapping::new("/people/:id")
//!         .method(Method::Get)
//!         .default("controller", "people")
//!         .default("action", "show")
//!         .name("person"),
//!     show,
//! )?;
//!
//! // Handle a request; `req.params` is {controller, action, id}
//! let response = routes.call(Request::get("/people/1")).await;
//! ```
//!
//! ## Conditions
//!
//! A [`Route`] holds at most one [`Condition`] per [`Attribute`]. Anchored
//! conditions must match the whole value; unanchored ones match a prefix.
//!
//! ```ignore
//! let path = Condition::new(Attribute::PathInfo, r"/(?P<year>\d{4})", true)?;
//! let verb = Condition::exact(Attribute::RequestMethod, "GET")?;
//! routes.add_route(vec![path, verb], Params::new(), archive)?;
//! ```
//!
//! ## Mounting
//!
//! ```ignore
//! let mut admin = RouteSet::new();
//! admin.resources("users", "user", users)?;
//!
//! // `/admin/users/1` reaches `admin` as `/users/1`, script name `/admin`
//! routes.mount("/admin", admin)?;
//! ```
//!
//! ## Generation
//!
//! ```ignore
//! let params: Params = [("id", "1")].into_iter().collect();
//! assert_eq!(routes.generate(Some("person"), &params)?, "/people/1");
//! ```

mod condition;
mod config;
mod error;
mod path;
mod prefix;
mod request;
mod response;
mod route;
mod router;

pub use condition::Condition;
pub use config::{ResourceConfig, RouteConfig, RoutesConfig};
pub use error::{Result, RouterError};
pub use path::PathPattern;
pub use prefix::Prefix;
pub use request::{Attribute, Method, Params, Request};
pub use response::Response;
pub use route::{handler, Endpoint, Handler, Mismatch, Outcome, Route, RouteMatch};
pub use router::{Mapping, RouteSet};
