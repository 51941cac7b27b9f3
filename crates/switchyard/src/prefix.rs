//! Handler adapter for routes that match only a leading part of the path.

use std::fmt;

use futures::future::BoxFuture;
use tracing::trace;

use crate::request::Request;
use crate::response::Response;
use crate::route::Handler;

/// Wraps the handler of a route whose path condition is unanchored.
///
/// Before the handler runs, the prefix recorded by the route is moved from
/// the request path onto `script_name`, so a nested router sees only the
/// remainder. Without a recorded prefix the request passes through unchanged.
#[derive(Clone)]
pub struct Prefix {
    handler: Handler,
}

impl Prefix {
    /// Wraps `handler`.
    pub fn new(handler: Handler) -> Self {
        Self { handler }
    }

    /// Shifts the consumed prefix and invokes the wrapped handler.
    pub fn call(&self, mut request: Request) -> BoxFuture<'static, Response> {
        if let Some(prefix) = request.prefix.clone() {
            shift(&mut request, &prefix);
        }
        (self.handler)(request)
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefix").finish_non_exhaustive()
    }
}

fn shift(request: &mut Request, prefix: &str) {
    let remainder = request.path.strip_prefix(prefix).unwrap_or(&request.path);
    let mut path = normalize_path(remainder);
    if path == "/" {
        path.clear();
    }
    let mut script_name = normalize_path(&format!("{}{}", request.script_name, prefix));
    if script_name == "/" {
        script_name.clear();
    }

    trace!(%prefix, %script_name, path_info = %path, "shifted mount prefix");
    request.path = path;
    request.script_name = script_name;
}

/// Collapses repeated slashes, forces a leading slash and drops a trailing one.
fn normalize_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::handler;

    fn echo_paths() -> Handler {
        handler(|req: Request| async move {
            Response::text(format!("{}|{}", req.script_name, req.path))
        })
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("users"), "/users");
        assert_eq!(normalize_path("//users//1/"), "/users/1");
    }

    #[tokio::test]
    async fn test_shifts_prefix_into_script_name() {
        let mut req = Request::get("/admin/users/1");
        req.prefix = Some("/admin".to_string());

        let res = Prefix::new(echo_paths()).call(req).await;
        assert_eq!(res.body_string(), Some("/admin|/users/1".to_string()));
    }

    #[tokio::test]
    async fn test_full_consumption_leaves_empty_path() {
        let mut req = Request::get("/admin/");
        req.script_name = "/app".to_string();
        req.prefix = Some("/admin/".to_string());

        let res = Prefix::new(echo_paths()).call(req).await;
        assert_eq!(res.body_string(), Some("/app/admin|".to_string()));
    }

    #[tokio::test]
    async fn test_root_prefix_leaves_empty_script_name() {
        let mut req = Request::get("/users");
        req.prefix = Some("/".to_string());

        let res = Prefix::new(echo_paths()).call(req).await;
        assert_eq!(res.body_string(), Some("|/users".to_string()));
    }

    #[tokio::test]
    async fn test_passes_through_without_prefix() {
        let res = Prefix::new(echo_paths()).call(Request::get("/users")).await;
        assert_eq!(res.body_string(), Some("|/users".to_string()));
    }
}
