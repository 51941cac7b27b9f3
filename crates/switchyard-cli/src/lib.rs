//! Support code for the `switchyard` command-line tool.

use std::path::Path;

use anyhow::{bail, Context};
use switchyard::{handler, Attribute, Params, Request, Response, Route, RouteSet, RoutesConfig};
use tracing::info;

/// Loads a JSON route table whose routes all echo their parameters.
pub fn load_routes(path: &Path) -> anyhow::Result<RouteSet> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading route table {}", path.display()))?;
    let config = RoutesConfig::from_json(&json)
        .with_context(|| format!("parsing route table {}", path.display()))?;

    let routes = config.build(handler(|req: Request| async move { Response::json(&req.params) }))?;
    info!(count = routes.routes().len(), path = %path.display(), "loaded routes");
    Ok(routes)
}

/// Dispatches `request` and returns the parameters the matched route saw.
pub async fn recognize(routes: &RouteSet, request: Request) -> anyhow::Result<Params> {
    let target = format!("{} {}", request.method, request.path);
    let response = routes.call(request).await;
    if response.status != 200 {
        bail!(
            "{target}: {}",
            response.body_string().unwrap_or_else(|| response.status.to_string())
        );
    }
    Ok(serde_json::from_slice(&response.body)?)
}

/// Parses a `key=value` command-line pair.
pub fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

/// Renders one route as a listing line.
pub fn format_route(route: &Route) -> String {
    let conditions: Vec<String> = route
        .conditions()
        .iter()
        .filter(|c| route.template().is_none() || c.attribute() != Attribute::PathInfo)
        .map(|c| format!("{}={}", c.attribute(), c.pattern()))
        .collect();
    let keys: Vec<&str> = route.keys().iter().map(String::as_str).collect();

    format!(
        "{:<14} {:<32} {:<28} [{}]",
        route.name().unwrap_or("-"),
        route.template().map_or("-", |t| t.pattern()),
        conditions.join(" "),
        keys.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn table() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "resources": [{{ "plural": "people", "singular": "person" }}],
                "routes": [{{ "path": "/:controller(/:action)", "defaults": {{ "action": "index" }} }}]
            }}"#
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_and_recognize() {
        let file = table();
        let routes = load_routes(file.path()).unwrap();

        let params = recognize(&routes, Request::get("/people/1")).await.unwrap();
        assert_eq!(params.get("action"), Some("show"));
        assert_eq!(params.get("id"), Some("1"));

        let params = recognize(&routes, Request::get("/posts")).await.unwrap();
        assert_eq!(params.get("controller"), Some("posts"));
        assert_eq!(params.get("action"), Some("index"));
    }

    #[tokio::test]
    async fn test_recognize_reports_method_not_allowed() {
        let mut routes = RouteSet::new();
        routes
            .resources("people", "person", handler(|_req: Request| async move { Response::ok() }))
            .unwrap();

        let err = recognize(&routes, Request::post("/people/1")).await.unwrap_err();
        assert!(err.to_string().contains("Method Not Allowed"));
    }

    #[test]
    fn test_missing_table() {
        let err = load_routes(Path::new("/nonexistent/routes.json")).unwrap_err();
        assert!(err.to_string().contains("reading route table"));
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("id=1"), Ok(("id".to_string(), "1".to_string())));
        assert_eq!(parse_pair("q=a=b"), Ok(("q".to_string(), "a=b".to_string())));
        assert!(parse_pair("id").is_err());
    }

    #[test]
    fn test_format_route() {
        let file = table();
        let routes = load_routes(file.path()).unwrap();
        let line = format_route(&routes.routes()[4]);
        assert!(line.starts_with("person"));
        assert!(line.contains("/people/:id"));
        assert!(line.contains("request_method=GET"));
        assert!(line.ends_with("[id]"));
    }
}
