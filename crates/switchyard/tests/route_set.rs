//! Recognition and generation over a conventional route table:
//! RESTful `people` routes followed by a catch-all
//! `/:controller(/:action(/:id))` route.

use switchyard::{
    handler, Attribute, Condition, Handler, Mapping, Method, Params, Request, Response,
    RouteSet, RouterError,
};

fn echo_params() -> Handler {
    handler(|req: Request| async move { Response::json(&req.params) })
}

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs.iter().copied().collect()
}

fn routes() -> RouteSet {
    let mut set = RouteSet::new();
    set.resources("people", "person", echo_params()).unwrap();
    set.connect(
        Mapping::new("/:controller(/:action(/:id))").default("action", "index"),
        echo_params(),
    )
    .unwrap();
    set
}

fn recognize(set: &RouteSet, method: Method, path: &str) -> Params {
    set.recognize(&Request::new(method, path)).unwrap().1
}

// =============================================================================
// Recognition
// =============================================================================

#[test]
fn test_recognize_resource_collection() {
    let set = routes();
    assert_eq!(
        recognize(&set, Method::Get, "/people"),
        params(&[("controller", "people"), ("action", "index")])
    );
    assert_eq!(
        recognize(&set, Method::Post, "/people"),
        params(&[("controller", "people"), ("action", "create")])
    );
    assert_eq!(
        recognize(&set, Method::Get, "/people/new"),
        params(&[("controller", "people"), ("action", "new")])
    );
}

#[test]
fn test_recognize_resource_member() {
    let set = routes();
    assert_eq!(
        recognize(&set, Method::Get, "/people/1"),
        params(&[("controller", "people"), ("action", "show"), ("id", "1")])
    );
    assert_eq!(
        recognize(&set, Method::Put, "/people/1"),
        params(&[("controller", "people"), ("action", "update"), ("id", "1")])
    );
    assert_eq!(
        recognize(&set, Method::Delete, "/people/1"),
        params(&[("controller", "people"), ("action", "destroy"), ("id", "1")])
    );
    assert_eq!(
        recognize(&set, Method::Get, "/people/1/edit"),
        params(&[("controller", "people"), ("action", "edit"), ("id", "1")])
    );
}

#[test]
fn test_recognize_catch_all() {
    let set = routes();
    assert_eq!(
        recognize(&set, Method::Get, "/posts"),
        params(&[("controller", "posts"), ("action", "index")])
    );
    assert_eq!(
        recognize(&set, Method::Get, "/posts/index"),
        params(&[("controller", "posts"), ("action", "index")])
    );
    assert_eq!(
        recognize(&set, Method::Get, "/posts/show"),
        params(&[("controller", "posts"), ("action", "show")])
    );
    assert_eq!(
        recognize(&set, Method::Get, "/posts/show/1"),
        params(&[("controller", "posts"), ("action", "show"), ("id", "1")])
    );
}

#[test]
fn test_method_not_allowed_vs_not_found() {
    let mut set = RouteSet::new();
    set.resources("people", "person", echo_params()).unwrap();

    for (method, path) in [
        (Method::Put, "/people"),
        (Method::Delete, "/people"),
        (Method::Post, "/people/new"),
        (Method::Post, "/people/1"),
        (Method::Post, "/people/1/edit"),
    ] {
        assert!(
            matches!(
                set.recognize(&Request::new(method, path)),
                Err(RouterError::MethodNotAllowed { .. })
            ),
            "{method} {path} should be method-not-allowed"
        );
    }

    assert!(matches!(
        set.recognize(&Request::get("/nobody/here/at/all")),
        Err(RouterError::NotFound { .. })
    ));
}

#[test]
fn test_failed_routes_leave_defaults_alone() {
    let set = routes();
    let before: Vec<Params> = set.routes().iter().map(|r| r.defaults().clone()).collect();

    let _ = set.recognize(&Request::get("/posts/show/1"));
    let _ = set.recognize(&Request::new(Method::Patch, "/people/1"));

    let after: Vec<Params> = set.routes().iter().map(|r| r.defaults().clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_keys() {
    let set = routes();
    let keys = |name: &str| -> Vec<String> {
        set.routes()
            .iter()
            .find(|r| r.name() == Some(name))
            .map(|r| r.keys().iter().cloned().collect())
            .unwrap()
    };
    assert!(keys("people").is_empty());
    assert_eq!(keys("person"), vec!["id"]);
    assert_eq!(keys("edit_person"), vec!["id"]);

    let catch_all = set.routes().last().unwrap();
    let all: Vec<_> = catch_all.keys().iter().map(String::as_str).collect();
    assert_eq!(all, vec!["action", "controller", "id"]);
}

// =============================================================================
// Generation
// =============================================================================

#[test]
fn test_generate_by_name() {
    let set = routes();
    assert_eq!(set.generate(Some("people"), &Params::new()).unwrap(), "/people");
    assert_eq!(
        set.generate(Some("new_person"), &Params::new()).unwrap(),
        "/people/new"
    );
    assert_eq!(
        set.generate(Some("person"), &params(&[("id", "1")])).unwrap(),
        "/people/1"
    );
    assert_eq!(
        set.generate(Some("edit_person"), &params(&[("id", "1")])).unwrap(),
        "/people/1/edit"
    );
}

#[test]
fn test_generate_by_params() {
    let set = routes();
    assert_eq!(
        set.generate(None, &params(&[("controller", "people")])).unwrap(),
        "/people"
    );
    assert_eq!(
        set.generate(None, &params(&[("controller", "people"), ("action", "index")]))
            .unwrap(),
        "/people"
    );
    assert_eq!(
        set.generate(None, &params(&[("controller", "people"), ("action", "new")]))
            .unwrap(),
        "/people/new"
    );
    assert_eq!(
        set.generate(
            None,
            &params(&[("controller", "people"), ("action", "show"), ("id", "1")])
        )
        .unwrap(),
        "/people/1"
    );
    assert_eq!(
        set.generate(
            None,
            &params(&[("controller", "people"), ("action", "edit"), ("id", "1")])
        )
        .unwrap(),
        "/people/1/edit"
    );
}

#[test]
fn test_generate_catch_all() {
    let set = routes();
    assert_eq!(
        set.generate(
            None,
            &params(&[("controller", "posts"), ("action", "show"), ("id", "1")])
        )
        .unwrap(),
        "/posts/show/1"
    );
    assert_eq!(
        set.generate(None, &params(&[("controller", "posts"), ("action", "index")]))
            .unwrap(),
        "/posts"
    );
}

#[test]
fn test_generate_keeps_supplied_nested_key() {
    let mut set = RouteSet::new();
    set.connect(
        Mapping::new("/:controller(/:action(/:id))").name("catch_all"),
        echo_params(),
    )
    .unwrap();

    let supplied = params(&[("controller", "posts"), ("id", "1")]);
    assert!(matches!(
        set.generate(Some("catch_all"), &supplied),
        Err(RouterError::GenerationFailed(_))
    ));

    let supplied = params(&[("controller", "posts"), ("action", "show"), ("id", "1")]);
    let path = set.generate(Some("catch_all"), &supplied).unwrap();
    assert_eq!(path, "/posts/show/1");
    assert_eq!(recognize(&set, Method::Get, &path), supplied);
}

#[test]
fn test_generate_missing_required_key() {
    let set = routes();
    assert!(matches!(
        set.generate(Some("person"), &Params::new()),
        Err(RouterError::GenerationFailed(_))
    ));
}

// =============================================================================
// Dispatch
// =============================================================================

#[tokio::test]
async fn test_dispatch_end_to_end() {
    let mut set = RouteSet::new();
    let path = Condition::new(Attribute::PathInfo, r"/people/(?P<id>[^/]+)", true).unwrap();
    let verb = Condition::exact(Attribute::RequestMethod, "GET").unwrap();
    set.add_route(
        vec![path, verb],
        params(&[("controller", "people"), ("action", "show")]),
        echo_params(),
    )
    .unwrap();

    let res = set.call(Request::get("/people/1")).await;
    assert_eq!(res.status, 200);
    let got: Params = serde_json::from_slice(&res.body).unwrap();
    assert_eq!(
        got,
        params(&[("controller", "people"), ("action", "show"), ("id", "1")])
    );

    let res = set.call(Request::post("/people/1")).await;
    assert_eq!(res.status, 405);
}

#[tokio::test]
async fn test_nested_mounts() {
    let mut users = RouteSet::new();
    users
        .connect(
            Mapping::new("/:id").method(Method::Get),
            handler(|req: Request| async move {
                Response::text(format!(
                    "{} {} {}",
                    req.script_name,
                    req.path,
                    req.params.get("id").unwrap_or("-")
                ))
            }),
        )
        .unwrap();

    let mut api = RouteSet::new();
    api.mount("/users", users).unwrap();

    let mut set = RouteSet::new();
    set.mount("/api", api).unwrap();

    let res = set.call(Request::get("/api/users/42")).await;
    assert_eq!(res.body_string(), Some("/api/users /42 42".to_string()));

    let res = set.call(Request::get("/api/teams/42")).await;
    assert_eq!(res.status, 404);
}
