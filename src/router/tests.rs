use http::Method;

use super::*;
use crate::config::RouterConfig;
use crate::dispatcher::DispatchOutcome;
use crate::request::RoutingRequest;
use crate::route::{Handler, LiveRouteCollection, Route, RouteCollection};

fn add<'a>(routes: &'a mut LiveRouteCollection, name: &str, path: &str, methods: &[Method]) -> &'a mut Route {
    routes
        .add(Route::new(name, path, methods, Handler::parse("Controller@action")).unwrap())
        .unwrap()
}

fn names(candidates: impl Iterator<Item = Candidate>) -> Vec<String> {
    candidates.map(|c| c.name.to_string()).collect()
}

#[test]
fn test_compile_splits_static_and_dynamic() {
    let mut routes = LiveRouteCollection::new();
    add(&mut routes, "home", "/", &[Method::GET, Method::HEAD]);
    add(&mut routes, "post", "/posts/{slug}", &[Method::GET]);

    let data = compile(&routes).unwrap();
    assert_eq!(data.static_count(), 2);
    assert_eq!(data.dynamic_count(), 1);
    assert_eq!(data.static_routes["GET"]["/"], vec!["home".to_string()]);
    assert_eq!(
        data.dynamic_routes["GET"][0],
        DynamicRouteData {
            name: "post".to_string(),
            regex: "^/posts/(?P<__p0>[^/]+)$".to_string(),
            params: vec!["slug".to_string()],
        }
    );
}

#[test]
fn test_fallback_is_compiled_last() {
    let mut routes = LiveRouteCollection::new();
    add(&mut routes, "fallback", "/{path}", &[Method::GET])
        .requirement("path", ".+")
        .unwrap()
        .mark_fallback();
    add(&mut routes, "post", "/posts/{slug}", &[Method::GET]);

    let data = compile(&routes).unwrap();
    let order: Vec<&str> = data.dynamic_routes["GET"]
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(order, vec!["post", "fallback"]);

    let matcher = Matcher::from_data(&data).unwrap();
    assert_eq!(
        names(matcher.candidates("GET", "/posts/hello")),
        vec!["post", "fallback"]
    );
    assert_eq!(names(matcher.candidates("GET", "/anything/else")), vec!["fallback"]);
}

#[test]
fn test_candidates_static_first_then_registration_order() {
    let mut routes = LiveRouteCollection::new();
    add(&mut routes, "dynamic", "/users/{id}", &[Method::GET]);
    add(&mut routes, "numeric", "/users/{id}", &[Method::GET])
        .require_num("id")
        .unwrap();
    add(&mut routes, "me", "/users/me", &[Method::GET]);

    let matcher = Matcher::from_data(&compile(&routes).unwrap()).unwrap();
    assert_eq!(
        names(matcher.candidates("GET", "/users/me")),
        vec!["me", "dynamic"]
    );
    assert_eq!(
        names(matcher.candidates("GET", "/users/42")),
        vec!["dynamic", "numeric"]
    );
    assert_eq!(matcher.candidates("POST", "/users/42").count(), 0);
}

#[test]
fn test_optional_captures_are_omitted() {
    let mut routes = LiveRouteCollection::new();
    add(&mut routes, "archive", "/archive/{year}/{month?}", &[Method::GET]);
    let matcher = Matcher::from_data(&compile(&routes).unwrap()).unwrap();

    let full = matcher.candidates("GET", "/archive/2024/05").next().unwrap();
    assert_eq!(full.params.len(), 2);
    assert_eq!(full.params[1].1, "05");

    let short = matcher.candidates("GET", "/archive/2024").next().unwrap();
    assert_eq!(short.params.len(), 1);
    assert_eq!(&*short.params[0].0, "year");
    assert_eq!(short.params[0].1, "2024");
}

#[test]
fn test_captures_decode_escaped_separators() {
    let mut routes = LiveRouteCollection::new();
    add(&mut routes, "post", "/posts/{slug}", &[Method::GET]);
    let matcher = Matcher::from_data(&compile(&routes).unwrap()).unwrap();

    let hit = matcher.candidates("GET", "/posts/a b%2Fc%25d").next().unwrap();
    assert_eq!(hit.params[0].1, "a b/c%d");
    assert_eq!(matcher.candidates("GET", "/posts/a/c").count(), 0);
}

#[test]
fn test_allowed_methods_sorted() {
    let mut routes = LiveRouteCollection::new();
    add(&mut routes, "foo", "/foo", &[Method::POST, Method::GET]);
    add(&mut routes, "foo.id", "/foo/{id}", &[Method::PUT]);
    let matcher = Matcher::from_data(&compile(&routes).unwrap()).unwrap();

    assert_eq!(matcher.allowed_methods("/foo"), vec![Method::GET, Method::POST]);
    assert_eq!(matcher.allowed_methods("/foo/1"), vec![Method::PUT]);
    assert!(matcher.allowed_methods("/bar").is_empty());
}

#[test]
fn test_tampered_regex_is_rejected() {
    let mut data = MatcherData::default();
    data.dynamic_routes.insert(
        "GET".to_string(),
        vec![DynamicRouteData {
            name: "broken".to_string(),
            regex: "^/(unclosed$".to_string(),
            params: Vec::new(),
        }],
    );
    assert!(matches!(
        Matcher::from_data(&data),
        Err(RouterError::InvalidMatcher { .. })
    ));
}

#[test]
fn test_router_registers_and_dispatches() {
    let mut router = Router::new(&RouterConfig::default()).unwrap();
    router
        .routes(|r| {
            r.get("posts.show", "/posts/{slug}", "PostController@show")?;
            Ok(())
        })
        .unwrap();

    let outcome = router
        .dispatch(&RoutingRequest::new(Method::GET, "/posts/hello-world"))
        .unwrap();
    match outcome {
        DispatchOutcome::Matched(m) => {
            assert_eq!(m.name(), "posts.show");
            assert_eq!(m.get_path_param("slug"), Some("hello-world"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(!router.loaded_from_cache());
    assert!(!router.is_cached());
}

#[test]
fn test_registering_after_compile_recompiles() {
    let mut router = Router::new(&RouterConfig::default()).unwrap();
    router
        .routes(|r| {
            r.get("a", "/a", "A")?;
            Ok(())
        })
        .unwrap();
    assert_eq!(router.compile().unwrap().len(), 1);

    router
        .routes(|r| {
            r.get("b", "/b", "B")?;
            Ok(())
        })
        .unwrap();
    assert_eq!(router.compile().unwrap().len(), 2);
    assert!(matches!(
        router.dispatch(&RoutingRequest::new(Method::GET, "/b")).unwrap(),
        DispatchOutcome::Matched(_)
    ));
}

#[test]
fn test_registration_error_propagates() {
    let mut router = Router::new(&RouterConfig::default()).unwrap();
    let err = router
        .routes(|r| {
            r.get("broken", "/a/{b?}/{c}", "A")?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RouterError::Route(crate::route::RouteError::RequiredAfterOptional { .. })
    ));
}

#[test]
fn test_invalid_admin_prefix() {
    let config = RouterConfig {
        admin_prefix: "/wp-admin/".to_string(),
        ..RouterConfig::default()
    };
    assert!(matches!(
        Router::new(&config),
        Err(RouterError::Route(crate::route::RouteError::InvalidAdminPrefix { .. }))
    ));
}
