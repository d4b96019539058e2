use http::Method;
use serde_json::json;
use wprouter::admin::AdminNamespace;
use wprouter::condition::ConditionRegistry;
use wprouter::dispatcher::{DispatchOutcome, Dispatcher};
use wprouter::route::{Handler, LiveRouteCollection, Route, RouteCollection};
use wprouter::router::{compile, Matcher};
use wprouter::RoutingRequest;

fn setup() -> (LiveRouteCollection, Matcher, Dispatcher) {
    let mut routes = LiveRouteCollection::new();
    routes
        .add(Route::new("list", "/items", &[Method::GET], Handler::parse("Items@index")).unwrap())
        .unwrap();
    routes
        .add(Route::new("store", "/items", &[Method::POST], Handler::parse("Items@store")).unwrap())
        .unwrap();
    let show = Handler::parse("Items@show");
    routes
        .add(Route::new("show", "/items/{id}/{format?}", &[Method::GET], show).unwrap())
        .unwrap()
        .default_value("format", "html")
        .default_value("layout", json!({"sidebar": true}));
    routes
        .add(Route::new("feed", "/items.rss", &[Method::GET], Handler::Delegate).unwrap())
        .unwrap();

    let matcher = Matcher::from_data(&compile(&routes).unwrap()).unwrap();
    let registry = ConditionRegistry::with_admin(&AdminNamespace::default());
    let dispatcher = Dispatcher::new(Box::new(registry));
    (routes, matcher, dispatcher)
}

fn dispatch(method: Method, path: &str) -> DispatchOutcome {
    let (routes, matcher, dispatcher) = setup();
    let request = RoutingRequest::new(method, path);
    dispatcher
        .dispatch(&matcher, &routes, &request, request.path())
        .unwrap()
}

#[test]
fn test_static_route_per_method() {
    let outcome = dispatch(Method::POST, "/items");
    assert_eq!(outcome.kind(), "MATCHED");
    assert_eq!(outcome.route_match().unwrap().name(), "store");
}

#[test]
fn test_scalar_defaults_fill_absent_placeholders() {
    let outcome = dispatch(Method::GET, "/items/3");
    let m = outcome.route_match().unwrap();
    assert_eq!(m.get_path_param("id"), Some("3"));
    assert_eq!(m.get_path_param("format"), Some("html"));

    let params = m.parameters();
    assert_eq!(params["format"], json!("html"));
    assert_eq!(params["layout"], json!({"sidebar": true}));
    assert_eq!(m.path_params_map().len(), 2);

    let outcome = dispatch(Method::GET, "/items/3/json");
    assert_eq!(outcome.route_match().unwrap().get_path_param("format"), Some("json"));
}

#[test]
fn test_delegated_outcome_carries_route() {
    let outcome = dispatch(Method::GET, "/items.rss");
    assert_eq!(outcome.kind(), "DELEGATED");
    assert!(outcome.route_match().unwrap().route.is_delegate());
}

#[test]
fn test_method_not_allowed_and_not_found() {
    match dispatch(Method::PUT, "/items") {
        DispatchOutcome::MethodNotAllowed(allowed) => {
            assert_eq!(allowed, vec![Method::GET, Method::POST]);
        }
        other => panic!("expected METHOD_NOT_ALLOWED, got {other:?}"),
    }
    assert_eq!(dispatch(Method::GET, "/nothing").kind(), "NOT_FOUND");
    assert_eq!(dispatch(Method::HEAD, "/items").kind(), "MATCHED");
}

#[test]
fn test_reset_forgets_resolved_conditions() {
    let (routes, matcher, dispatcher) = setup();
    let request = RoutingRequest::new(Method::GET, "/items");
    dispatcher.dispatch(&matcher, &routes, &request, "/items").unwrap();
    dispatcher.reset();
    assert_eq!(
        dispatcher
            .dispatch(&matcher, &routes, &request, "/items")
            .unwrap()
            .kind(),
        "MATCHED"
    );
}
