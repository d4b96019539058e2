use http::Method;
use serde_json::{json, Value};

use super::*;
use crate::admin::AdminNamespace;
use crate::request::RoutingRequest;

#[derive(Debug)]
struct QueryEquals {
    key: String,
    value: String,
}

impl RouteCondition for QueryEquals {
    fn is_satisfied(&self, request: &RoutingRequest) -> bool {
        request.query_param(&self.key) == Some(self.value.as_str())
    }

    fn arguments(&self, request: &RoutingRequest) -> Vec<Value> {
        request
            .query_param(&self.key)
            .map(|v| vec![Value::String(v.to_string())])
            .unwrap_or_default()
    }
}

fn registry() -> ConditionRegistry {
    let mut registry = ConditionRegistry::with_admin(&AdminNamespace::default());
    registry.register("query_equals", |args| match args {
        [Value::String(key), Value::String(value)] => Ok(Box::new(QueryEquals {
            key: key.clone(),
            value: value.clone(),
        }) as Box<dyn RouteCondition>),
        _ => Err(ResolutionError::InvalidArguments {
            class: "query_equals".to_string(),
            reason: "expected [key, value]".to_string(),
        }),
    });
    registry
}

#[test]
fn test_admin_condition() {
    let registry = registry();
    let condition = build_condition(
        &registry,
        &ConditionBlueprint::new(IS_ADMIN_DASHBOARD_REQUEST),
    )
    .unwrap();
    let dashboard = RoutingRequest::new(Method::GET, "/wp-admin/admin.php?page=x");
    assert!(condition.is_satisfied(&dashboard));
    assert!(!condition.is_satisfied(&RoutingRequest::new(Method::GET, "/x")));
    assert!(condition
        .arguments(&RoutingRequest::new(Method::GET, "/wp-admin/admin.php"))
        .is_empty());
}

#[test]
fn test_admin_area_path_ignores_loading_script() {
    let registry = registry();
    let outside = build_condition(
        &registry,
        &ConditionBlueprint::new(IS_ADMIN_AREA_PATH).negate(),
    )
    .unwrap();
    let edit =
        RoutingRequest::new(Method::GET, "/wp-admin/edit.php").with_loading_script("/index.php");
    assert!(!outside.is_satisfied(&edit));
    assert!(outside.is_satisfied(&RoutingRequest::new(Method::GET, "/blog/post")));
    assert!(build_condition(
        &registry,
        &ConditionBlueprint::new(IS_ADMIN_AREA_PATH).with_args(vec![json!(1)])
    )
    .is_err());
}

#[test]
fn test_negate_flips_result_but_keeps_arguments() {
    let registry = registry();
    let blueprint = ConditionBlueprint::new("query_equals")
        .with_args(vec![json!("mode"), json!("print")])
        .negate();
    let condition = build_condition(&registry, &blueprint).unwrap();

    let print = RoutingRequest::new(Method::GET, "/doc?mode=print");
    let screen = RoutingRequest::new(Method::GET, "/doc?mode=screen");
    assert!(!condition.is_satisfied(&print));
    assert!(condition.is_satisfied(&screen));
    assert_eq!(condition.arguments(&screen), vec![json!("screen")]);
}

#[test]
fn test_double_negation_cancels() {
    let blueprint = ConditionBlueprint::new("query_equals").negate().negate();
    assert!(!blueprint.is_negated());
}

#[test]
fn test_resolution_errors() {
    let registry = registry();
    assert!(matches!(
        build_condition(&registry, &ConditionBlueprint::new("nope")),
        Err(ResolutionError::UnknownCondition { .. })
    ));
    assert!(matches!(
        build_condition(
            &registry,
            &ConditionBlueprint::new("query_equals").with_args(vec![json!(1)])
        ),
        Err(ResolutionError::InvalidArguments { .. })
    ));
    assert!(matches!(
        build_condition(
            &registry,
            &ConditionBlueprint::new(IS_ADMIN_DASHBOARD_REQUEST).with_args(vec![json!(true)])
        ),
        Err(ResolutionError::InvalidArguments { .. })
    ));
}

#[test]
fn test_blueprint_serde() {
    let blueprint = ConditionBlueprint::new("query_equals")
        .with_args(vec![json!("a"), json!("b")])
        .negate();
    let json = serde_json::to_value(&blueprint).unwrap();
    assert_eq!(
        json,
        json!({"class": "query_equals", "args": ["a", "b"], "negated": true})
    );
    let plain = serde_json::to_value(ConditionBlueprint::new("x")).unwrap();
    assert_eq!(plain, json!({"class": "x"}));
}
