use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use http::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::condition::{build_condition, ConditionResolver, RouteCondition};
use crate::request::RoutingRequest;
use crate::route::{Route, RouteCollection};
use crate::router::{Matcher, ParamVec, RouterError};

const SLOW_MATCH: Duration = Duration::from_millis(1);

/// Result of successfully matching a request to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route
    pub route: Arc<Route>,
    /// Path parameters, including scalar defaults for absent placeholders
    pub path_params: ParamVec,
    /// Values extracted by the route conditions, in condition order
    pub condition_arguments: Vec<Value>,
}

impl RouteMatch {
    fn new(route: Arc<Route>, mut path_params: ParamVec, condition_arguments: Vec<Value>) -> Self {
        for placeholder in route.pattern().placeholders() {
            if path_params.iter().any(|(name, _)| name.as_ref() == placeholder) {
                continue;
            }
            if let Some(default) = route.defaults().get(placeholder).and_then(scalar_to_string) {
                path_params.push((Arc::from(placeholder), default));
            }
        }
        Self {
            route,
            path_params,
            condition_arguments,
        }
    }

    /// Matched route name
    #[must_use]
    pub fn name(&self) -> &str {
        self.route.name()
    }

    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics for duplicate names.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Route defaults overlaid with the captured path parameters.
    #[must_use]
    pub fn parameters(&self) -> BTreeMap<String, Value> {
        let mut parameters = self.route.defaults().clone();
        for (name, value) in &self.path_params {
            parameters.insert(name.to_string(), Value::String(value.clone()));
        }
        parameters
    }
}

/// What the host should do with a request.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// A route matched; invoke its handler
    Matched(RouteMatch),
    /// No route matches the path under any method
    NotFound,
    /// The path matches, but only under other methods
    MethodNotAllowed(Vec<Method>),
    /// The path is reserved for the host; hand control back to it
    Delegated(RouteMatch),
}

impl DispatchOutcome {
    /// Short outcome label used in logs and CLI output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchOutcome::Matched(_) => "MATCHED",
            DispatchOutcome::NotFound => "NOT_FOUND",
            DispatchOutcome::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            DispatchOutcome::Delegated(_) => "DELEGATED",
        }
    }

    /// The route match for matched and delegated outcomes.
    #[must_use]
    pub fn route_match(&self) -> Option<&RouteMatch> {
        match self {
            DispatchOutcome::Matched(m) | DispatchOutcome::Delegated(m) => Some(m),
            _ => None,
        }
    }
}

type ResolvedConditions = Arc<Vec<Box<dyn RouteCondition>>>;

/// Turns matcher candidates into a dispatch outcome.
///
/// Conditions are resolved once per route name and reused afterwards.
pub struct Dispatcher {
    resolver: Box<dyn ConditionResolver>,
    resolved: DashMap<String, ResolvedConditions>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("resolved_routes", &self.resolved.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Dispatcher resolving conditions through `resolver`.
    #[must_use]
    pub fn new(resolver: Box<dyn ConditionResolver>) -> Self {
        Self {
            resolver,
            resolved: DashMap::new(),
        }
    }

    /// Forget resolved conditions, e.g. after routes were re-registered.
    pub fn reset(&self) {
        self.resolved.clear();
    }

    /// Dispatch `request`, matching against `path`.
    ///
    /// `path` is the routing path, which differs from the request path for
    /// admin dashboard requests. `HEAD` requests fall back to `GET` routes.
    ///
    /// # Errors
    ///
    /// Fails when a matched route cannot be read from the collection or one
    /// of its conditions cannot be resolved.
    pub fn dispatch(
        &self,
        matcher: &Matcher,
        routes: &dyn RouteCollection,
        request: &RoutingRequest,
        path: &str,
    ) -> Result<DispatchOutcome, RouterError> {
        let method = request.method();
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let mut methods = vec![method.as_str()];
        if method == Method::HEAD {
            methods.push(Method::GET.as_str());
        }

        for candidate_method in methods {
            for candidate in matcher.candidates(candidate_method, path) {
                let route = routes.get(&candidate.name)?;
                let conditions = self.conditions_for(&route)?;
                if !conditions.iter().all(|c| c.is_satisfied(request)) {
                    debug!(
                        route_name = %route.name(),
                        path = %path,
                        "Route conditions not satisfied, trying next candidate"
                    );
                    continue;
                }
                let arguments = conditions.iter().flat_map(|c| c.arguments(request)).collect();
                let route_match = RouteMatch::new(route, candidate.params, arguments);
                let outcome = if route_match.route.is_delegate() {
                    DispatchOutcome::Delegated(route_match)
                } else {
                    DispatchOutcome::Matched(route_match)
                };
                log_outcome(method, path, &outcome, match_start.elapsed());
                return Ok(outcome);
            }
        }

        let allowed = matcher.allowed_methods(path);
        let method_matches = allowed
            .iter()
            .any(|m| m == method || (method == Method::HEAD && m == Method::GET));
        let outcome = if allowed.is_empty() || method_matches {
            DispatchOutcome::NotFound
        } else {
            DispatchOutcome::MethodNotAllowed(allowed)
        };
        log_outcome(method, path, &outcome, match_start.elapsed());
        Ok(outcome)
    }

    fn conditions_for(&self, route: &Route) -> Result<ResolvedConditions, RouterError> {
        if let Some(resolved) = self.resolved.get(route.name()) {
            return Ok(Arc::clone(resolved.value()));
        }
        let conditions = route
            .conditions()
            .iter()
            .map(|blueprint| {
                build_condition(self.resolver.as_ref(), blueprint).map_err(|source| {
                    RouterError::Condition {
                        route: route.name().to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let conditions = Arc::new(conditions);
        self.resolved
            .insert(route.name().to_string(), Arc::clone(&conditions));
        Ok(conditions)
    }
}

fn log_outcome(method: &Method, path: &str, outcome: &DispatchOutcome, duration: Duration) {
    let allowed: &[Method] = match outcome {
        DispatchOutcome::MethodNotAllowed(allowed) => allowed,
        _ => &[],
    };
    match outcome.route_match() {
        Some(route_match) if duration > SLOW_MATCH => warn!(
            method = %method,
            path = %path,
            outcome = outcome.kind(),
            route_name = %route_match.name(),
            route_pattern = %route_match.route.path(),
            path_params = ?route_match.path_params,
            duration_us = duration.as_micros(),
            "Slow route matching detected"
        ),
        Some(route_match) => info!(
            method = %method,
            path = %path,
            outcome = outcome.kind(),
            route_name = %route_match.name(),
            route_pattern = %route_match.route.path(),
            path_params = ?route_match.path_params,
            duration_us = duration.as_micros(),
            "Route matched"
        ),
        None => info!(
            method = %method,
            path = %path,
            outcome = outcome.kind(),
            allowed = ?allowed,
            duration_us = duration.as_micros(),
            "No route matched"
        ),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
