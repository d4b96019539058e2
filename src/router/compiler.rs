//! Lowers a route collection into serializable matcher data.

use std::collections::BTreeMap;
use std::time::Instant;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::route::{Route, RouteCollection, RouteError};

/// One dynamic route lowered to an anchored regex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicRouteData {
    /// Route name
    pub name: String,
    /// Anchored regex with one `__p{index}` group per placeholder
    pub regex: String,
    /// Placeholder names by group index
    pub params: Vec<String>,
}

/// Compiled matcher tables, keyed by uppercase method name.
///
/// This is the form stored in the route cache; [`super::Matcher`] is built
/// from it at boot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherData {
    /// method -> normalized path -> route names in registration order
    pub static_routes: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// method -> dynamic routes in match order
    pub dynamic_routes: BTreeMap<String, Vec<DynamicRouteData>>,
}

impl MatcherData {
    /// Number of static (method, path, route) entries.
    #[must_use]
    pub fn static_count(&self) -> usize {
        self.static_routes
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Number of dynamic (method, route) entries.
    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        self.dynamic_routes.values().map(Vec::len).sum()
    }
}

/// Compile every route in `routes`.
///
/// Routes without placeholders go to the static table; the rest are lowered
/// to regexes in registration order, with the fallback route appended last.
///
/// # Errors
///
/// [`RouteError::InvalidPattern`] when a lowered pattern does not compile, or
/// any error raised while reading a route from the collection.
pub fn compile(routes: &dyn RouteCollection) -> Result<MatcherData, RouteError> {
    let start = Instant::now();
    let mut data = MatcherData::default();
    let mut fallbacks = Vec::new();

    for name in routes.names() {
        let route = routes.get(name)?;
        if route.is_fallback() {
            fallbacks.push(route);
            continue;
        }
        add_route(&mut data, &route)?;
    }
    for route in fallbacks {
        add_route(&mut data, &route)?;
    }

    info!(
        routes_count = routes.len(),
        static_routes = data.static_count(),
        dynamic_routes = data.dynamic_count(),
        duration_us = start.elapsed().as_micros(),
        "Route matcher compiled"
    );
    Ok(data)
}

fn add_route(data: &mut MatcherData, route: &Route) -> Result<(), RouteError> {
    if route.pattern().is_static() {
        for method in route.methods() {
            data.static_routes
                .entry(method.as_str().to_string())
                .or_default()
                .entry(route.path().to_string())
                .or_default()
                .push(route.name().to_string());
        }
        return Ok(());
    }

    let (regex, params) = route.pattern().regex_source(route.requirements());
    if let Err(err) = Regex::new(&regex) {
        return Err(RouteError::InvalidPattern {
            pattern: route.path().to_string(),
            reason: err.to_string(),
        });
    }
    for method in route.methods() {
        data.dynamic_routes
            .entry(method.as_str().to_string())
            .or_default()
            .push(DynamicRouteData {
                name: route.name().to_string(),
                regex: regex.clone(),
                params: params.clone(),
            });
    }
    Ok(())
}
