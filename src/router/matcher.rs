//! Runtime matcher built from [`MatcherData`].
//!
//! Static routes are an exact `(method, path)` lookup. Dynamic routes are
//! matched with one [`RegexSet`] per method, which reports every matching
//! route in a single pass; captures are then extracted with the route's own
//! anchored regex only for the candidates actually consumed.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use percent_encoding::percent_decode_str;
use regex::{Regex, RegexSet};
use smallvec::SmallVec;

use super::compiler::MatcherData;
use super::error::RouterError;
use crate::route::parse_method;

/// Maximum number of path parameters stored inline.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured path parameters, in pattern order.
///
/// Names are shared with the compiled route (`Arc<str>`); values are
/// per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A route whose path matched, before conditions are evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Route name
    pub name: Arc<str>,
    /// Captured path parameters
    pub params: ParamVec,
}

#[derive(Debug)]
struct CompiledRoute {
    name: Arc<str>,
    regex: Regex,
    groups: Vec<(String, Arc<str>)>,
}

impl CompiledRoute {
    fn capture(&self, path: &str) -> Option<Candidate> {
        let captures = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (group, name) in &self.groups {
            if let Some(value) = captures.name(group) {
                // the routing path keeps `%2F` and `%25` escaped
                let value = percent_decode_str(value.as_str()).decode_utf8_lossy();
                params.push((Arc::clone(name), value.into_owned()));
            }
        }
        Some(Candidate {
            name: Arc::clone(&self.name),
            params,
        })
    }
}

#[derive(Debug)]
struct DynamicTable {
    set: RegexSet,
    routes: Vec<CompiledRoute>,
}

/// Compiled matcher.
#[derive(Debug, Default)]
pub struct Matcher {
    static_routes: HashMap<String, HashMap<String, Vec<Arc<str>>>>,
    dynamic_routes: HashMap<String, DynamicTable>,
}

impl Matcher {
    /// Build the matcher from compiled (or cached) data.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidMatcher`] when a regex in the data does not
    /// compile, which only happens with a tampered cache.
    pub fn from_data(data: &MatcherData) -> Result<Self, RouterError> {
        let mut static_routes: HashMap<String, HashMap<String, Vec<Arc<str>>>> =
            HashMap::with_capacity(data.static_routes.len());
        for (method, paths) in &data.static_routes {
            let table = paths
                .iter()
                .map(|(path, route_names)| {
                    let route_names: Vec<Arc<str>> =
                        route_names.iter().map(|n| Arc::from(n.as_str())).collect();
                    (path.clone(), route_names)
                })
                .collect();
            static_routes.insert(method.clone(), table);
        }

        let mut dynamic_routes: HashMap<String, DynamicTable> =
            HashMap::with_capacity(data.dynamic_routes.len());
        for (method, routes) in &data.dynamic_routes {
            let invalid = |source| RouterError::InvalidMatcher {
                method: method.clone(),
                source,
            };
            let set = RegexSet::new(routes.iter().map(|r| r.regex.as_str())).map_err(invalid)?;
            let compiled = routes
                .iter()
                .map(|route| {
                    Ok(CompiledRoute {
                        name: Arc::from(route.name.as_str()),
                        regex: Regex::new(&route.regex).map_err(invalid)?,
                        groups: route
                            .params
                            .iter()
                            .enumerate()
                            .map(|(index, param)| {
                                (format!("__p{index}"), Arc::from(param.as_str()))
                            })
                            .collect(),
                    })
                })
                .collect::<Result<Vec<_>, RouterError>>()?;
            dynamic_routes.insert(
                method.clone(),
                DynamicTable {
                    set,
                    routes: compiled,
                },
            );
        }

        Ok(Self {
            static_routes,
            dynamic_routes,
        })
    }

    /// Routes matching `path` under `method`, static routes first, each
    /// partition in registration order.
    pub fn candidates<'m>(
        &'m self,
        method: &str,
        path: &'m str,
    ) -> impl Iterator<Item = Candidate> + 'm {
        let statics = self
            .static_routes
            .get(method)
            .and_then(|paths| paths.get(path))
            .into_iter()
            .flatten()
            .map(|name| Candidate {
                name: Arc::clone(name),
                params: ParamVec::new(),
            });

        let dynamics = self
            .dynamic_routes
            .get(method)
            .into_iter()
            .flat_map(move |table| {
                table
                    .set
                    .matches(path)
                    .into_iter()
                    .filter_map(move |index| table.routes[index].capture(path))
            });

        statics.chain(dynamics)
    }

    /// Methods under which `path` matches at least one route, sorted by name.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut allowed: Vec<&str> = self
            .static_routes
            .iter()
            .filter(|(_, paths)| paths.contains_key(path))
            .map(|(method, _)| method.as_str())
            .chain(
                self.dynamic_routes
                    .iter()
                    .filter(|(_, table)| table.set.is_match(path))
                    .map(|(method, _)| method.as_str()),
            )
            .collect();
        allowed.sort_unstable();
        allowed.dedup();
        allowed
            .into_iter()
            .filter_map(|method| parse_method(method).ok())
            .collect()
    }

    /// Number of compiled (method, route) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let statics: usize = self
            .static_routes
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum();
        let dynamics: usize = self.dynamic_routes.values().map(|t| t.routes.len()).sum();
        statics + dynamics
    }

    /// `true` when nothing was compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
