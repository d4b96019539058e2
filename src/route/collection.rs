//! Name-indexed route storage.
//!
//! [`LiveRouteCollection`] is filled by the registrar. [`CachedRouteCollection`]
//! is built from the route cache; it keeps every route as serialized JSON and
//! hydrates an entry the first time it is looked up.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::{Route, RouteError};

/// Ordered, name-indexed route store.
pub trait RouteCollection: Send + Sync + std::fmt::Debug {
    /// Insert a route, replacing any route registered under the same name.
    ///
    /// A replaced route keeps its original position, so registration order
    /// (and with it match precedence) is decided by the first registration.
    ///
    /// # Errors
    ///
    /// Sealed collections reject every insertion.
    fn add(&mut self, route: Route) -> Result<&mut Route, RouteError>;

    /// Look a route up by name.
    ///
    /// # Errors
    ///
    /// [`RouteError::RouteNotFound`] for unknown names and
    /// [`RouteError::CorruptCachedRoute`] when a cached entry cannot be hydrated.
    fn get(&self, name: &str) -> Result<Arc<Route>, RouteError>;

    /// Whether a route is registered under `name`.
    fn contains(&self, name: &str) -> bool;

    /// Route names in collection order.
    fn names(&self) -> Vec<&str>;

    /// Number of routes.
    fn len(&self) -> usize;

    /// `true` when no routes are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The serialized form stored in the route cache (`name -> route JSON`).
    ///
    /// # Errors
    ///
    /// Fails when a route cannot be serialized or a cached entry is corrupt.
    fn to_cached_form(&self) -> Result<BTreeMap<String, String>, RouteError>;
}

/// Collection filled during registration.
#[derive(Debug, Default, Clone)]
pub struct LiveRouteCollection {
    routes: Vec<Arc<Route>>,
    index: HashMap<String, usize>,
}

impl LiveRouteCollection {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(AsRef::as_ref)
    }
}

impl RouteCollection for LiveRouteCollection {
    fn add(&mut self, route: Route) -> Result<&mut Route, RouteError> {
        let existing = self.index.get(route.name()).copied();
        let position = match existing {
            Some(position) => {
                self.routes[position] = Arc::new(route);
                position
            }
            None => {
                self.index.insert(route.name().to_string(), self.routes.len());
                self.routes.push(Arc::new(route));
                self.routes.len() - 1
            }
        };
        Ok(Arc::make_mut(&mut self.routes[position]))
    }

    fn get(&self, name: &str) -> Result<Arc<Route>, RouteError> {
        self.index
            .get(name)
            .map(|&position| Arc::clone(&self.routes[position]))
            .ok_or_else(|| RouteError::RouteNotFound {
                name: name.to_string(),
            })
    }

    fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn names(&self) -> Vec<&str> {
        self.routes.iter().map(|route| route.name()).collect()
    }

    fn len(&self) -> usize {
        self.routes.len()
    }

    fn to_cached_form(&self) -> Result<BTreeMap<String, String>, RouteError> {
        self.routes
            .iter()
            .map(|route| {
                serde_json::to_string(route.as_ref())
                    .map(|json| (route.name().to_string(), json))
                    .map_err(|source| RouteError::Serialization {
                        name: route.name().to_string(),
                        source,
                    })
            })
            .collect()
    }
}

/// One cached route: raw JSON until first access, then the hydrated value.
#[derive(Debug)]
struct CachedEntry {
    raw: String,
    hydrated: OnceCell<Arc<Route>>,
}

/// Read-only collection backed by the route cache.
#[derive(Debug, Default)]
pub struct CachedRouteCollection {
    order: Vec<String>,
    entries: HashMap<String, CachedEntry>,
}

impl CachedRouteCollection {
    /// Wrap the `name -> route JSON` map read from the cache file.
    #[must_use]
    pub fn new(serialized: BTreeMap<String, String>) -> Self {
        let mut order = Vec::with_capacity(serialized.len());
        let mut entries = HashMap::with_capacity(serialized.len());
        for (name, raw) in serialized {
            order.push(name.clone());
            entries.insert(
                name,
                CachedEntry {
                    raw,
                    hydrated: OnceCell::new(),
                },
            );
        }
        Self { order, entries }
    }

    /// Number of entries hydrated so far.
    #[must_use]
    pub fn hydrated_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.hydrated.get().is_some())
            .count()
    }
}

impl RouteCollection for CachedRouteCollection {
    fn add(&mut self, route: Route) -> Result<&mut Route, RouteError> {
        Err(RouteError::SealedCollection {
            name: route.name().to_string(),
        })
    }

    fn get(&self, name: &str) -> Result<Arc<Route>, RouteError> {
        let entry = self.entries.get(name).ok_or_else(|| RouteError::RouteNotFound {
            name: name.to_string(),
        })?;
        entry
            .hydrated
            .get_or_try_init(|| {
                serde_json::from_str::<Route>(&entry.raw)
                    .map(Arc::new)
                    .map_err(|source| RouteError::CorruptCachedRoute {
                        name: name.to_string(),
                        source,
                    })
            })
            .map(Arc::clone)
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn to_cached_form(&self) -> Result<BTreeMap<String, String>, RouteError> {
        Ok(self
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.raw.clone()))
            .collect())
    }
}
