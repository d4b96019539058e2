use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use super::compiler::{compile, MatcherData};
use super::error::RouterError;
use super::matcher::Matcher;
use crate::admin::{AdminNamespace, MenuItem, PAGE_PARAM};
use crate::cache::{CacheFile, FsCacheFile, RouteCache};
use crate::condition::{ConditionRegistry, ConditionResolver};
use crate::config::RouterConfig;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::registrar::Registrar;
use crate::request::RoutingRequest;
use crate::route::{
    CachedRouteCollection, LiveRouteCollection, Route, RouteCollection, RouteError,
};
use crate::url::{Rfc3986Encoder, UrlGenerationError, UrlGenerator, UrlType};

/// The routing front door: registration, compilation, dispatch and reverse
/// routing over one route collection.
///
/// # Lifecycle
///
/// 1. [`Router::new`] loads the route cache when caching is enabled. On a
///    warm cache the router is ready immediately.
/// 2. [`Router::routes`] runs registration closures. On a warm cache they
///    are skipped entirely.
/// 3. The first [`Router::dispatch`] (or an explicit [`Router::compile`])
///    compiles the matcher and, on a cold cache with caching enabled, writes
///    the cache. A write failure is returned to the caller.
#[derive(Debug)]
pub struct Router {
    admin: AdminNamespace,
    routes: Box<dyn RouteCollection>,
    matcher_data: Option<MatcherData>,
    matcher: OnceCell<Matcher>,
    cache: Option<RouteCache>,
    dispatcher: Dispatcher,
    urls: UrlGenerator,
    from_cache: bool,
}

impl Router {
    /// Create a router from configuration, using a filesystem cache at
    /// `cache_path` when caching is enabled.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidAdminPrefix`] for a bad admin prefix. Cache load
    /// failures are logged and lead to recompilation instead.
    pub fn new(config: &RouterConfig) -> Result<Self, RouterError> {
        let file = match (&config.cache_path, config.caching) {
            (Some(path), true) => {
                Some(Box::new(FsCacheFile::new(path.clone())) as Box<dyn CacheFile>)
            }
            _ => None,
        };
        Self::with_cache_file(config, file)
    }

    /// Create a router backed by an arbitrary cache file (or none).
    ///
    /// # Errors
    ///
    /// See [`Router::new`].
    pub fn with_cache_file(
        config: &RouterConfig,
        file: Option<Box<dyn CacheFile>>,
    ) -> Result<Self, RouterError> {
        let admin = AdminNamespace::new(&config.admin_prefix)?;
        let cache = file.map(RouteCache::new);

        let loaded = match cache.as_ref().map(RouteCache::load) {
            Some(Ok(loaded)) => loaded,
            Some(Err(err)) => {
                warn!(error = %err, "Route cache unusable, routes will be recompiled");
                None
            }
            None => None,
        };
        let from_cache = loaded.is_some();
        let (routes, matcher_data): (Box<dyn RouteCollection>, Option<MatcherData>) = match loaded {
            Some(cached) => (
                Box::new(CachedRouteCollection::new(cached.route_collection)),
                Some(cached.fast_route),
            ),
            None => (Box::new(LiveRouteCollection::new()), None),
        };

        let mut urls = UrlGenerator::new(config.url.clone(), admin.clone())
            .with_login_path(config.login_path.clone());
        if config.raw_query_delimiters {
            urls = urls.with_encoder(Rfc3986Encoder::with_raw_delimiters());
        }

        info!(
            admin_prefix = %admin.prefix(),
            caching = cache.is_some(),
            from_cache,
            routes_count = routes.len(),
            "Router initialized"
        );

        Ok(Self {
            dispatcher: Dispatcher::new(Box::new(ConditionRegistry::with_admin(&admin))),
            admin,
            routes,
            matcher_data,
            matcher: OnceCell::new(),
            cache,
            urls,
            from_cache,
        })
    }

    /// Replace the resolver used to build route conditions.
    pub fn set_condition_resolver(&mut self, resolver: Box<dyn ConditionResolver>) {
        self.dispatcher = Dispatcher::new(resolver);
    }

    /// Run a registration closure.
    ///
    /// Skipped when the routes were loaded from a warm cache. Registering
    /// after the matcher was compiled discards the compiled matcher.
    ///
    /// # Errors
    ///
    /// The first configuration error raised by `f`, or
    /// [`RouteError::SealedCollection`] if routes are added to a cached
    /// collection some other way.
    pub fn routes<F>(&mut self, f: F) -> Result<(), RouterError>
    where
        F: FnOnce(&mut Registrar<'_>) -> Result<(), RouteError>,
    {
        if self.from_cache {
            debug!("Route cache is warm, skipping registration");
            return Ok(());
        }

        let before = self.routes.len();
        {
            let mut registrar = Registrar::new(self.routes.as_mut(), &self.admin);
            f(&mut registrar)?;
        }
        self.invalidate();

        info!(
            routes_count = self.routes.len(),
            added = self.routes.len().saturating_sub(before),
            "Routes registered"
        );
        Ok(())
    }

    fn invalidate(&mut self) {
        self.matcher = OnceCell::new();
        self.matcher_data = None;
        self.dispatcher.reset();
        self.urls.clear_cache();
    }

    /// Compile the matcher if it has not been compiled yet.
    ///
    /// On a cold cache with caching enabled, the compiled data is written to
    /// the cache immediately.
    ///
    /// # Errors
    ///
    /// Invalid patterns, corrupt cached routes, and cache write failures.
    pub fn compile(&self) -> Result<&Matcher, RouterError> {
        self.matcher.get_or_try_init(|| -> Result<Matcher, RouterError> {
            let start = Instant::now();
            let matcher = match &self.matcher_data {
                Some(data) => Matcher::from_data(data)?,
                None => {
                    let data = compile(self.routes.as_ref())?;
                    if let Some(cache) = &self.cache {
                        cache.save(self.routes.as_ref(), &data)?;
                    }
                    Matcher::from_data(&data)?
                }
            };
            info!(
                entries = matcher.len(),
                from_cache = self.from_cache,
                duration_us = start.elapsed().as_micros(),
                "Route matcher ready"
            );
            Ok(matcher)
        })
    }

    /// Dispatch a request.
    ///
    /// Dashboard requests to the admin entry script are matched against the
    /// logical admin path built from the `page` query parameter.
    ///
    /// # Errors
    ///
    /// Compilation failures (see [`Router::compile`]), corrupt cached routes,
    /// and condition resolution failures.
    pub fn dispatch(&self, request: &RoutingRequest) -> Result<DispatchOutcome, RouterError> {
        let matcher = self.compile()?;
        let path = self.routing_path(request);
        self.dispatcher
            .dispatch(matcher, self.routes.as_ref(), request, &path)
    }

    /// The path `request` is matched against.
    #[must_use]
    pub fn routing_path<'r>(&self, request: &'r RoutingRequest) -> Cow<'r, str> {
        if self.admin.is_entry_point(request.path()) {
            Cow::Owned(
                self.admin
                    .rewrite_for_routing(request.path(), request.query_param(PAGE_PARAM)),
            )
        } else {
            Cow::Borrowed(request.path())
        }
    }

    /// URL for a literal path. See [`UrlGenerator::to`].
    #[must_use]
    pub fn url_to(
        &self,
        path: &str,
        params: &[(&str, &str)],
        url_type: UrlType,
        secure: Option<bool>,
    ) -> String {
        self.urls.to(path, params, url_type, secure)
    }

    /// URL for a named route. See [`UrlGenerator::to_route`].
    ///
    /// # Errors
    ///
    /// See [`UrlGenerator::to_route`].
    pub fn url_to_route(
        &self,
        name: &str,
        params: &[(&str, &str)],
        url_type: UrlType,
        secure: Option<bool>,
    ) -> Result<String, UrlGenerationError> {
        self.urls
            .to_route(self.routes.as_ref(), name, params, url_type, secure)
    }

    /// URL of the login page. See [`UrlGenerator::to_login`].
    ///
    /// # Errors
    ///
    /// See [`UrlGenerator::to_login`].
    pub fn login_url(
        &self,
        redirect_to: Option<&str>,
        url_type: UrlType,
    ) -> Result<String, UrlGenerationError> {
        self.urls
            .to_login(self.routes.as_ref(), redirect_to, url_type)
    }

    /// The URL generator
    #[must_use]
    pub fn url_generator(&self) -> &UrlGenerator {
        &self.urls
    }

    /// Look a route up by name.
    ///
    /// # Errors
    ///
    /// Unknown names and corrupt cached routes.
    pub fn route(&self, name: &str) -> Result<Arc<Route>, RouteError> {
        self.routes.get(name)
    }

    /// The route collection
    #[must_use]
    pub fn collection(&self) -> &dyn RouteCollection {
        self.routes.as_ref()
    }

    /// The admin namespace
    #[must_use]
    pub fn admin(&self) -> &AdminNamespace {
        &self.admin
    }

    /// Admin pages that carry a menu entry, in collection order.
    ///
    /// # Errors
    ///
    /// Corrupt cached routes.
    pub fn admin_menu(&self) -> Result<Vec<(String, MenuItem)>, RouteError> {
        let mut menu = Vec::new();
        for name in self.routes.names() {
            let route = self.routes.get(name)?;
            if let Some(item) = route
                .defaults()
                .get("menu")
                .and_then(|value| serde_json::from_value::<MenuItem>(value.clone()).ok())
            {
                menu.push((name.to_string(), item));
            }
        }
        Ok(menu)
    }

    /// Whether the routes were loaded from a warm cache.
    #[must_use]
    pub fn loaded_from_cache(&self) -> bool {
        self.from_cache
    }

    /// Whether a cache file is present on disk.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache.as_ref().is_some_and(RouteCache::is_created)
    }

    /// The route cache, when caching is enabled.
    #[must_use]
    pub fn cache(&self) -> Option<&RouteCache> {
        self.cache.as_ref()
    }
}
