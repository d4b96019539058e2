use http::Method;
use serde_json::Value;
use tracing::debug;

use super::group::RouteGroup;
use crate::admin::{AdminNamespace, MenuItem};
use crate::condition::{ConditionBlueprint, IS_ADMIN_AREA_PATH, IS_ADMIN_DASHBOARD_REQUEST};
use crate::route::{
    join_paths, normalize_path, Handler, Route, RouteCollection, RouteError, ANY_METHODS,
};

/// Name of the catch-all route registered by [`Registrar::fallback`].
pub const FALLBACK_ROUTE: &str = "fallback";

/// Registration front-end handed to route closures.
///
/// Holds the group stack for the duration of one registration pass and
/// writes fully resolved routes into the collection.
pub struct Registrar<'a> {
    routes: &'a mut dyn RouteCollection,
    admin: &'a AdminNamespace,
    groups: Vec<RouteGroup>,
    in_admin_area: bool,
}

impl<'a> Registrar<'a> {
    /// Registrar writing into `routes`.
    pub fn new(routes: &'a mut dyn RouteCollection, admin: &'a AdminNamespace) -> Self {
        Self {
            routes,
            admin,
            groups: Vec::new(),
            in_admin_area: false,
        }
    }

    /// The group currently on top of the stack, if any.
    #[must_use]
    pub fn current_group(&self) -> Option<&RouteGroup> {
        self.groups.last()
    }

    /// Current group nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.groups.len()
    }

    /// Run `f` with `attributes` merged into the current group.
    ///
    /// The group is popped when `f` returns, whether or not it failed.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `f`.
    pub fn group<F>(&mut self, attributes: RouteGroup, f: F) -> Result<(), RouteError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouteError>,
    {
        let merged = match self.groups.last() {
            Some(parent) => attributes.merge_with(parent),
            None => attributes.merge_with(&RouteGroup::default()),
        };
        self.with_group(merged, f)
    }

    fn with_group<F>(&mut self, group: RouteGroup, f: F) -> Result<(), RouteError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouteError>,
    {
        debug!(
            prefix = %group.prefix(),
            name = %group.name(),
            depth = self.groups.len() + 1,
            "Entering route group"
        );
        self.groups.push(group);
        let result = f(self);
        self.groups.pop();
        result
    }

    /// Register a fully specified route.
    ///
    /// The current group's prefix, name, namespace and middleware are applied
    /// before the route is inserted. Re-registering a name replaces the
    /// earlier route.
    ///
    /// # Errors
    ///
    /// Configuration errors: a name starting with `/`, a malformed pattern,
    /// or misuse of the admin namespace.
    pub fn register_route(
        &mut self,
        name: &str,
        path: &str,
        methods: &[Method],
        handler: impl Into<Handler>,
    ) -> Result<&mut Route, RouteError> {
        if name.starts_with('/') {
            return Err(RouteError::NameLooksLikePath {
                name: name.to_string(),
            });
        }

        let group = self.groups.last().cloned().unwrap_or_default();
        let full_name = group.route_name(name);

        if self.in_admin_area {
            let declared = normalize_path(path);
            if declared
                .split('/')
                .any(|segment| segment == self.admin.entry_script())
            {
                return Err(RouteError::AdminPrefixInPath {
                    name: full_name,
                    path: path.to_string(),
                    prefix: self.admin.prefix().to_string(),
                });
            }
        }

        let full_path = join_paths(group.prefix(), path);
        if !self.in_admin_area && self.admin.owns_path(&full_path) {
            return Err(RouteError::AdminRouteOutsideNamespace {
                name: full_name,
                path: full_path,
            });
        }

        let mut route = Route::new(full_name, &full_path, methods, handler.into())?;
        route.set_namespace_if_missing(group.namespace());
        route.with_middleware(group.middleware().iter().cloned());
        if self.in_admin_area {
            route.condition(ConditionBlueprint::new(IS_ADMIN_DASHBOARD_REQUEST));
        }

        debug!(
            route_name = %route.name(),
            path = %route.path(),
            methods = ?route.methods(),
            handler = %route.handler(),
            "Route registered"
        );
        self.routes.add(route)
    }

    /// Register a `GET` route.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn get(
        &mut self,
        name: &str,
        path: &str,
        handler: impl Into<Handler>,
    ) -> Result<&mut Route, RouteError> {
        self.register_route(name, path, &[Method::GET], handler)
    }

    /// Register a `POST` route.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn post(
        &mut self,
        name: &str,
        path: &str,
        handler: impl Into<Handler>,
    ) -> Result<&mut Route, RouteError> {
        self.register_route(name, path, &[Method::POST], handler)
    }

    /// Register a `PUT` route.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn put(
        &mut self,
        name: &str,
        path: &str,
        handler: impl Into<Handler>,
    ) -> Result<&mut Route, RouteError> {
        self.register_route(name, path, &[Method::PUT], handler)
    }

    /// Register a `PATCH` route.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn patch(
        &mut self,
        name: &str,
        path: &str,
        handler: impl Into<Handler>,
    ) -> Result<&mut Route, RouteError> {
        self.register_route(name, path, &[Method::PATCH], handler)
    }

    /// Register a `DELETE` route.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn delete(
        &mut self,
        name: &str,
        path: &str,
        handler: impl Into<Handler>,
    ) -> Result<&mut Route, RouteError> {
        self.register_route(name, path, &[Method::DELETE], handler)
    }

    /// Register an `OPTIONS` route.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn options(
        &mut self,
        name: &str,
        path: &str,
        handler: impl Into<Handler>,
    ) -> Result<&mut Route, RouteError> {
        self.register_route(name, path, &[Method::OPTIONS], handler)
    }

    /// Register a route answering every verb.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn any(
        &mut self,
        name: &str,
        path: &str,
        handler: impl Into<Handler>,
    ) -> Result<&mut Route, RouteError> {
        self.register_route(name, path, &ANY_METHODS, handler)
    }

    /// Register a route answering the given verbs.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn match_methods(
        &mut self,
        methods: &[Method],
        name: &str,
        path: &str,
        handler: impl Into<Handler>,
    ) -> Result<&mut Route, RouteError> {
        self.register_route(name, path, methods, handler)
    }

    /// Reserve a path for the host: matching requests produce a delegated
    /// outcome and never reach a handler.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn delegate(
        &mut self,
        name: &str,
        path: &str,
        methods: &[Method],
    ) -> Result<&mut Route, RouteError> {
        self.register_route(name, path, methods, Handler::Delegate)
    }

    /// Redirect `from` to `to` with the given status.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn redirect(
        &mut self,
        name: &str,
        from: &str,
        to: &str,
        status: u16,
    ) -> Result<&mut Route, RouteError> {
        let route = self.register_route(name, from, &ANY_METHODS, Handler::Redirect)?;
        route
            .default_value("to", to)
            .default_value("status", Value::from(status));
        Ok(route)
    }

    /// Redirect `from` to `to` with `301 Moved Permanently`.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn permanent_redirect(
        &mut self,
        name: &str,
        from: &str,
        to: &str,
    ) -> Result<&mut Route, RouteError> {
        self.redirect(name, from, to, 301)
    }

    /// Render `view` for `GET`/`HEAD` requests to `path`.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn view(&mut self, name: &str, path: &str, view: &str) -> Result<&mut Route, RouteError> {
        let route = self.register_route(name, path, &[Method::GET, Method::HEAD], Handler::View)?;
        route.default_value("view", view);
        Ok(route)
    }

    /// Catch-all `GET` route tried after every other route.
    ///
    /// Admin screens the router does not own belong to the host, so the
    /// fallback never answers dashboard requests or paths inside the admin
    /// directory.
    ///
    /// # Errors
    ///
    /// See [`Registrar::register_route`].
    pub fn fallback(&mut self, handler: impl Into<Handler>) -> Result<&mut Route, RouteError> {
        let route = self.register_route(FALLBACK_ROUTE, "{path}", &[Method::GET], handler)?;
        route
            .requirement("path", ".+")?
            .condition(ConditionBlueprint::new(IS_ADMIN_DASHBOARD_REQUEST).negate())
            .condition(ConditionBlueprint::new(IS_ADMIN_AREA_PATH).negate())
            .mark_fallback();
        Ok(route)
    }

    /// Run `f` inside the admin dashboard namespace.
    ///
    /// Routes registered by `f` are prefixed with the admin entry script
    /// (replacing any outer prefix) and only match dashboard requests.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `f`.
    pub fn admin<F>(&mut self, f: F) -> Result<(), RouteError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouteError>,
    {
        let group = self
            .groups
            .last()
            .cloned()
            .unwrap_or_default()
            .with_prefix(self.admin.prefix());
        let was_admin = std::mem::replace(&mut self.in_admin_area, true);
        let result = self.with_group(group, f);
        self.in_admin_area = was_admin;
        result
    }

    /// Register an admin page, optionally with a dashboard menu entry.
    ///
    /// # Errors
    ///
    /// Fails outside [`Registrar::admin`], when the menu parent is unknown or
    /// not a menu page, and when the parent is itself a sub-page.
    pub fn page(
        &mut self,
        name: &str,
        path: &str,
        handler: impl Into<Handler>,
        menu: Option<MenuItem>,
    ) -> Result<&mut Route, RouteError> {
        if !self.in_admin_area {
            return Err(RouteError::AdminRouteOutsideNamespace {
                name: name.to_string(),
                path: path.to_string(),
            });
        }

        if let Some(parent) = menu.as_ref().and_then(|item| item.parent.as_deref()) {
            self.check_menu_parent(name, parent)?;
        }

        let route = self.register_route(name, path, &[Method::GET], handler)?;
        if let Some(menu) = menu {
            let value = serde_json::to_value(&menu).map_err(|source| RouteError::Serialization {
                name: route.name().to_string(),
                source,
            })?;
            route.default_value("menu", value);
        }
        Ok(route)
    }

    fn check_menu_parent(&self, name: &str, parent: &str) -> Result<(), RouteError> {
        let unknown = || RouteError::UnknownMenuParent {
            name: name.to_string(),
            parent: parent.to_string(),
        };
        let parent_route = self.routes.get(parent).map_err(|_| unknown())?;
        let parent_menu = parent_route
            .defaults()
            .get("menu")
            .and_then(|value| serde_json::from_value::<MenuItem>(value.clone()).ok())
            .ok_or_else(unknown)?;
        if parent_menu.parent.is_some() {
            return Err(RouteError::RecursiveSubPage {
                name: name.to_string(),
                parent: parent.to_string(),
            });
        }
        Ok(())
    }
}
