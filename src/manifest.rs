//! # Route Manifest
//!
//! Declarative route definitions in YAML or JSON, applied through the same
//! [`Registrar`] API that code-based registration uses. The CLI reads routes
//! from a manifest; applications may mix manifests and closures freely.
//!
//! ```yaml
//! routes:
//!   - name: home
//!     path: /
//!     handler: HomeController
//!   - name: old-blog
//!     path: /blog/{slug}
//!     redirect: { to: /posts/{slug}, status: 301 }
//!
//! groups:
//!   - prefix: /api
//!     name: api
//!     middleware: [auth]
//!     routes:
//!       - name: posts.show
//!         path: /posts/{id}
//!         methods: [GET, HEAD]
//!         handler: PostController@show
//!         requirements: { id: "[0-9]+" }
//!
//! admin:
//!   - name: settings
//!     path: /settings
//!     handler: SettingsController
//!     menu: { page_title: Settings, menu_title: Settings, capability: manage_options }
//!
//! fallback: NotFoundController
//! ```
//!
//! Every route entry needs exactly one action: `handler`, `redirect`,
//! `view`, or `delegate: true`. `methods` defaults to `[GET]` and is ignored
//! for redirects (which answer every method) and views (`GET`/`HEAD`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use http::Method;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::info;

use crate::admin::MenuItem;
use crate::condition::ConditionBlueprint;
use crate::config::extension;
use crate::registrar::{Registrar, RouteGroup};
use crate::route::{parse_method, Handler, RouteError};
use crate::router::Router;

/// Redirect target of a manifest route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedirectEntry {
    /// Target path or URL
    pub to: String,
    /// Response status
    #[serde(default = "default_redirect_status")]
    pub status: u16,
}

fn default_redirect_status() -> u16 {
    302
}

/// One route in a manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    /// Route name, relative to enclosing groups
    pub name: String,
    /// Path pattern, relative to enclosing groups
    pub path: String,
    /// Accepted methods
    #[serde(default = "default_methods", deserialize_with = "deserialize_methods")]
    pub methods: Vec<Method>,
    /// `Class@method` or a bare invokable class
    #[serde(default)]
    pub handler: Option<String>,
    /// Built-in redirect action
    #[serde(default)]
    pub redirect: Option<RedirectEntry>,
    /// Built-in view action
    #[serde(default)]
    pub view: Option<String>,
    /// Leave matching requests to the host
    #[serde(default)]
    pub delegate: bool,
    /// Controller namespace
    #[serde(default)]
    pub namespace: Option<String>,
    /// Middleware appended after group middleware
    #[serde(default)]
    pub middleware: Vec<String>,
    /// Placeholder constraints
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,
    /// Default parameter values
    #[serde(default)]
    pub defaults: BTreeMap<String, Value>,
    /// Match-time conditions
    #[serde(default)]
    pub conditions: Vec<ConditionBlueprint>,
}

/// A route group with nested routes and groups.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupEntry {
    /// Path prefix
    pub prefix: String,
    /// Name prefix
    pub name: String,
    /// Controller namespace
    pub namespace: Option<String>,
    /// Middleware for every route in the group
    pub middleware: Vec<String>,
    /// Routes in this group
    pub routes: Vec<RouteEntry>,
    /// Nested groups
    pub groups: Vec<GroupEntry>,
}

/// One admin dashboard page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminPageEntry {
    /// Route name
    pub name: String,
    /// Logical admin path
    pub path: String,
    /// Page handler
    pub handler: String,
    /// Dashboard menu entry
    #[serde(default)]
    pub menu: Option<MenuItem>,
}

/// A complete manifest.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteManifest {
    /// Top-level routes
    pub routes: Vec<RouteEntry>,
    /// Route groups
    pub groups: Vec<GroupEntry>,
    /// Admin dashboard pages, in declaration order
    pub admin: Vec<AdminPageEntry>,
    /// Handler of the catch-all route
    pub fallback: Option<String>,
}

fn default_methods() -> Vec<Method> {
    vec![Method::GET]
}

fn deserialize_methods<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Method>, D::Error> {
    use serde::de::Error as _;

    let names = Vec::<String>::deserialize(deserializer)?;
    names
        .iter()
        .map(|name| {
            parse_method(name)
                .map_err(|_| D::Error::custom(format!("invalid HTTP method '{name}'")))
        })
        .collect()
}

impl RouteManifest {
    /// Load a manifest, choosing YAML or JSON by extension.
    ///
    /// # Errors
    ///
    /// Unreadable files, unknown extensions, parse errors and invalid entries.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read route manifest {}", path.display()))?;
        let manifest = match extension(path).as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => bail!(
                "unsupported manifest format for {}; expected .yaml, .yml or .json",
                path.display()
            ),
        }
        .with_context(|| format!("invalid route manifest {}", path.display()))?;
        info!(
            path = %path.display(),
            routes_count = manifest.route_count(),
            "Route manifest loaded"
        );
        Ok(manifest)
    }

    /// Parse and validate a YAML manifest.
    ///
    /// # Errors
    ///
    /// Parse errors and invalid entries.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(content).context("failed to parse YAML")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse and validate a JSON manifest.
    ///
    /// # Errors
    ///
    /// Parse errors and invalid entries.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(content).context("failed to parse JSON")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check that every route names exactly one action.
    ///
    /// # Errors
    ///
    /// The first offending route.
    pub fn validate(&self) -> Result<()> {
        fn check(routes: &[RouteEntry], groups: &[GroupEntry]) -> Result<()> {
            for route in routes {
                let actions = usize::from(route.handler.is_some())
                    + usize::from(route.redirect.is_some())
                    + usize::from(route.view.is_some())
                    + usize::from(route.delegate);
                if actions != 1 {
                    bail!(
                        "route '{}' must declare exactly one of handler, redirect, view or delegate (found {actions})",
                        route.name
                    );
                }
                if route.methods.is_empty() {
                    bail!("route '{}' declares an empty method list", route.name);
                }
            }
            for group in groups {
                check(&group.routes, &group.groups)?;
            }
            Ok(())
        }
        check(&self.routes, &self.groups)
    }

    /// Total number of routes the manifest declares.
    #[must_use]
    pub fn route_count(&self) -> usize {
        fn count(groups: &[GroupEntry]) -> usize {
            groups
                .iter()
                .map(|group| group.routes.len() + count(&group.groups))
                .sum()
        }
        self.routes.len()
            + count(&self.groups)
            + self.admin.len()
            + usize::from(self.fallback.is_some())
    }

    /// Register everything through `registrar`: top-level routes, then
    /// groups, then admin pages, then the fallback.
    ///
    /// # Errors
    ///
    /// The first configuration error.
    pub fn apply(&self, registrar: &mut Registrar<'_>) -> Result<(), RouteError> {
        apply_routes(registrar, &self.routes)?;
        for group in &self.groups {
            apply_group(registrar, group)?;
        }
        if !self.admin.is_empty() {
            registrar.admin(|r| {
                for page in &self.admin {
                    let handler = Handler::parse(&page.handler);
                    r.page(&page.name, &page.path, handler, page.menu.clone())?;
                }
                Ok(())
            })?;
        }
        if let Some(handler) = &self.fallback {
            registrar.fallback(Handler::parse(handler))?;
        }
        Ok(())
    }

    /// Register the manifest with `router`.
    ///
    /// # Errors
    ///
    /// Configuration errors raised while registering.
    pub fn register(&self, router: &mut Router) -> Result<()> {
        router
            .routes(|r| self.apply(r))
            .context("failed to register manifest routes")
    }
}

fn apply_group(registrar: &mut Registrar<'_>, group: &GroupEntry) -> Result<(), RouteError> {
    let mut attributes = RouteGroup::new()
        .with_prefix(group.prefix.as_str())
        .with_name(group.name.as_str());
    if let Some(namespace) = &group.namespace {
        attributes = attributes.with_namespace(namespace.as_str());
    }
    for middleware in &group.middleware {
        attributes = attributes.with_middleware(middleware.as_str());
    }

    registrar.group(attributes, |r| {
        apply_routes(r, &group.routes)?;
        for nested in &group.groups {
            apply_group(r, nested)?;
        }
        Ok(())
    })
}

fn apply_routes(registrar: &mut Registrar<'_>, routes: &[RouteEntry]) -> Result<(), RouteError> {
    for entry in routes {
        let route = if let Some(redirect) = &entry.redirect {
            registrar.redirect(&entry.name, &entry.path, &redirect.to, redirect.status)?
        } else if let Some(view) = &entry.view {
            registrar.view(&entry.name, &entry.path, view)?
        } else if entry.delegate {
            registrar.delegate(&entry.name, &entry.path, &entry.methods)?
        } else {
            let handler = entry.handler.as_deref().map_or(Handler::Delegate, Handler::parse);
            registrar.match_methods(&entry.methods, &entry.name, &entry.path, handler)?
        };

        if let Some(namespace) = &entry.namespace {
            route.with_namespace(namespace.as_str());
        }
        for middleware in &entry.middleware {
            route.add_middleware(middleware.as_str());
        }
        for (placeholder, regex) in &entry.requirements {
            route.requirement(placeholder, regex.as_str())?;
        }
        for (key, value) in &entry.defaults {
            route.default_value(key.as_str(), value.clone());
        }
        for blueprint in &entry.conditions {
            route.condition(blueprint.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminNamespace;
    use crate::route::{LiveRouteCollection, RouteCollection};

    const MANIFEST: &str = r#"
routes:
  - name: home
    path: /
    handler: HomeController
  - name: old-blog
    path: /blog/{slug}
    redirect: { to: /posts, status: 301 }
  - name: about
    path: /about
    view: pages.about
  - name: feed
    path: /feed
    delegate: true
    methods: [get, head]
groups:
  - prefix: /api
    name: api
    middleware: [auth]
    routes:
      - name: posts.show
        path: /posts/{id}
        methods: [GET, HEAD]
        handler: PostController@show
        requirements: { id: "[0-9]+" }
        defaults: { format: json }
    groups:
      - prefix: /v2
        name: v2
        routes:
          - name: ping
            path: /ping
            handler: PingController
admin:
  - name: settings
    path: /settings
    handler: SettingsController
    menu: { page_title: Settings, menu_title: Settings, capability: manage_options }
fallback: NotFoundController
"#;

    fn apply(manifest: &RouteManifest) -> LiveRouteCollection {
        let admin = AdminNamespace::default();
        let mut routes = LiveRouteCollection::new();
        {
            let mut registrar = Registrar::new(&mut routes, &admin);
            manifest.apply(&mut registrar).unwrap();
        }
        routes
    }

    #[test]
    fn test_yaml_manifest_registers_everything() {
        let manifest = RouteManifest::from_yaml_str(MANIFEST).unwrap();
        assert_eq!(manifest.route_count(), 8);

        let routes = apply(&manifest);
        assert_eq!(
            routes.names(),
            vec![
                "home",
                "old-blog",
                "about",
                "feed",
                "api.posts.show",
                "api.v2.ping",
                "settings",
                "fallback"
            ]
        );

        let show = routes.get("api.posts.show").unwrap();
        assert_eq!(show.path(), "/api/posts/{id}");
        assert_eq!(show.methods(), &[Method::GET, Method::HEAD]);
        assert_eq!(show.requirements()["id"], "[0-9]+");
        assert_eq!(show.defaults()["format"], "json");
        assert_eq!(show.middleware()[0].name(), "auth");

        assert!(routes.get("feed").unwrap().is_delegate());
        assert_eq!(routes.get("old-blog").unwrap().defaults()["status"], 301);
        assert_eq!(routes.get("about").unwrap().defaults()["view"], "pages.about");
        assert_eq!(routes.get("api.v2.ping").unwrap().path(), "/api/v2/ping");
        assert!(routes.get("settings").unwrap().defaults().contains_key("menu"));
        assert!(routes.get("fallback").unwrap().is_fallback());
    }

    #[test]
    fn test_json_manifest() {
        let json = r#"{"routes": [{"name": "home", "path": "/", "handler": "Home"}]}"#;
        let manifest = RouteManifest::from_json_str(json).unwrap();
        assert_eq!(apply(&manifest).len(), 1);
    }

    #[test]
    fn test_route_needs_exactly_one_action() {
        let none = "routes:\n  - name: a\n    path: /a\n";
        assert!(RouteManifest::from_yaml_str(none).is_err());

        let two = "routes:\n  - name: a\n    path: /a\n    handler: A\n    view: a\n";
        assert!(RouteManifest::from_yaml_str(two).is_err());
    }

    #[test]
    fn test_invalid_method_and_unknown_field() {
        let bad_method =
            "routes:\n  - name: a\n    path: /a\n    handler: A\n    methods: ['GE T']\n";
        assert!(RouteManifest::from_yaml_str(bad_method).is_err());

        let unknown = "routes:\n  - name: a\n    path: /a\n    handler: A\n    verb: GET\n";
        assert!(RouteManifest::from_yaml_str(unknown).is_err());
    }

    #[test]
    fn test_configuration_errors_surface_on_apply() {
        let manifest = RouteManifest::from_yaml_str(
            "routes:\n  - name: a\n    path: /a/{b?}/{c}\n    handler: A\n",
        )
        .unwrap();
        let admin = AdminNamespace::default();
        let mut routes = LiveRouteCollection::new();
        let mut registrar = Registrar::new(&mut routes, &admin);
        assert!(matches!(
            manifest.apply(&mut registrar),
            Err(RouteError::RequiredAfterOptional { .. })
        ));
    }

    #[test]
    fn test_from_file_by_extension() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();
        assert_eq!(RouteManifest::from_file(file.path()).unwrap().admin.len(), 1);

        let txt = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(RouteManifest::from_file(txt.path()).is_err());
    }
}
