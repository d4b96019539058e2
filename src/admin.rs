//! Admin dashboard namespace.
//!
//! Admin routes are declared under a logical root such as
//! `/wp-admin/admin.php/reports/monthly`, but the host serves every admin
//! screen through one physical entry script addressed by a `page` query
//! parameter (`/wp-admin/admin.php?page=reports/monthly`). [`AdminNamespace`]
//! rewrites between the two forms: incoming requests are turned into the
//! logical path before matching, and generated URLs are turned back into the
//! physical form.

use serde::{Deserialize, Serialize};

use crate::request::RoutingRequest;
use crate::route::{normalize_path, RouteError};

/// Default admin entry script.
pub const DEFAULT_ADMIN_PREFIX: &str = "/wp-admin/admin.php";

/// Query parameter that carries the admin page.
pub const PAGE_PARAM: &str = "page";

/// Script the host uses for AJAX sub-requests from the dashboard.
pub const AJAX_SCRIPT: &str = "admin-ajax.php";

const ENTRY_SCRIPT_MARKER: &str = ".php/";

/// Rewrites between logical admin routes and the physical entry script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminNamespace {
    prefix: String,
    dir: String,
}

impl AdminNamespace {
    /// Create the namespace for an entry script path such as
    /// `/wp-admin/admin.php`.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidAdminPrefix`] when the path does not name a
    /// `.php` script.
    pub fn new(prefix: &str) -> Result<Self, RouteError> {
        let prefix = normalize_path(prefix);
        if prefix == "/" || !prefix.ends_with(".php") {
            return Err(RouteError::InvalidAdminPrefix { prefix });
        }
        let dir = match prefix.rfind('/') {
            Some(0) | None => "/".to_string(),
            Some(slash) => prefix[..slash].to_string(),
        };
        Ok(Self { prefix, dir })
    }

    /// The entry script path, e.g. `/wp-admin/admin.php`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Directory holding the admin scripts, e.g. `/wp-admin`.
    #[must_use]
    pub fn admin_dir(&self) -> &str {
        &self.dir
    }

    /// File name of the entry script, e.g. `admin.php`.
    #[must_use]
    pub fn entry_script(&self) -> &str {
        self.prefix
            .rsplit('/')
            .next()
            .unwrap_or(self.prefix.as_str())
    }

    /// Whether `path` is exactly the entry script.
    #[must_use]
    pub fn is_entry_point(&self, path: &str) -> bool {
        normalize_path(path) == self.prefix
    }

    /// Whether `path` lies inside the logical admin namespace.
    #[must_use]
    pub fn owns_path(&self, path: &str) -> bool {
        path == self.prefix
            || path
                .strip_prefix(self.prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Turn an incoming request path into the logical path used for matching.
    ///
    /// Without a `page` value the path is returned unchanged.
    #[must_use]
    pub fn rewrite_for_routing(&self, path: &str, page: Option<&str>) -> String {
        match page.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
            Some(page) => normalize_path(&format!("{}/{}", path.trim_end_matches('/'), page)),
            None => path.to_string(),
        }
    }

    /// Split a logical admin path into the physical script path and the
    /// query parameters that address the page.
    ///
    /// Paths without the entry script marker are returned as is.
    #[must_use]
    pub fn rewrite_for_url_generation(&self, path: &str) -> (String, Vec<(String, String)>) {
        match path.find(ENTRY_SCRIPT_MARKER) {
            Some(at) => {
                let script_end = at + ENTRY_SCRIPT_MARKER.len() - 1;
                let page = path[script_end + 1..].trim_matches('/');
                let mut extra = Vec::with_capacity(1);
                if !page.is_empty() {
                    extra.push((PAGE_PARAM.to_string(), page.to_string()));
                }
                (path[..script_end].to_string(), extra)
            }
            None => (path.to_string(), Vec::new()),
        }
    }

    /// Whether the host is serving `request` through the admin dashboard.
    ///
    /// AJAX sub-requests never belong to the namespace, even when they are
    /// loaded by an admin script.
    #[must_use]
    pub fn goes_to(&self, request: &RoutingRequest) -> bool {
        if request.is_ajax() {
            return false;
        }
        let script = normalize_path(request.loading_script().unwrap_or_else(|| request.path()));
        if script.ends_with(AJAX_SCRIPT) {
            return false;
        }
        self.owns_path(&script) || self.owns_dir_path(&script)
    }

    /// Whether `path` lies inside the admin directory, e.g. `/wp-admin/edit.php`.
    #[must_use]
    pub fn owns_dir_path(&self, path: &str) -> bool {
        self.dir != "/"
            && normalize_path(path)
                .strip_prefix(self.dir.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

impl Default for AdminNamespace {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ADMIN_PREFIX.to_string(),
            dir: "/wp-admin".to_string(),
        }
    }
}

/// Dashboard menu entry attached to an admin page route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Text shown in the browser title
    pub page_title: String,
    /// Text shown in the menu
    pub menu_title: String,
    /// Capability required to see the entry
    pub capability: String,
    /// Dashicon name or icon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Menu position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    /// Route name of the parent page for sub-pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl MenuItem {
    /// Menu entry with the same page and menu title, visible to administrators.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            page_title: title.clone(),
            menu_title: title,
            capability: "manage_options".to_string(),
            icon: None,
            position: None,
            parent: None,
        }
    }

    /// Use a different text in the menu.
    #[must_use]
    pub fn with_menu_title(mut self, menu_title: impl Into<String>) -> Self {
        self.menu_title = menu_title.into();
        self
    }

    /// Require a different capability.
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = capability.into();
        self
    }

    /// Set the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the menu position.
    #[must_use]
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    /// Make this a sub-page of the page registered under `parent`.
    #[must_use]
    pub fn sub_page_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}
