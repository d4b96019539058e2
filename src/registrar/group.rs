use serde::{Deserialize, Serialize};

use crate::route::{join_paths, MiddlewareRef};

/// Attributes shared by every route registered inside a group closure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteGroup {
    #[serde(default)]
    prefix: String,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    middleware: Vec<MiddlewareRef>,
}

impl RouteGroup {
    /// Group without attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path prefix prepended to every route path.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Name prefix joined to every route name with `.`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Namespace applied to routes that do not declare their own.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Append one middleware reference.
    #[must_use]
    pub fn with_middleware(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.middleware.push(middleware.into());
        self
    }

    /// Path prefix
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Dot-joined name prefix
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace hint
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Middleware, outermost first
    #[must_use]
    pub fn middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }

    /// Resolve this group inside `parent`.
    ///
    /// Middleware is concatenated with the parent's first, names are joined
    /// with `.`, the parent prefix is prepended, and the child namespace wins
    /// when both declare one.
    #[must_use]
    pub fn merge_with(&self, parent: &RouteGroup) -> RouteGroup {
        let mut middleware = Vec::with_capacity(parent.middleware.len() + self.middleware.len());
        middleware.extend(parent.middleware.iter().cloned());
        middleware.extend(self.middleware.iter().cloned());

        RouteGroup {
            prefix: join_paths(&parent.prefix, &self.prefix),
            name: join_names(&parent.name, &self.name),
            namespace: self.namespace.clone().or_else(|| parent.namespace.clone()),
            middleware,
        }
    }

    /// Full route name for `name` registered in this group.
    pub(crate) fn route_name(&self, name: &str) -> String {
        if self.name.is_empty() {
            name.to_string()
        } else {
            join_names(&self.name, name)
        }
    }
}

fn join_names(parent: &str, child: &str) -> String {
    [parent, child]
        .iter()
        .map(|part| part.trim_matches('.'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}
