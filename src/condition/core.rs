use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::admin::AdminNamespace;
use crate::request::RoutingRequest;

/// Registry key of [`IsAdminDashboardRequest`].
pub const IS_ADMIN_DASHBOARD_REQUEST: &str = "is_admin_dashboard_request";

/// Registry key of [`IsAdminAreaPath`].
pub const IS_ADMIN_AREA_PATH: &str = "is_admin_area_path";

/// Predicate evaluated after a route matched structurally.
///
/// A failing condition makes the matcher skip the route and try the next
/// candidate. Arguments extracted from a satisfied condition are handed to
/// the route handler alongside the path parameters.
pub trait RouteCondition: Send + Sync + fmt::Debug {
    /// Whether the request satisfies the condition.
    fn is_satisfied(&self, request: &RoutingRequest) -> bool;

    /// Ordered values extracted from the request for the handler.
    fn arguments(&self, _request: &RoutingRequest) -> Vec<Value> {
        Vec::new()
    }
}

/// Inverts another condition. Argument extraction is delegated unchanged.
#[derive(Debug)]
pub struct Negate {
    inner: Box<dyn RouteCondition>,
}

impl Negate {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: Box<dyn RouteCondition>) -> Self {
        Self { inner }
    }
}

impl RouteCondition for Negate {
    fn is_satisfied(&self, request: &RoutingRequest) -> bool {
        !self.inner.is_satisfied(request)
    }

    fn arguments(&self, request: &RoutingRequest) -> Vec<Value> {
        self.inner.arguments(request)
    }
}

/// Satisfied by requests the host serves through the admin dashboard.
#[derive(Debug, Clone)]
pub struct IsAdminDashboardRequest {
    admin: AdminNamespace,
}

impl IsAdminDashboardRequest {
    /// Condition bound to an admin namespace.
    #[must_use]
    pub fn new(admin: AdminNamespace) -> Self {
        Self { admin }
    }
}

impl RouteCondition for IsAdminDashboardRequest {
    fn is_satisfied(&self, request: &RoutingRequest) -> bool {
        self.admin.goes_to(request)
    }
}

/// Satisfied by request paths inside the admin directory, whatever script
/// the host reports as loading them.
#[derive(Debug, Clone)]
pub struct IsAdminAreaPath {
    admin: AdminNamespace,
}

impl IsAdminAreaPath {
    /// Condition bound to an admin namespace.
    #[must_use]
    pub fn new(admin: AdminNamespace) -> Self {
        Self { admin }
    }
}

impl RouteCondition for IsAdminAreaPath {
    fn is_satisfied(&self, request: &RoutingRequest) -> bool {
        self.admin.owns_dir_path(request.path())
    }
}

/// Serializable description of a condition: which class to build, its
/// explicit constructor arguments and whether to negate the result.
///
/// Routes store blueprints rather than conditions so they can be cached;
/// the dispatcher resolves each blueprint once per route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionBlueprint {
    class: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    negated: bool,
}

impl ConditionBlueprint {
    /// Blueprint for `class` with no arguments.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            args: Vec::new(),
            negated: false,
        }
    }

    /// Replace the constructor arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Flip the negation flag.
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Condition class reference
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Explicit constructor arguments
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Whether the built condition is wrapped in [`Negate`].
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}
