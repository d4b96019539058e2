//! # Route Conditions
//!
//! Conditions are boolean predicates evaluated against a request after its
//! path matched a route. They let two routes share a path while answering
//! different requests, e.g. an admin page that only applies when the host
//! is rendering the dashboard.
//!
//! Routes carry [`ConditionBlueprint`]s (class reference, arguments,
//! negation flag). The dispatcher turns them into [`RouteCondition`]
//! instances through a [`ConditionResolver`]; [`ConditionRegistry`] is the
//! stock resolver and knows the built-in [`IsAdminDashboardRequest`] and
//! [`IsAdminAreaPath`].

mod core;
mod registry;
#[cfg(test)]
mod tests;

pub use core::{
    ConditionBlueprint, IsAdminAreaPath, IsAdminDashboardRequest, Negate, RouteCondition,
    IS_ADMIN_AREA_PATH, IS_ADMIN_DASHBOARD_REQUEST,
};
pub use registry::{
    build_condition, ConditionFactory, ConditionRegistry, ConditionResolver, ResolutionError,
};
