use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::core::{
    ConditionBlueprint, IsAdminAreaPath, IsAdminDashboardRequest, Negate, RouteCondition,
    IS_ADMIN_AREA_PATH, IS_ADMIN_DASHBOARD_REQUEST,
};
use crate::admin::AdminNamespace;

/// A condition blueprint could not be turned into a condition.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// No factory is registered for the class
    #[error("no condition registered as '{class}'")]
    UnknownCondition {
        /// Requested class
        class: String,
    },
    /// The factory rejected the blueprint arguments
    #[error("invalid arguments for condition '{class}': {reason}")]
    InvalidArguments {
        /// Requested class
        class: String,
        /// What was wrong
        reason: String,
    },
}

/// Builds conditions from a class reference and explicit arguments.
pub trait ConditionResolver: Send + Sync {
    /// Construct the condition named `class`.
    ///
    /// # Errors
    ///
    /// [`ResolutionError`] when the class is unknown or the arguments are
    /// unusable.
    fn resolve(
        &self,
        class: &str,
        args: &[Value],
    ) -> Result<Box<dyn RouteCondition>, ResolutionError>;
}

/// Factory stored in a [`ConditionRegistry`].
pub type ConditionFactory =
    Box<dyn Fn(&[Value]) -> Result<Box<dyn RouteCondition>, ResolutionError> + Send + Sync>;

/// Name-keyed condition factories.
#[derive(Default)]
pub struct ConditionRegistry {
    factories: HashMap<String, ConditionFactory>,
}

impl ConditionRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in admin conditions.
    #[must_use]
    pub fn with_admin(admin: &AdminNamespace) -> Self {
        let mut registry = Self::new();
        let dashboard = admin.clone();
        registry.register(IS_ADMIN_DASHBOARD_REQUEST, move |args| {
            expect_no_arguments(IS_ADMIN_DASHBOARD_REQUEST, args)?;
            Ok(Box::new(IsAdminDashboardRequest::new(dashboard.clone())) as Box<dyn RouteCondition>)
        });
        let area = admin.clone();
        registry.register(IS_ADMIN_AREA_PATH, move |args| {
            expect_no_arguments(IS_ADMIN_AREA_PATH, args)?;
            Ok(Box::new(IsAdminAreaPath::new(area.clone())) as Box<dyn RouteCondition>)
        });
        registry
    }

    /// Register (or replace) the factory for `class`.
    pub fn register<F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Box<dyn RouteCondition>, ResolutionError> + Send + Sync + 'static,
    {
        self.factories.insert(class.into(), Box::new(factory));
        self
    }

    /// Whether a factory is registered for `class`.
    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.factories.contains_key(class)
    }
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        classes.sort_unstable();
        f.debug_struct("ConditionRegistry")
            .field("classes", &classes)
            .finish()
    }
}

impl ConditionResolver for ConditionRegistry {
    fn resolve(
        &self,
        class: &str,
        args: &[Value],
    ) -> Result<Box<dyn RouteCondition>, ResolutionError> {
        let factory = self
            .factories
            .get(class)
            .ok_or_else(|| ResolutionError::UnknownCondition {
                class: class.to_string(),
            })?;
        debug!(class = %class, args = args.len(), "Resolving route condition");
        factory(args)
    }
}

fn expect_no_arguments(class: &str, args: &[Value]) -> Result<(), ResolutionError> {
    if args.is_empty() {
        return Ok(());
    }
    Err(ResolutionError::InvalidArguments {
        class: class.to_string(),
        reason: format!("expected no arguments, got {}", args.len()),
    })
}

/// Build the condition described by `blueprint`, wrapping it in [`Negate`]
/// when the blueprint is negated.
///
/// # Errors
///
/// Propagates the resolver's [`ResolutionError`].
pub fn build_condition(
    resolver: &dyn ConditionResolver,
    blueprint: &ConditionBlueprint,
) -> Result<Box<dyn RouteCondition>, ResolutionError> {
    let condition = resolver.resolve(blueprint.class(), blueprint.args())?;
    if blueprint.is_negated() {
        Ok(Box::new(Negate::new(condition)))
    } else {
        Ok(condition)
    }
}
