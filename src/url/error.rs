use thiserror::Error;

use crate::route::RouteError;

/// Reverse routing failures.
#[derive(Debug, Error)]
pub enum UrlGenerationError {
    /// No route is registered under the name
    #[error("no route named '{name}'")]
    RouteNotFound {
        /// Requested route name
        name: String,
    },
    /// A required placeholder had no value
    #[error("route '{route}' requires parameter '{param}'")]
    MissingParameter {
        /// Route name
        route: String,
        /// Placeholder name
        param: String,
    },
    /// A value does not satisfy the placeholder requirement
    #[error("parameter '{param}' of route '{route}' must match '{pattern}', got '{value}'")]
    BadParameter {
        /// Route name
        route: String,
        /// Placeholder name
        param: String,
        /// Requirement regex
        pattern: String,
        /// Rejected value
        value: String,
    },
    /// The route could not be read from the collection
    #[error(transparent)]
    Route(#[from] RouteError),
}
