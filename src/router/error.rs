use thiserror::Error;

use crate::cache::CacheError;
use crate::condition::ResolutionError;
use crate::route::RouteError;
use crate::url::UrlGenerationError;

/// Failures surfaced by [`super::Router`].
///
/// Not-found and method-not-allowed are dispatch outcomes, not errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A configuration error raised during registration or route lookup
    #[error(transparent)]
    Route(#[from] RouteError),
    /// Compiled matcher data contains a regex that does not compile
    #[error("invalid matcher data for method {method}: {source}")]
    InvalidMatcher {
        /// Method whose table failed
        method: String,
        /// Regex compilation error
        #[source]
        source: regex::Error,
    },
    /// The route cache could not be written
    #[error(transparent)]
    Cache(#[from] CacheError),
    /// A route condition could not be resolved
    #[error("route '{route}': {source}")]
    Condition {
        /// Route carrying the condition
        route: String,
        /// Resolver failure
        #[source]
        source: ResolutionError,
    },
    /// Reverse routing failed
    #[error(transparent)]
    Url(#[from] UrlGenerationError),
}
