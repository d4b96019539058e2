use thiserror::Error;

/// Configuration error raised while routes are declared or looked up.
///
/// Everything here is fatal to boot: a route table that produced one of
/// these errors must not be used to serve requests.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Route names are lookup keys for reverse routing and may not be empty.
    #[error("Route name cannot be empty (path: {path}).")]
    EmptyName {
        /// Path the unnamed route was declared with
        path: String,
    },
    /// The name looks like a path, which almost always means the name and
    /// path arguments were swapped.
    #[error("Route name [{name}] starts with a forward slash. Did you pass the path as the name?")]
    NameLooksLikePath {
        /// The rejected name
        name: String,
    },
    /// A route must accept at least one HTTP method.
    #[error("Route [{name}] has no HTTP methods.")]
    NoMethods {
        /// Name of the offending route
        name: String,
    },
    /// The path pattern could not be parsed.
    #[error("Invalid route pattern [{pattern}]: {reason}")]
    InvalidPattern {
        /// The pattern as declared
        pattern: String,
        /// What is wrong with it
        reason: String,
    },
    /// A required placeholder follows an optional one.
    #[error("Route pattern [{pattern}] declares required placeholder [{placeholder}] after an optional one.")]
    RequiredAfterOptional {
        /// The pattern as declared
        pattern: String,
        /// The required placeholder found in the optional tail
        placeholder: String,
    },
    /// The same placeholder name appears twice in one pattern.
    #[error("Route pattern [{pattern}] uses placeholder [{placeholder}] more than once.")]
    DuplicatePlaceholder {
        /// The pattern as declared
        pattern: String,
        /// The repeated placeholder
        placeholder: String,
    },
    /// A requirement was added for a placeholder the pattern does not have.
    #[error("Route [{name}] has no placeholder [{placeholder}] to constrain.")]
    UnknownPlaceholder {
        /// Name of the route
        name: String,
        /// The placeholder named by the requirement
        placeholder: String,
    },
    /// A requirement is not a valid regular expression.
    #[error("Requirement [{requirement}] for placeholder [{placeholder}] of route [{name}] is not a valid regex: {reason}")]
    InvalidRequirement {
        /// Name of the route
        name: String,
        /// The constrained placeholder
        placeholder: String,
        /// The rejected regex fragment
        requirement: String,
        /// Regex compiler message
        reason: String,
    },
    /// The admin prefix must point at a PHP entry script.
    #[error("Admin prefix [{prefix}] must end with a .php entry script.")]
    InvalidAdminPrefix {
        /// The rejected prefix
        prefix: String,
    },
    /// An admin route repeated the admin prefix in its own path.
    #[error("Admin route [{name}] must not include the admin prefix [{prefix}] in its path [{path}].")]
    AdminPrefixInPath {
        /// Name of the admin route
        name: String,
        /// Path as declared
        path: String,
        /// The admin prefix
        prefix: String,
    },
    /// An admin route was declared outside of the admin area, or a regular
    /// route reached into the admin prefix.
    #[error("Route [{name}] with path [{path}] belongs to the admin area and must be declared inside it.")]
    AdminRouteOutsideNamespace {
        /// Name of the route
        name: String,
        /// Fully resolved path
        path: String,
    },
    /// An admin menu item names a parent that is not a top-level menu page.
    #[error("Admin page [{name}] declares unknown menu parent [{parent}].")]
    UnknownMenuParent {
        /// Name of the admin page
        name: String,
        /// The parent route name
        parent: String,
    },
    /// An admin menu sub-page was attached to another sub-page.
    #[error("Admin page [{name}] cannot be a sub-page of [{parent}], which is itself a sub-page.")]
    RecursiveSubPage {
        /// Name of the admin page
        name: String,
        /// The parent route name
        parent: String,
    },
    /// No route is registered under this name.
    #[error("There is no route with name [{name}].")]
    RouteNotFound {
        /// The requested name
        name: String,
    },
    /// Routes loaded from the cache are read-only.
    #[error("Route [{name}] cannot be added: the route collection was loaded from the cache and is sealed.")]
    SealedCollection {
        /// Name of the route that was being added
        name: String,
    },
    /// A cached route entry could not be deserialized.
    #[error("Deserialization of cached route [{name}] failed: {source}")]
    CorruptCachedRoute {
        /// Name of the cached route
        name: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },
    /// A route could not be serialized for the cache.
    #[error("Serialization of route [{name}] failed: {source}")]
    Serialization {
        /// Name of the route
        name: String,
        /// Underlying encode error
        #[source]
        source: serde_json::Error,
    },
}
