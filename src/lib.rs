//! # wprouter
//!
//! **wprouter** is the routing core of a WordPress-hosted application
//! framework: route registration with nested groups, compiled request
//! dispatch, reverse routing, an admin-dashboard namespace, and an on-disk
//! route cache that lets a warm boot skip registration and compilation.
//!
//! ## Architecture
//!
//! - **[`route`]** - Routes, path patterns and name-indexed route collections
//! - **[`registrar`]** - The registration API: verbs, groups, admin pages
//! - **[`router`]** - Compilation to matcher data and the [`Router`] front door
//! - **[`dispatcher`]** - Turns matcher candidates into a [`DispatchOutcome`]
//! - **[`condition`]** - Match-time route conditions and their resolver
//! - **[`url`]** - URL generation with RFC 3986 encoding
//! - **[`admin`]** - The admin dashboard routing namespace and menu entries
//! - **[`cache`]** - The versioned route cache file
//! - **[`request`]** - The request view the router matches against
//! - **[`config`]**, **[`manifest`]**, **[`logging`]**, **[`cli`]** - Edges
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Router
//!     participant Matcher
//!     participant Dispatcher
//!     participant Conditions
//!
//!     Host->>Router: dispatch(GET /posts/hello)
//!     Router->>Router: admin rewrite (admin.php?page=x -> admin.php/x)
//!     Router->>Matcher: candidates(GET, path)
//!     Matcher-->>Dispatcher: static hits, then RegexSet hits in order
//!     Dispatcher->>Conditions: is_satisfied(request)?
//!     alt condition fails
//!         Conditions-->>Dispatcher: next candidate
//!     end
//!     Dispatcher-->>Host: MATCHED / DELEGATED / METHOD_NOT_ALLOWED / NOT_FOUND
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use http::Method;
//! use wprouter::{DispatchOutcome, Router, RouterConfig, RoutingRequest, UrlType};
//!
//! let mut router = Router::new(&RouterConfig::default())?;
//! router.routes(|r| {
//!     r.get("home", "/", "HomeController")?;
//!     r.get("posts.show", "/posts/{slug}", "PostController@show")?;
//!     r.delegate("feed", "/feed", &[Method::GET])?;
//!     r.admin(|r| {
//!         r.page("settings", "/settings", "SettingsController", None)?;
//!         Ok(())
//!     })
//! })?;
//!
//! let outcome = router.dispatch(&RoutingRequest::new(Method::GET, "/posts/hello"))?;
//! assert!(matches!(outcome, DispatchOutcome::Matched(_)));
//!
//! let url = router.url_to_route("posts.show", &[("slug", "hello")], UrlType::AbsolutePath, None)?;
//! assert_eq!(url, "/posts/hello");
//! ```
//!
//! ## Route Cache
//!
//! With caching enabled, the first dispatch after a cold boot compiles the
//! routes and writes them to the cache file. Later boots load that file,
//! skip registration entirely, and hydrate each route only when it is first
//! matched or addressed by name. Deleting the file (`wprouter cache clear`)
//! is how a deployment invalidates it.

pub mod admin;
pub mod cache;
pub mod cli;
pub mod condition;
pub mod config;
pub mod dispatcher;
pub mod logging;
pub mod manifest;
pub mod registrar;
pub mod request;
pub mod route;
pub mod router;
pub mod url;

pub use admin::{AdminNamespace, MenuItem};
pub use cache::{CacheError, RouteCache};
pub use condition::{ConditionBlueprint, ConditionRegistry, ConditionResolver, RouteCondition};
pub use config::RouterConfig;
pub use dispatcher::{DispatchOutcome, RouteMatch};
pub use manifest::RouteManifest;
pub use registrar::{Registrar, RouteGroup};
pub use request::RoutingRequest;
pub use route::{Handler, Route, RouteCollection, RouteError};
pub use router::{Router, RouterError};
pub use crate::url::{
    Rfc3986Encoder, UrlEncoder, UrlGenerationContext, UrlGenerationError, UrlGenerator, UrlType,
};
