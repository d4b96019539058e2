//! # Router Module
//!
//! Compiles registered routes into a matcher and dispatches requests.
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: route patterns are lowered into [`MatcherData`]. Routes
//!    without placeholders become exact `(method, path)` entries; the others
//!    become anchored regexes with one named group per placeholder, where an
//!    optional tail turns into nested optional groups. The data is plain serde
//!    and is what the route cache stores.
//!
//! 2. **Matching**: [`Matcher`] checks the static table first, then asks a
//!    per-method `RegexSet` which dynamic routes match and extracts captures
//!    only for the candidates the dispatcher actually consumes. Candidates are
//!    yielded in registration order, so the first registered route wins; the
//!    fallback route is always compiled last.
//!
//! ## Example
//!
//! ```rust,ignore
//! use http::Method;
//! use wprouter::{Router, RouterConfig, RoutingRequest, DispatchOutcome};
//!
//! let mut router = Router::new(&RouterConfig::default())?;
//! router.routes(|r| {
//!     r.get("posts.show", "/posts/{slug}", "PostController@show")?;
//!     Ok(())
//! })?;
//!
//! match router.dispatch(&RoutingRequest::new(Method::GET, "/posts/hello"))? {
//!     DispatchOutcome::Matched(m) => assert_eq!(m.get_path_param("slug"), Some("hello")),
//!     other => panic!("unexpected outcome {other:?}"),
//! }
//! ```

mod compiler;
mod core;
mod error;
mod matcher;
#[cfg(test)]
mod tests;

pub use compiler::{compile, DynamicRouteData, MatcherData};
pub use core::Router;
pub use error::RouterError;
pub use matcher::{Candidate, Matcher, ParamVec, MAX_INLINE_PARAMS};
