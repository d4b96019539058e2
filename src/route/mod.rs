//! # Route Module
//!
//! Route values, path patterns and the collections that store them.
//!
//! A [`Route`] describes one endpoint: a normalized path pattern with
//! `{required}` and `{optional?}` placeholders, the HTTP methods it accepts,
//! a [`Handler`] (controller action, built-in redirect/view, or the delegate
//! sentinel), a unique name used for reverse routing, middleware, placeholder
//! requirements, default values and condition blueprints.
//!
//! Routes are stored in a [`RouteCollection`]:
//!
//! - [`LiveRouteCollection`] is filled while registration closures run.
//! - [`CachedRouteCollection`] wraps the route table read from the route
//!   cache and hydrates each route on first lookup. It is sealed: `add`
//!   always fails.

mod collection;
mod core;
mod error;
mod pattern;

pub use collection::{CachedRouteCollection, LiveRouteCollection, RouteCollection};
pub use core::{parse_method, Handler, MiddlewareRef, Route, ANY_METHODS, INVOKABLE_METHOD};
pub use error::RouteError;
pub use pattern::{
    anchored, join_paths, normalize_path, strip_anchors, PatternToken, RoutePattern,
    DEFAULT_REQUIREMENT,
};
