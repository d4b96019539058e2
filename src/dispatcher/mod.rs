//! # Dispatcher Module
//!
//! Turns a request into one of four outcomes:
//!
//! - [`DispatchOutcome::Matched`]: a route matched and its conditions hold
//! - [`DispatchOutcome::NotFound`]: no route matches the path
//! - [`DispatchOutcome::MethodNotAllowed`]: the path matches under other
//!   methods only; the allowed methods are listed
//! - [`DispatchOutcome::Delegated`]: the matching route is reserved for the
//!   host, which must handle the request itself
//!
//! ## Request Flow
//!
//! 1. The matcher yields candidates for the method and routing path (static
//!    routes first, then dynamic routes in registration order)
//! 2. Each candidate's conditions are resolved (once per route) and evaluated
//! 3. The first candidate whose conditions hold wins
//! 4. With no winner, the path is re-checked under every method to tell
//!    "not found" from "method not allowed"
//!
//! A path that matches under the request's own method but whose routes all
//! rejected the request through conditions is reported as not found.

mod core;

pub use core::{DispatchOutcome, Dispatcher, RouteMatch};
