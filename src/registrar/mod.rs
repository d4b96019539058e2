//! # Registrar Module
//!
//! Route registration with hierarchical group attributes.
//!
//! A [`Registrar`] is handed to registration closures. It keeps an explicit
//! stack of [`RouteGroup`]s: `group()` merges the new attributes into the
//! current top of the stack, runs the nested closure, and pops the group
//! again. Every route registered in between inherits the merged prefix,
//! dotted name, namespace and middleware.
//!
//! ```rust,ignore
//! router.routes(|r| {
//!     r.group(RouteGroup::new().with_prefix("/api").with_name("api"), |r| {
//!         r.get("users.show", "/users/{id}", "UserController@show")?
//!             .require_num("id")?;
//!         Ok(())
//!     })
//! })?;
//! ```

mod core;
mod group;

pub use core::{Registrar, FALLBACK_ROUTE};
pub use group::RouteGroup;
