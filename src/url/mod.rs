//! # URL Module
//!
//! Reverse routing: route name + parameters -> URL.
//!
//! - [`UrlGenerator::to_route`] substitutes placeholders, validates values
//!   against their requirements, drops a missing optional tail, appends
//!   unused parameters as a query string and rewrites admin routes to the
//!   physical entry script.
//! - [`UrlGenerator::to`] builds URLs for literal paths, merging any query
//!   string already present with extra parameters.
//! - [`UrlGenerator::to_login`] resolves the login page.
//!
//! Every component is percent-encoded per RFC 3986 by a [`UrlEncoder`];
//! [`Rfc3986Encoder`] is the stock implementation. The reserved
//! [`FRAGMENT_KEY`] parameter sets the `#fragment`.

mod context;
mod encoder;
mod error;
mod generator;

pub use context::UrlGenerationContext;
pub use encoder::{Rfc3986Encoder, UrlEncoder};
pub use error::UrlGenerationError;
pub use generator::{UrlGenerator, UrlType, DEFAULT_LOGIN_PATH, FRAGMENT_KEY, LOGIN_ROUTES};
