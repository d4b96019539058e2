//! # CLI Module
//!
//! Command-line access to a route manifest and its cache.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List routes in match order (`--menu` prints the admin menu instead):
//!
//! ```bash
//! wprouter --manifest routes.yaml routes
//! ```
//!
//! ### `match`
//!
//! Dispatch a synthetic request:
//!
//! ```bash
//! wprouter -m routes.yaml match GET /posts/hello
//! wprouter -m routes.yaml match GET '/wp-admin/admin.php?page=settings' --admin
//! ```
//!
//! ### `url`
//!
//! Reverse-route a name:
//!
//! ```bash
//! wprouter -m routes.yaml url posts.show slug=hello --absolute
//! ```
//!
//! ### `cache`
//!
//! ```bash
//! WPROUTER_CACHE_PATH=var/routes.json wprouter -m routes.yaml cache warm
//! WPROUTER_CACHE_PATH=var/routes.json wprouter cache status
//! WPROUTER_CACHE_PATH=var/routes.json wprouter cache clear
//! ```
//!
//! With a warm cache, `routes`, `match` and `url` do not need a manifest.

mod commands;


pub use commands::{execute, run_cli, CacheCommand, Cli, Commands};
