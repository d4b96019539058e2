//! # Route Cache
//!
//! Persists the route table and the compiled matcher data to one JSON file:
//!
//! ```json
//! {"version": 1, "route_collection": {"name": "<route json>"}, "fast_route": {...}}
//! ```
//!
//! On a warm cache the router skips registration and compilation entirely
//! and hydrates routes from `route_collection` on first lookup. Read and
//! decode failures make the router recompile; write failures are fatal.
//! Writes replace the whole file. Concurrent cold boots may both write,
//! which is harmless because the content is deterministic for a given
//! registration set.

mod core;
mod file;

pub use core::{CacheError, CachedRoutes, RouteCache, CACHE_FORMAT_VERSION};
pub use file::{CacheFile, FsCacheFile};
