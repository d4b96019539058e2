use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::file::CacheFile;
use crate::route::{RouteCollection, RouteError};
use crate::router::MatcherData;

/// Version written into every cache file; other versions are ignored.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Route cache failures.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file exists but could not be read
    #[error("failed to read route cache {location}: {source}")]
    Read {
        /// Cache location
        location: String,
        /// I/O error
        #[source]
        source: io::Error,
    },
    /// The cache file could not be written
    #[error("failed to write route cache {location}: {source}")]
    Write {
        /// Cache location
        location: String,
        /// I/O error
        #[source]
        source: io::Error,
    },
    /// The cache file could not be removed
    #[error("failed to remove route cache {location}: {source}")]
    Remove {
        /// Cache location
        location: String,
        /// I/O error
        #[source]
        source: io::Error,
    },
    /// The route table could not be serialized
    #[error("failed to encode route cache: {0}")]
    Encode(#[source] RouteError),
    /// The envelope could not be serialized
    #[error("failed to encode route cache: {0}")]
    EncodeEnvelope(#[source] serde_json::Error),
    /// The file is not a valid cache envelope
    #[error("route cache {location} is corrupt: {source}")]
    Decode {
        /// Cache location
        location: String,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },
    /// The file was written by an incompatible version
    #[error("route cache {location} has version {found}, expected {expected}")]
    VersionMismatch {
        /// Cache location
        location: String,
        /// Version in the file
        found: u32,
        /// Version this build writes
        expected: u32,
    },
}

/// Contents of a warm cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRoutes {
    /// `name -> serialized route`, hydrated lazily
    pub route_collection: BTreeMap<String, String>,
    /// Compiled matcher data
    pub fast_route: MatcherData,
}

#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    version: u32,
    route_collection: BTreeMap<String, String>,
    fast_route: MatcherData,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: Option<u32>,
}

/// Load/save of the compiled route table.
#[derive(Debug)]
pub struct RouteCache {
    file: Box<dyn CacheFile>,
}

impl RouteCache {
    /// Cache stored in `file`.
    #[must_use]
    pub fn new(file: Box<dyn CacheFile>) -> Self {
        Self { file }
    }

    /// Whether a cache file is present.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.file.exists()
    }

    /// Cache location, for logs and CLI output.
    #[must_use]
    pub fn location(&self) -> String {
        self.file.location()
    }

    /// Load the cache.
    ///
    /// A missing file is a cold cache (`Ok(None)`), not an error.
    ///
    /// # Errors
    ///
    /// Read failures, malformed envelopes (including missing keys), and
    /// version mismatches.
    pub fn load(&self) -> Result<Option<CachedRoutes>, CacheError> {
        if !self.file.exists() {
            debug!(location = %self.location(), "Route cache miss");
            return Ok(None);
        }
        let location = self.location();
        let bytes = self.file.read().map_err(|source| CacheError::Read {
            location: location.clone(),
            source,
        })?;

        let header: VersionHeader =
            serde_json::from_slice(&bytes).map_err(|source| CacheError::Decode {
                location: location.clone(),
                source,
            })?;
        let found = header.version.unwrap_or_default();
        if found != CACHE_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                location,
                found,
                expected: CACHE_FORMAT_VERSION,
            });
        }

        let envelope: CacheEnvelope =
            serde_json::from_slice(&bytes).map_err(|source| CacheError::Decode {
                location: location.clone(),
                source,
            })?;
        info!(
            location = %location,
            routes_count = envelope.route_collection.len(),
            bytes = bytes.len(),
            "Route cache hit"
        );
        Ok(Some(CachedRoutes {
            route_collection: envelope.route_collection,
            fast_route: envelope.fast_route,
        }))
    }

    /// Persist the route table and compiled matcher data.
    ///
    /// # Errors
    ///
    /// Serialization or write failures; callers treat these as fatal.
    pub fn save(
        &self,
        routes: &dyn RouteCollection,
        matcher: &MatcherData,
    ) -> Result<(), CacheError> {
        let envelope = CacheEnvelope {
            version: CACHE_FORMAT_VERSION,
            route_collection: routes.to_cached_form().map_err(CacheError::Encode)?,
            fast_route: matcher.clone(),
        };
        let bytes = serde_json::to_vec(&envelope).map_err(CacheError::EncodeEnvelope)?;
        self.file.write(&bytes).map_err(|source| CacheError::Write {
            location: self.location(),
            source,
        })?;
        info!(
            location = %self.location(),
            routes_count = envelope.route_collection.len(),
            bytes = bytes.len(),
            "Route cache written"
        );
        Ok(())
    }

    /// Delete the cache file.
    ///
    /// # Errors
    ///
    /// I/O failures other than the file being absent.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.file.remove().map_err(|source| CacheError::Remove {
            location: self.location(),
            source,
        })?;
        info!(location = %self.location(), "Route cache cleared");
        Ok(())
    }
}
