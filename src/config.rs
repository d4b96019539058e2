//! # Router Configuration
//!
//! [`RouterConfig`] carries everything the router needs at boot: where the
//! route cache lives and whether it is used, the admin entry script, the
//! host/scheme/ports for absolute URLs, and the login page path.
//!
//! ## Sources
//!
//! - [`RouterConfig::default`]: no caching, `/wp-admin/admin.php`,
//!   `http://localhost`
//! - [`RouterConfig::from_env`]: environment variables (see below)
//! - [`RouterConfig::from_file`]: a YAML (`.yaml`/`.yml`) or JSON file; any
//!   key may be omitted
//!
//! ## Environment Variables
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `WPROUTER_CACHE_PATH` | Route cache file |
//! | `WPROUTER_CACHE` | `on`/`off`; defaults to `on` when a cache path is set |
//! | `WPROUTER_ADMIN_PREFIX` | Admin entry script, e.g. `/wp-admin/admin.php` |
//! | `WPROUTER_HOST` | Host for absolute URLs |
//! | `WPROUTER_HTTP_PORT` | Port for `http` URLs |
//! | `WPROUTER_HTTPS_PORT` | Port for `https` URLs |
//! | `WPROUTER_HTTPS` | `true` to generate `https` URLs by default |
//! | `WPROUTER_LOGIN_PATH` | Fallback login page path |
//!
//! Unparseable values are ignored and the default is kept.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::admin::DEFAULT_ADMIN_PREFIX;
use crate::url::{UrlGenerationContext, DEFAULT_LOGIN_PATH};

/// Boot-time router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Route cache file
    pub cache_path: Option<PathBuf>,
    /// Whether the route cache is read and written
    pub caching: bool,
    /// Admin entry script
    pub admin_prefix: String,
    /// Host, scheme and ports for absolute URLs
    pub url: UrlGenerationContext,
    /// Login page used when no login route is registered
    pub login_path: String,
    /// Leave `&` and `=` unescaped in generated query strings
    pub raw_query_delimiters: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cache_path: None,
            caching: false,
            admin_prefix: DEFAULT_ADMIN_PREFIX.to_string(),
            url: UrlGenerationContext::default(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            raw_query_delimiters: false,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = var("WPROUTER_CACHE_PATH") {
            config.cache_path = Some(PathBuf::from(path));
            config.caching = true;
        }
        if let Some(flag) = var("WPROUTER_CACHE").and_then(|v| parse_switch(&v)) {
            config.caching = flag;
        }
        if let Some(prefix) = var("WPROUTER_ADMIN_PREFIX") {
            config.admin_prefix = prefix;
        }
        if let Some(host) = var("WPROUTER_HOST") {
            config.url.host = host;
        }
        if let Some(port) = var("WPROUTER_HTTP_PORT").and_then(|v| v.trim().parse().ok()) {
            config.url.http_port = port;
        }
        if let Some(port) = var("WPROUTER_HTTPS_PORT").and_then(|v| v.trim().parse().ok()) {
            config.url.https_port = port;
        }
        if let Some(https) = var("WPROUTER_HTTPS").and_then(|v| parse_switch(&v)) {
            config.url.https_by_default = https;
        }
        if let Some(login) = var("WPROUTER_LOGIN_PATH") {
            config.login_path = login;
        }
        config
    }

    /// Load configuration from a YAML or JSON file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Unreadable files, unknown extensions, and parse errors.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read router config {}", path.display()))?;
        let config = match extension(path).as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML in {}", path.display()))?,
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON in {}", path.display()))?,
            _ => bail!(
                "unsupported config format for {}; expected .yaml, .yml or .json",
                path.display()
            ),
        };
        Ok(config)
    }

    /// Enable caching at `path`.
    #[must_use]
    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self.caching = true;
        self
    }
}

pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
