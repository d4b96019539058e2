use serde::{Deserialize, Serialize};

/// Default scheme, host and ports for absolute URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlGenerationContext {
    /// Host name, without scheme or port
    pub host: String,
    /// Port used for `http` URLs
    pub http_port: u16,
    /// Port used for `https` URLs
    pub https_port: u16,
    /// Generate `https` URLs unless told otherwise
    pub https_by_default: bool,
}

impl Default for UrlGenerationContext {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            http_port: 80,
            https_port: 443,
            https_by_default: false,
        }
    }
}

impl UrlGenerationContext {
    /// Context for `host` with conventional ports.
    pub fn new(host: impl Into<String>, https_by_default: bool) -> Self {
        Self {
            host: host.into(),
            https_by_default,
            ..Self::default()
        }
    }

    /// `scheme://host[:port]` for the requested security, omitting the
    /// port when it is the scheme's default.
    #[must_use]
    pub fn base_url(&self, secure: bool) -> String {
        let (scheme, port, default_port) = if secure {
            ("https", self.https_port, 443)
        } else {
            ("http", self.http_port, 80)
        };
        if port == default_port {
            format!("{scheme}://{}", self.host)
        } else {
            format!("{scheme}://{}:{port}", self.host)
        }
    }
}
