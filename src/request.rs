//! Request view consumed by the router.
//!
//! The host (a web server, a WordPress bridge, a test) builds a
//! [`RoutingRequest`] from whatever request representation it has. The router
//! only needs the method, the decoded path, the query parameters, the
//! scheme/host/port triple, and two pieces of admin metadata: which script is
//! loading the request and whether it is an internal AJAX sub-request.

use http::Method;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::route::normalize_path;

/// A request as seen by the matcher and the route conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    scheme: String,
    host: Option<String>,
    port: Option<u16>,
    loading_script: Option<String>,
    ajax: bool,
}

impl RoutingRequest {
    /// Build a request from a method and a URI.
    ///
    /// The URI may be origin-form (`/path?query`) or absolute
    /// (`https://host:port/path?query`). The path is percent-decoded and
    /// normalized; the fragment, if any, is dropped.
    #[must_use]
    pub fn new(method: Method, uri: &str) -> Self {
        if let Some(request) = Self::from_absolute(method.clone(), uri) {
            return request;
        }

        let without_fragment = uri.split_once('#').map_or(uri, |(before, _)| before);
        let (raw_path, raw_query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };

        Self {
            method,
            path: decode_path(raw_path),
            query: parse_query_params(raw_query),
            scheme: "http".to_string(),
            host: None,
            port: None,
            loading_script: None,
            ajax: false,
        }
    }

    fn from_absolute(method: Method, uri: &str) -> Option<Self> {
        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            return None;
        }
        let url = Url::parse(uri).ok()?;
        Some(Self {
            method,
            path: decode_path(url.path()),
            query: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            scheme: url.scheme().to_string(),
            host: url.host_str().map(str::to_string),
            port: url.port(),
            loading_script: None,
            ajax: false,
        })
    }

    /// Set the `Host` the request was addressed to.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the request scheme (`http` or `https`).
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into().to_ascii_lowercase();
        self
    }

    /// Set the port the request arrived on.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Record the physical script the host is executing for this request.
    #[must_use]
    pub fn with_loading_script(mut self, script: impl Into<String>) -> Self {
        self.loading_script = Some(script.into());
        self
    }

    /// Mark the request as an internal AJAX sub-request.
    #[must_use]
    pub fn with_ajax(mut self, ajax: bool) -> Self {
        self.ajax = ajax;
        self
    }

    /// HTTP method
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Decoded, normalized path
    ///
    /// `%2F` and `%25` stay escaped so an encoded `/` never splits a segment.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in request order
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: `?page=a&page=b` yields `b`.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Request scheme, lowercase
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// `true` for `https` requests.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.scheme == "https"
    }

    /// Host, when known
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Port, when known
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The physical script loading this request, when the host reports one.
    #[must_use]
    pub fn loading_script(&self) -> Option<&str> {
        self.loading_script.as_deref()
    }

    /// Whether this is an internal AJAX sub-request.
    #[must_use]
    pub fn is_ajax(&self) -> bool {
        self.ajax
    }
}

/// Parse a raw query string (without the leading `?`) into ordered pairs.
#[must_use]
pub fn parse_query_params(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return Vec::new();
    }
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Percent-decode a request path, except for `%2F` and `%25`.
///
/// An escaped `/` inside a segment must not become a separator, and an
/// escaped `%` must not be decoded twice. Both stay escaped (uppercased) in
/// the routing path; the matcher decodes them inside captured values.
fn decode_path(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut decoded = String::with_capacity(raw.len());
    let mut start = 0;
    let mut i = 0;
    while i + 2 < bytes.len() {
        let hex = &bytes[i + 1..i + 3];
        let kept = hex.eq_ignore_ascii_case(b"2f") || hex.eq_ignore_ascii_case(b"25");
        if bytes[i] == b'%' && kept {
            decoded.push_str(&percent_decode_str(&raw[start..i]).decode_utf8_lossy());
            decoded.push('%');
            decoded.push(char::from(hex[0]));
            decoded.push(char::from(hex[1].to_ascii_uppercase()));
            i += 3;
            start = i;
        } else {
            i += 1;
        }
    }
    decoded.push_str(&percent_decode_str(&raw[start..]).decode_utf8_lossy());
    normalize_path(&decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_form() {
        let req = RoutingRequest::new(Method::GET, "/foo%20bar/baz/?a=1&b=two+words#frag");
        assert_eq!(req.path(), "/foo bar/baz");
        assert_eq!(req.query_param("a"), Some("1"));
        assert_eq!(req.query_param("b"), Some("two words"));
        assert_eq!(req.scheme(), "http");
        assert_eq!(req.host(), None);
    }

    #[test]
    fn test_escaped_separators_stay_escaped() {
        let req = RoutingRequest::new(Method::GET, "/files/a%20b%2fc%25d%C3%A9");
        assert_eq!(req.path(), "/files/a b%2Fc%25dé");

        let req = RoutingRequest::new(Method::GET, "https://example.com/x/%2F%20");
        assert_eq!(req.path(), "/x/%2F ");

        assert_eq!(RoutingRequest::new(Method::GET, "/100%").path(), "/100%");
    }

    #[test]
    fn test_absolute_form() {
        let req = RoutingRequest::new(
            Method::POST,
            "https://example.com:8443/wp-admin/admin.php?page=foo",
        );
        assert_eq!(req.path(), "/wp-admin/admin.php");
        assert_eq!(req.query_param("page"), Some("foo"));
        assert!(req.is_secure());
        assert_eq!(req.host(), Some("example.com"));
        assert_eq!(req.port(), Some(8443));
    }

    #[test]
    fn test_query_last_write_wins() {
        let req = RoutingRequest::new(Method::GET, "/?page=a&page=b");
        assert_eq!(req.query().len(), 2);
        assert_eq!(req.query_param("page"), Some("b"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_builders() {
        let req = RoutingRequest::new(Method::GET, "/")
            .with_host("example.org")
            .with_scheme("HTTPS")
            .with_port(443)
            .with_loading_script("/wp-admin/admin-ajax.php")
            .with_ajax(true);
        assert!(req.is_secure());
        assert_eq!(req.port(), Some(443));
        assert_eq!(req.loading_script(), Some("/wp-admin/admin-ajax.php"));
        assert!(req.is_ajax());
    }
}
