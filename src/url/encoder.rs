//! RFC 3986 percent-encoding for generated URLs.
//!
//! Every component is encoded against its `pchar`-based character set:
//!
//! ```text
//! pchar      = unreserved / pct-encoded / sub-delims / ":" / "@"
//! unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
//! sub-delims = "!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="
//! segment    = *pchar
//! query      = *( pchar / "/" / "?" )
//! fragment   = *( pchar / "/" / "?" )
//! ```
//!
//! Query keys and values additionally escape `&` and `=` unless the encoder
//! was built with [`Rfc3986Encoder::with_raw_delimiters`].

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped inside one path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Characters escaped in a whole path; `/` separates segments.
const PATH: &AsciiSet = &PATH_SEGMENT.remove(b'/');

/// Characters escaped in a fragment.
const FRAGMENT: &AsciiSet = &PATH_SEGMENT.remove(b'/').remove(b'?');

/// Characters escaped in query keys and values, `&` and `=` included.
const QUERY_STRICT: &AsciiSet = &PATH_SEGMENT
    .remove(b'/')
    .remove(b'?')
    .add(b'&')
    .add(b'=');

/// Characters escaped in query keys and values, `&` and `=` left raw.
const QUERY_RAW: &AsciiSet = &PATH_SEGMENT.remove(b'/').remove(b'?');

/// Percent-encodes the components of a generated URL.
pub trait UrlEncoder: Send + Sync + fmt::Debug {
    /// Encode a full path; `/` is kept as the segment separator.
    fn encode_path(&self, path: &str) -> String;

    /// Encode one path segment; `/` is escaped.
    fn encode_segment(&self, segment: &str) -> String;

    /// Encode a query key or value.
    fn encode_query(&self, component: &str) -> String;

    /// Encode a fragment.
    fn encode_fragment(&self, fragment: &str) -> String;

    /// Encode query pairs as `key=value` joined with `&`.
    fn encode_query_pairs(&self, pairs: &[(String, String)]) -> String {
        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", self.encode_query(key), self.encode_query(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// The stock encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rfc3986Encoder {
    query: &'static AsciiSet,
}

impl Rfc3986Encoder {
    /// Encoder that escapes `&` and `=` inside query keys and values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: QUERY_STRICT,
        }
    }

    /// Encoder that leaves `&` and `=` raw inside query keys and values,
    /// for callers that pre-assemble query fragments.
    #[must_use]
    pub fn with_raw_delimiters() -> Self {
        Self { query: QUERY_RAW }
    }
}

impl Default for Rfc3986Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlEncoder for Rfc3986Encoder {
    fn encode_path(&self, path: &str) -> String {
        utf8_percent_encode(path, PATH).to_string()
    }

    fn encode_segment(&self, segment: &str) -> String {
        utf8_percent_encode(segment, PATH_SEGMENT).to_string()
    }

    fn encode_query(&self, component: &str) -> String {
        utf8_percent_encode(component, self.query).to_string()
    }

    fn encode_fragment(&self, fragment: &str) -> String {
        utf8_percent_encode(fragment, FRAGMENT).to_string()
    }
}
