use std::borrow::Cow;

use dashmap::DashMap;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::context::UrlGenerationContext;
use super::encoder::{Rfc3986Encoder, UrlEncoder};
use super::error::UrlGenerationError;
use crate::admin::AdminNamespace;
use crate::route::{anchored, normalize_path, PatternToken, Route, RouteCollection, RouteError};

/// Parameter key holding the URL fragment.
pub const FRAGMENT_KEY: &str = "_fragment";

/// Route names tried, in order, by [`UrlGenerator::to_login`].
pub const LOGIN_ROUTES: [&str; 2] = ["auth.login", "login"];

/// Host login page used when no login route is registered.
pub const DEFAULT_LOGIN_PATH: &str = "/wp-login.php";

/// Whether to generate a path or a full URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlType {
    /// `/path?query#fragment`
    #[default]
    AbsolutePath,
    /// `scheme://host[:port]/path?query#fragment`
    AbsoluteUrl,
}

/// Reverse router.
///
/// URLs for routes without placeholders that are generated without
/// parameters are memoized per route name; they do not depend on the
/// generation context because the scheme and host are added afterwards.
pub struct UrlGenerator {
    context: UrlGenerationContext,
    encoder: Box<dyn UrlEncoder>,
    admin: AdminNamespace,
    login_path: String,
    static_urls: DashMap<String, String>,
    requirements: DashMap<String, Regex>,
}

impl std::fmt::Debug for UrlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlGenerator")
            .field("context", &self.context)
            .field("encoder", &self.encoder)
            .field("admin", &self.admin)
            .field("login_path", &self.login_path)
            .field("memoized", &self.static_urls.len())
            .finish()
    }
}

impl UrlGenerator {
    /// Generator with the stock RFC 3986 encoder.
    #[must_use]
    pub fn new(context: UrlGenerationContext, admin: AdminNamespace) -> Self {
        Self {
            context,
            encoder: Box::new(Rfc3986Encoder::new()),
            admin,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            static_urls: DashMap::new(),
            requirements: DashMap::new(),
        }
    }

    /// Replace the encoder.
    #[must_use]
    pub fn with_encoder(mut self, encoder: impl UrlEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self.static_urls.clear();
        self
    }

    /// Replace the host login path used by [`UrlGenerator::to_login`].
    #[must_use]
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// The generation context
    #[must_use]
    pub fn context(&self) -> &UrlGenerationContext {
        &self.context
    }

    /// Drop memoized route URLs.
    pub fn clear_cache(&self) {
        self.static_urls.clear();
    }

    /// Number of memoized route URLs.
    #[must_use]
    pub fn memoized(&self) -> usize {
        self.static_urls.len()
    }

    /// URL for a literal path (or a complete URL).
    ///
    /// A query string or fragment already present in `path` is kept; `params`
    /// are appended to the query (duplicates included) and `_fragment`
    /// replaces the fragment. Complete URLs are returned with their scheme and
    /// host untouched.
    #[must_use]
    pub fn to(
        &self,
        path: &str,
        params: &[(&str, &str)],
        url_type: UrlType,
        secure: Option<bool>,
    ) -> String {
        let (fragment, extra) = split_fragment(params);
        let (base, query, existing_fragment) = split_url(path);
        // `_fragment` is a raw value; a fragment already in `path` may be escaped
        let fragment = match fragment {
            Some(fragment) => Some(self.encoder.encode_fragment(fragment)),
            None => existing_fragment
                .map(|fragment| self.encoder.encode_fragment(&decode(fragment))),
        };

        if is_complete_url(path) {
            return self.assemble(base.to_string(), query, &extra, fragment);
        }

        let encoded_path = self.encoder.encode_path(&normalize_path(&decode(base)));
        let relative = self.assemble(encoded_path, query, &extra, fragment);
        self.absolutize(relative, url_type, secure)
    }

    /// Absolute `https` URL for a literal path.
    #[must_use]
    pub fn secure(&self, path: &str, params: &[(&str, &str)]) -> String {
        self.to(path, params, UrlType::AbsoluteUrl, Some(true))
    }

    /// URL for the route registered under `name`.
    ///
    /// Parameters fill the placeholders; an empty value counts as missing. A
    /// missing optional placeholder ends the path there, and a missing
    /// required one falls back to its default. Parameters not consumed by a
    /// placeholder are appended as query pairs in the order given. The
    /// `_fragment` value is encoded as given, never decoded first.
    ///
    /// # Errors
    ///
    /// Unknown route, missing required parameter, or a value rejected by
    /// the placeholder requirement.
    pub fn to_route(
        &self,
        routes: &dyn RouteCollection,
        name: &str,
        params: &[(&str, &str)],
        url_type: UrlType,
        secure: Option<bool>,
    ) -> Result<String, UrlGenerationError> {
        let route = match routes.get(name) {
            Ok(route) => route,
            Err(RouteError::RouteNotFound { .. }) => {
                warn!(route_name = %name, "URL requested for unknown route");
                return Err(UrlGenerationError::RouteNotFound {
                    name: name.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let (fragment, params) = split_fragment(params);
        let path_and_query = if route.pattern().is_static() && params.is_empty() {
            match self.static_urls.get(name) {
                Some(url) => url.value().clone(),
                None => {
                    let url = self.expand(&route, &[])?;
                    self.static_urls.insert(name.to_string(), url.clone());
                    url
                }
            }
        } else {
            self.expand(&route, &params).inspect_err(|err| {
                warn!(route_name = %name, error = %err, "URL generation failed");
            })?
        };

        let mut relative = path_and_query;
        if let Some(fragment) = fragment {
            relative.push('#');
            relative.push_str(&self.encoder.encode_fragment(fragment));
        }
        Ok(self.absolutize(relative, url_type, secure))
    }

    /// URL of the login page.
    ///
    /// Uses the first registered route among [`LOGIN_ROUTES`], falling back
    /// to the host login path. `redirect_to` is passed as a query parameter.
    ///
    /// # Errors
    ///
    /// Propagates failures of the login route itself.
    pub fn to_login(
        &self,
        routes: &dyn RouteCollection,
        redirect_to: Option<&str>,
        url_type: UrlType,
    ) -> Result<String, UrlGenerationError> {
        let params: Vec<(&str, &str)> = redirect_to
            .map(|target| vec![("redirect_to", target)])
            .unwrap_or_default();
        match LOGIN_ROUTES.iter().find(|name| routes.contains(name)) {
            Some(name) => self.to_route(routes, name, &params, url_type, None),
            None => Ok(self.to(&self.login_path, &params, url_type, None)),
        }
    }

    fn expand(&self, route: &Route, params: &[(&str, &str)]) -> Result<String, UrlGenerationError> {
        let mut consumed = vec![false; params.len()];
        let mut path = String::with_capacity(route.path().len());
        let mut truncated = false;

        for token in route.pattern().tokens() {
            match token {
                PatternToken::Literal(text) => path.push_str(&self.encoder.encode_path(text)),
                PatternToken::Placeholder { name, optional } => {
                    let provided = params
                        .iter()
                        .rposition(|(key, value)| key == name && !value.is_empty());
                    for (index, (key, _)) in params.iter().enumerate() {
                        if key == name {
                            consumed[index] = true;
                        }
                    }

                    let value: Cow<'_, str> = match provided {
                        Some(index) => Cow::Borrowed(params[index].1),
                        None if *optional => {
                            truncated = true;
                            break;
                        }
                        None => match route.defaults().get(name).and_then(scalar_to_string) {
                            Some(default) => Cow::Owned(default),
                            None => {
                                return Err(UrlGenerationError::MissingParameter {
                                    route: route.name().to_string(),
                                    param: name.clone(),
                                })
                            }
                        },
                    };

                    match route.requirements().get(name) {
                        Some(requirement) => {
                            let regex = self.requirement_regex(route, name, requirement)?;
                            if !regex.is_match(&value) {
                                return Err(UrlGenerationError::BadParameter {
                                    route: route.name().to_string(),
                                    param: name.clone(),
                                    pattern: requirement.clone(),
                                    value: value.into_owned(),
                                });
                            }
                            path.push_str(&self.encoder.encode_path(&value));
                        }
                        None => path.push_str(&self.encoder.encode_segment(&value)),
                    }
                }
            }
        }

        // only the separator in front of the dropped placeholder goes
        if truncated && path.len() > 1 && path.ends_with('/') {
            path.pop();
        }

        let mut query: Vec<(String, String)> = Vec::new();
        if self.admin.owns_path(&path) {
            let (script, admin_query) = self.admin.rewrite_for_url_generation(&path);
            query.extend(
                admin_query
                    .into_iter()
                    .map(|(key, value)| (key, decode(&value).into_owned())),
            );
            path = script;
        }
        query.extend(
            params
                .iter()
                .zip(consumed)
                .filter(|(_, used)| !used)
                .map(|((key, value), _)| ((*key).to_string(), (*value).to_string())),
        );

        if !query.is_empty() {
            path.push('?');
            path.push_str(&self.encoder.encode_query_pairs(&query));
        }
        debug!(route_name = %route.name(), url = %path, "Route URL generated");
        Ok(path)
    }

    fn requirement_regex(
        &self,
        route: &Route,
        param: &str,
        requirement: &str,
    ) -> Result<Regex, UrlGenerationError> {
        let source = anchored(requirement);
        if let Some(regex) = self.requirements.get(&source) {
            return Ok(regex.value().clone());
        }
        let regex = Regex::new(&source).map_err(|err| RouteError::InvalidRequirement {
            name: route.name().to_string(),
            placeholder: param.to_string(),
            requirement: requirement.to_string(),
            reason: err.to_string(),
        })?;
        self.requirements.insert(source, regex.clone());
        Ok(regex)
    }

    fn assemble(
        &self,
        mut url: String,
        existing_query: Option<&str>,
        extra: &[(&str, &str)],
        fragment: Option<String>,
    ) -> String {
        let mut parts: Vec<String> = existing_query
            .into_iter()
            .flat_map(|query| query.split('&'))
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => format!(
                    "{}={}",
                    self.encoder.encode_query(&decode(key)),
                    self.encoder.encode_query(&decode(value))
                ),
                None => self.encoder.encode_query(&decode(part)),
            })
            .collect();
        parts.extend(extra.iter().map(|(key, value)| {
            format!("{}={}", self.encoder.encode_query(key), self.encoder.encode_query(value))
        }));

        if !parts.is_empty() {
            url.push('?');
            url.push_str(&parts.join("&"));
        }
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(&fragment);
        }
        url
    }

    fn absolutize(&self, relative: String, url_type: UrlType, secure: Option<bool>) -> String {
        let https_by_default = self.context.https_by_default;
        let absolute = url_type == UrlType::AbsoluteUrl
            || secure.is_some_and(|secure| secure != https_by_default);
        if absolute {
            let mut url = self.context.base_url(secure.unwrap_or(https_by_default));
            url.push_str(&relative);
            url
        } else {
            relative
        }
    }
}

type Params<'p> = Vec<(&'p str, &'p str)>;

fn split_fragment<'p>(params: &[(&'p str, &'p str)]) -> (Option<&'p str>, Params<'p>) {
    let mut fragment = None;
    let mut rest = Vec::with_capacity(params.len());
    for &(key, value) in params {
        if key == FRAGMENT_KEY {
            fragment = Some(value);
        } else {
            rest.push((key, value));
        }
    }
    (fragment, rest)
}

/// Split `base?query#fragment`.
fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    match rest.split_once('?') {
        Some((base, query)) => (base, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

fn is_complete_url(path: &str) -> bool {
    path.starts_with("//") || (path.contains("://") && ::url::Url::parse(path).is_ok())
}

fn decode(text: &str) -> Cow<'_, str> {
    urlencoding::decode(text).unwrap_or(Cow::Borrowed(text))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
