use std::collections::BTreeMap;
use std::fmt;

use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::pattern::{strip_anchors, RoutePattern};
use super::RouteError;
use crate::condition::ConditionBlueprint;

/// Every verb registered by `any()`.
pub const ANY_METHODS: [Method; 7] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Method invoked on a controller class declared without `@method`.
pub const INVOKABLE_METHOD: &str = "__invoke";

/// What a matched route hands control to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Handler {
    /// A controller class and the method to call on it
    Action {
        /// Controller class, possibly short and resolved against the route namespace
        class: String,
        /// Method name
        method: String,
    },
    /// Built-in redirect; target and status live in the route defaults
    Redirect,
    /// Built-in view response; the view name lives in the route defaults
    View,
    /// Reserve the path but hand the request back to the host
    Delegate,
}

impl Handler {
    /// Build a controller action handler.
    pub fn action(class: impl Into<String>, method: impl Into<String>) -> Self {
        Handler::Action {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Parse `Class@method`; a bare class is invoked through `__invoke`.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        match reference.split_once('@') {
            Some((class, method)) => Handler::action(class, method),
            None => Handler::action(reference, INVOKABLE_METHOD),
        }
    }

    /// `true` for the delegate sentinel.
    #[must_use]
    pub fn is_delegate(&self) -> bool {
        matches!(self, Handler::Delegate)
    }
}

impl From<&str> for Handler {
    fn from(reference: &str) -> Self {
        Handler::parse(reference)
    }
}

impl From<(&str, &str)> for Handler {
    fn from((class, method): (&str, &str)) -> Self {
        Handler::action(class, method)
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Action { class, method } => write!(f, "{class}@{method}"),
            Handler::Redirect => f.write_str("<redirect>"),
            Handler::View => f.write_str("<view>"),
            Handler::Delegate => f.write_str("<delegate>"),
        }
    }
}

/// A middleware reference as declared on a route or group.
///
/// The string form names a middleware; the array form names a middleware
/// followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MiddlewareRef {
    /// `"auth"`
    Name(String),
    /// `["can", "manage_options"]`
    WithArguments(Vec<String>),
}

impl MiddlewareRef {
    /// The middleware identifier, without arguments.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MiddlewareRef::Name(name) => name,
            MiddlewareRef::WithArguments(parts) => parts.first().map_or("", String::as_str),
        }
    }
}

impl From<&str> for MiddlewareRef {
    fn from(name: &str) -> Self {
        MiddlewareRef::Name(name.to_string())
    }
}

impl From<String> for MiddlewareRef {
    fn from(name: String) -> Self {
        MiddlewareRef::Name(name)
    }
}

impl From<Vec<String>> for MiddlewareRef {
    fn from(parts: Vec<String>) -> Self {
        MiddlewareRef::WithArguments(parts)
    }
}

impl From<&[&str]> for MiddlewareRef {
    fn from(parts: &[&str]) -> Self {
        MiddlewareRef::WithArguments(parts.iter().map(|p| (*p).to_string()).collect())
    }
}

/// One registered endpoint.
///
/// Routes are mutable only while registration runs (through the
/// `&mut Route` returned by the registrar); the matcher and the URL
/// generator only ever see shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    name: String,
    pattern: RoutePattern,
    #[serde(with = "method_list")]
    methods: Vec<Method>,
    handler: Handler,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    middleware: Vec<MiddlewareRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    requirements: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    defaults: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<ConditionBlueprint>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    fallback: bool,
}

impl Route {
    /// Create a route.
    ///
    /// # Errors
    ///
    /// Fails when the name is empty or starts with `/`, when no methods are
    /// given, or when the pattern does not parse.
    pub fn new(
        name: impl Into<String>,
        path: &str,
        methods: &[Method],
        handler: Handler,
    ) -> Result<Self, RouteError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RouteError::EmptyName {
                path: path.to_string(),
            });
        }
        if name.starts_with('/') {
            return Err(RouteError::NameLooksLikePath { name });
        }
        if methods.is_empty() {
            return Err(RouteError::NoMethods { name });
        }
        let pattern = RoutePattern::parse(path)?;

        let mut unique: Vec<Method> = Vec::with_capacity(methods.len());
        for method in methods {
            if !unique.contains(method) {
                unique.push(method.clone());
            }
        }

        Ok(Self {
            name,
            pattern,
            methods: unique,
            handler,
            namespace: None,
            middleware: Vec::new(),
            requirements: BTreeMap::new(),
            defaults: BTreeMap::new(),
            conditions: Vec::new(),
            fallback: false,
        })
    }

    /// Unique route name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed path pattern.
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Normalized path pattern text.
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    /// Accepted HTTP methods, in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// The handler reference.
    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// `true` when the handler is the delegate sentinel.
    #[must_use]
    pub fn is_delegate(&self) -> bool {
        self.handler.is_delegate()
    }

    /// Namespace used to resolve short controller class names.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Middleware in execution order (outer groups first).
    #[must_use]
    pub fn middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }

    /// Placeholder regex requirements.
    #[must_use]
    pub fn requirements(&self) -> &BTreeMap<String, String> {
        &self.requirements
    }

    /// Default parameter values.
    #[must_use]
    pub fn defaults(&self) -> &BTreeMap<String, Value> {
        &self.defaults
    }

    /// Condition blueprints evaluated after a structural match.
    #[must_use]
    pub fn conditions(&self) -> &[ConditionBlueprint] {
        &self.conditions
    }

    /// Whether this is the catch-all fallback route.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Append middleware to the route.
    pub fn add_middleware(&mut self, middleware: impl Into<MiddlewareRef>) -> &mut Self {
        self.middleware.push(middleware.into());
        self
    }

    /// Append several middleware references, preserving their order.
    pub fn with_middleware<I, M>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MiddlewareRef>,
    {
        self.middleware
            .extend(middleware.into_iter().map(Into::into));
        self
    }

    /// Set the namespace used to resolve short controller names.
    pub fn with_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set a default value for a parameter.
    pub fn default_value(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Attach a condition evaluated after the path matched.
    pub fn condition(&mut self, blueprint: ConditionBlueprint) -> &mut Self {
        self.conditions.push(blueprint);
        self
    }

    /// Constrain a placeholder with a regex fragment (no anchors needed).
    ///
    /// # Errors
    ///
    /// Fails when the pattern has no such placeholder or the fragment is not
    /// a valid regex.
    pub fn requirement(
        &mut self,
        placeholder: &str,
        regex: impl Into<String>,
    ) -> Result<&mut Self, RouteError> {
        let regex = regex.into();
        if !self.pattern.has_placeholder(placeholder) {
            return Err(RouteError::UnknownPlaceholder {
                name: self.name.clone(),
                placeholder: placeholder.to_string(),
            });
        }
        if let Err(err) = Regex::new(strip_anchors(&regex)) {
            return Err(RouteError::InvalidRequirement {
                name: self.name.clone(),
                placeholder: placeholder.to_string(),
                requirement: regex,
                reason: err.to_string(),
            });
        }
        self.requirements.insert(placeholder.to_string(), regex);
        Ok(self)
    }

    /// Only digits.
    ///
    /// # Errors
    ///
    /// See [`Route::requirement`].
    pub fn require_num(&mut self, placeholder: &str) -> Result<&mut Self, RouteError> {
        self.requirement(placeholder, "[0-9]+")
    }

    /// Only ASCII letters.
    ///
    /// # Errors
    ///
    /// See [`Route::requirement`].
    pub fn require_alpha(&mut self, placeholder: &str) -> Result<&mut Self, RouteError> {
        self.requirement(placeholder, "[a-zA-Z]+")
    }

    /// Only ASCII letters and digits.
    ///
    /// # Errors
    ///
    /// See [`Route::requirement`].
    pub fn require_alpha_num(&mut self, placeholder: &str) -> Result<&mut Self, RouteError> {
        self.requirement(placeholder, "[a-zA-Z0-9]+")
    }

    /// One of a fixed set of literal values.
    ///
    /// # Errors
    ///
    /// See [`Route::requirement`].
    pub fn require_one_of<S: AsRef<str>>(
        &mut self,
        placeholder: &str,
        values: &[S],
    ) -> Result<&mut Self, RouteError> {
        let alternatives: Vec<String> = values
            .iter()
            .map(|v| regex::escape(v.as_ref()))
            .collect();
        self.requirement(placeholder, alternatives.join("|"))
    }

    pub(crate) fn mark_fallback(&mut self) -> &mut Self {
        self.fallback = true;
        self
    }

    pub(crate) fn set_namespace_if_missing(&mut self, namespace: Option<&str>) {
        if self.namespace.is_none() {
            self.namespace = namespace.map(str::to_string);
        }
    }
}

/// Serialize methods as their uppercase names.
mod method_list {
    use http::Method;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        methods: &[Method],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(methods.iter().map(Method::as_str))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Method>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| {
                Method::from_bytes(name.to_ascii_uppercase().as_bytes())
                    .map_err(|_| D::Error::custom(format!("invalid HTTP method '{name}'")))
            })
            .collect()
    }
}

/// Parse an HTTP method name, case-insensitively.
///
/// # Errors
///
/// Fails for names that are not valid HTTP tokens.
pub fn parse_method(name: &str) -> Result<Method, http::method::InvalidMethod> {
    Method::from_bytes(name.trim().to_ascii_uppercase().as_bytes())
}
