//! Route pattern parsing and lowering to anchored regular expressions.
//!
//! Patterns are plain paths with `{name}` (required) and `{name?}` (optional)
//! placeholders. Required placeholders may sit anywhere inside a segment
//! (`/posts/{year}-{slug}`); optional placeholders must each occupy a whole
//! segment and together form the trailing run of the pattern.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::RouteError;

/// Regex used for placeholders without an explicit requirement.
pub const DEFAULT_REQUIREMENT: &str = "[^/]+";

/// One lexical piece of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Fixed text, matched and generated verbatim
    Literal(String),
    /// A `{name}` or `{name?}` placeholder
    Placeholder {
        /// Placeholder name
        name: String,
        /// `true` for `{name?}`
        optional: bool,
    },
}

/// A parsed, normalized route pattern.
///
/// Serializes as its source string and re-parses on deserialization, so a
/// cached route can never carry tokens that disagree with its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoutePattern {
    source: String,
    tokens: Vec<PatternToken>,
}

impl RoutePattern {
    /// Parse and normalize a pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] for unbalanced braces, invalid or duplicate
    /// placeholder names, optional placeholders that do not occupy whole
    /// trailing segments, and required placeholders after optional ones.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let source = normalize_path(pattern);
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut seen = HashSet::new();
        let mut rest = source.as_str();

        while let Some(brace) = rest.find(['{', '}']) {
            let (before, after) = rest.split_at(brace);
            literal.push_str(before);
            if after.starts_with('}') {
                return Err(invalid(&source, "unbalanced '}'"));
            }
            let close = after
                .find('}')
                .ok_or_else(|| invalid(&source, "unclosed '{'"))?;
            let inner = &after[1..close];
            if inner.contains('{') {
                return Err(invalid(&source, "placeholders cannot be nested"));
            }
            let (name, optional) = match inner.strip_suffix('?') {
                Some(name) => (name, true),
                None => (inner, false),
            };
            if !is_valid_placeholder_name(name) {
                return Err(invalid(
                    &source,
                    &format!("invalid placeholder name '{name}'"),
                ));
            }
            if !seen.insert(name.to_string()) {
                return Err(RouteError::DuplicatePlaceholder {
                    pattern: source.clone(),
                    placeholder: name.to_string(),
                });
            }
            if !literal.is_empty() {
                tokens.push(PatternToken::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(PatternToken::Placeholder {
                name: name.to_string(),
                optional,
            });
            rest = &after[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            tokens.push(PatternToken::Literal(literal));
        }

        validate_optional_tail(&source, &tokens)?;
        Ok(Self { source, tokens })
    }

    /// The normalized pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parsed tokens in pattern order.
    #[must_use]
    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// `true` when the pattern has no placeholders at all.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.placeholders().next().is_none()
    }

    /// Placeholder names in pattern order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            PatternToken::Placeholder { name, .. } => Some(name.as_str()),
            PatternToken::Literal(_) => None,
        })
    }

    /// Whether the pattern declares a placeholder called `name`.
    #[must_use]
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders().any(|p| p == name)
    }

    fn first_optional(&self) -> Option<usize> {
        self.tokens
            .iter()
            .position(|t| matches!(t, PatternToken::Placeholder { optional: true, .. }))
    }

    /// Lower the pattern to an anchored regex.
    ///
    /// Every placeholder becomes a named group `__p{index}`; the returned
    /// vector maps those indexes back to placeholder names. The optional
    /// tail becomes nested optional groups so one regex matches both the
    /// short and the long form.
    #[must_use]
    pub fn regex_source(&self, requirements: &BTreeMap<String, String>) -> (String, Vec<String>) {
        let first_optional = self.first_optional();
        let mut regex = String::with_capacity(self.source.len() * 2 + 2);
        let mut names = Vec::new();
        let mut open_groups = 0usize;
        let mut optional_at_root = false;

        regex.push('^');
        for (index, token) in self.tokens.iter().enumerate() {
            match token {
                PatternToken::Literal(text) => {
                    if first_optional.is_some_and(|first| index > first) {
                        // separators between optional placeholders live inside the groups
                        continue;
                    }
                    if first_optional == Some(index + 1) {
                        let head = &text[..text.len() - 1];
                        if head.is_empty() && regex == "^" {
                            regex.push('/');
                            optional_at_root = true;
                        } else {
                            regex.push_str(&regex::escape(head));
                        }
                    } else {
                        regex.push_str(&regex::escape(text));
                    }
                }
                PatternToken::Placeholder { name, optional } => {
                    if *optional {
                        if optional_at_root && open_groups == 0 {
                            regex.push_str("(?:");
                        } else {
                            regex.push_str("(?:/");
                        }
                        open_groups += 1;
                    }
                    let fragment = requirements
                        .get(name)
                        .map_or(DEFAULT_REQUIREMENT, |r| strip_anchors(r));
                    regex.push_str(&format!("(?P<__p{}>{})", names.len(), fragment));
                    names.push(name.clone());
                }
            }
        }
        for _ in 0..open_groups {
            regex.push_str(")?");
        }
        regex.push('$');

        (regex, names)
    }
}

impl TryFrom<String> for RoutePattern {
    type Error = RouteError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(&source)
    }
}

impl From<RoutePattern> for String {
    fn from(pattern: RoutePattern) -> Self {
        pattern.source
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Normalize a request or pattern path.
///
/// Produces a single leading slash, no trailing slash (except for the root)
/// and no empty segments. The matcher and the URL generator both rely on
/// this so that `/foo/` and `/foo` address the same route.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Join a group prefix and a route path into one normalized path.
#[must_use]
pub fn join_paths(prefix: &str, path: &str) -> String {
    normalize_path(&format!("{prefix}/{path}"))
}

/// Remove a leading `^` and trailing `$`; the compiler adds its own anchors.
#[must_use]
pub fn strip_anchors(requirement: &str) -> &str {
    let requirement = requirement.strip_prefix('^').unwrap_or(requirement);
    match requirement.strip_suffix('$') {
        Some(stripped) if !stripped.ends_with('\\') => stripped,
        _ => requirement,
    }
}

/// Anchor a requirement so it must match a whole value.
#[must_use]
pub fn anchored(requirement: &str) -> String {
    format!("^(?:{})$", strip_anchors(requirement))
}

fn is_valid_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn invalid(pattern: &str, reason: &str) -> RouteError {
    RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_optional_tail(source: &str, tokens: &[PatternToken]) -> Result<(), RouteError> {
    let Some(first) = tokens
        .iter()
        .position(|t| matches!(t, PatternToken::Placeholder { optional: true, .. }))
    else {
        return Ok(());
    };

    match first.checked_sub(1).map(|i| &tokens[i]) {
        Some(PatternToken::Literal(text)) if text.ends_with('/') => {}
        _ => {
            return Err(invalid(
                source,
                "optional placeholders must start a path segment",
            ))
        }
    }

    for (offset, token) in tokens[first..].iter().enumerate() {
        let expect_placeholder = offset % 2 == 0;
        match token {
            PatternToken::Placeholder { optional: true, .. } if expect_placeholder => {}
            PatternToken::Literal(text) if !expect_placeholder && text == "/" => {}
            PatternToken::Placeholder {
                name,
                optional: false,
            } => {
                return Err(RouteError::RequiredAfterOptional {
                    pattern: source.to_string(),
                    placeholder: name.clone(),
                })
            }
            _ => {
                return Err(invalid(
                    source,
                    "optional placeholders must occupy whole trailing path segments",
                ))
            }
        }
    }
    Ok(())
}
