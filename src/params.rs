//! Path parameters, query strings, and URI component encoding.
//!
//! - [`RouteParams`]: values captured from `:name` placeholders, already
//!   percent-decoded.
//! - [`QueryParams`]: the `?key=value&...` part of a URL. Single-valued, the
//!   last occurrence of a key wins, insertion order is kept for serialization.
//! - [`parse_query`] / [`build_url`]: the two directions between a query
//!   string and [`QueryParams`].
//! - [`encode_uri_component`] / [`decode_uri_component`]: the component
//!   encoding used throughout the router. Unreserved characters are
//!   `A-Z a-z 0-9 - _ . ! ~ * ' ( )`; everything else is `%XX`-escaped as
//!   UTF-8. `+` is **not** treated as a space.
//!
//! # Example
//!
//! ```
//! use web_navigator::params::{build_url, parse_query, QueryParams};
//!
//! let mut query = QueryParams::new();
//! query.insert("q", "a b");
//! query.insert("tag", "x&y");
//!
//! let url = build_url("/search", &query);
//! assert_eq!(url, "/search?q=a%20b&tag=x%26y");
//!
//! let parsed = parse_query(&url[url.find('?').unwrap()..]).unwrap();
//! assert_eq!(parsed, query);
//! ```

use crate::error::DecodeError;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;

/// Characters escaped by [`encode_uri_component`].
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// ============================================================================
// Route Parameters
// ============================================================================

/// Route parameters extracted from path segments
///
/// # Example
///
/// ```
/// use web_navigator::RouteParams;
///
/// // Route pattern: /users/:id
/// // Matched path: /users/123
/// let mut params = RouteParams::new();
/// params.insert("id", "123");
///
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.get_as::<i32>("id"), Some(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: HashMap<String, String>,
}

impl RouteParams {
    /// Create empty route parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing `HashMap`.
    pub fn from_map(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Get a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Get a parameter and parse it as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, name: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(name)?.parse().ok()
    }

    /// Insert or overwrite a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Return `true` if the given name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Iterate over all `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }
}

impl<K, V> FromIterator<(K, V)> for RouteParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters parsed from a URL query string
///
/// Each key holds one value. Inserting an existing key replaces its value in
/// place, so serialization order follows first insertion.
///
/// # Example
///
/// ```
/// use web_navigator::params::parse_query;
///
/// let query = parse_query("?page=1&sort=name&page=2").unwrap();
///
/// assert_eq!(query.get("page"), Some("2"));
/// assert_eq!(query.get_as::<i32>("page"), Some(2));
/// assert_eq!(query.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create empty query parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the value for a key, parsed as type `T`.
    ///
    /// Returns `None` if the key is missing or the value cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Set a value, replacing any previous value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(index).1)
    }

    /// Return `true` if the given key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize into `k=v&k=v` form without the leading `?`.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode_uri_component(k), encode_uri_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = QueryParams::new();
        for (k, v) in iter {
            query.insert(k, v);
        }
        query
    }
}

/// Parse a query string into [`QueryParams`].
///
/// A leading `?` is ignored. Pairs are split on `&`, then on `=`. The value
/// ends at a second `=`, so `a=b=c` yields `b`; [`build_url`] encodes `=` and
/// never produces such pairs. A pair without `=` yields an empty value; pairs
/// with an empty key are skipped. Malformed percent-encoding is an error.
pub fn parse_query(search: &str) -> Result<QueryParams, DecodeError> {
    let search = search.strip_prefix('?').unwrap_or(search);
    let mut query = QueryParams::new();

    for pair in search.split('&') {
        let mut parts = pair.split('=');
        let key = parts.next().unwrap_or_default();
        let value = parts.next().unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        query.insert(decode_uri_component(key)?, decode_uri_component(value)?);
    }

    Ok(query)
}

/// Append `query` to `path`. No `?` is added when `query` is empty.
pub fn build_url(path: &str, query: &QueryParams) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.to_query_string())
    }
}

// ============================================================================
// URI Components
// ============================================================================

/// Percent-encode a single URI component.
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Percent-decode a single URI component.
///
/// Fails on a `%` that is not followed by two hex digits and on escapes that
/// decode to invalid UTF-8.
pub fn decode_uri_component(s: &str) -> Result<String, DecodeError> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !well_formed {
                return Err(DecodeError::MalformedEscape {
                    input: s.to_string(),
                    position: i,
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(s)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8 {
            input: s.to_string(),
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_basic() {
        let mut params = RouteParams::new();
        params.insert("id", "123");

        assert_eq!(params.get("id"), Some("123"));
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_route_params_get_as() {
        let params: RouteParams = [("id", "123"), ("active", "true")].into_iter().collect();

        assert_eq!(params.get_as::<u32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_query_last_value_wins() {
        let query = parse_query("?tag=a&tag=b").unwrap();
        assert_eq!(query.get("tag"), Some("b"));
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_query_without_equals() {
        let query = parse_query("flag&x=1").unwrap();
        assert_eq!(query.get("flag"), Some(""));
        assert_eq!(query.get("x"), Some("1"));
    }

    #[test]
    fn test_query_skips_empty_keys() {
        let query = parse_query("?=oops&&a=1").unwrap();
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("a"), Some("1"));
    }

    #[test]
    fn test_query_value_stops_at_second_equals() {
        let query = parse_query("expr=a=b&encoded=a%3Db").unwrap();
        assert_eq!(query.get("expr"), Some("a"));
        assert_eq!(query.get("encoded"), Some("a=b"));
    }

    #[test]
    fn test_empty_query_string() {
        assert!(parse_query("").unwrap().is_empty());
        assert!(parse_query("?").unwrap().is_empty());
    }

    #[test]
    fn test_build_url_without_query() {
        assert_eq!(build_url("/products", &QueryParams::new()), "/products");
    }

    #[test]
    fn test_build_url_keeps_insertion_order() {
        let mut query = QueryParams::new();
        query.insert("b", "2");
        query.insert("a", "1");
        query.insert("b", "3");
        assert_eq!(build_url("/p", &query), "/p?b=3&a=1");
    }

    #[test]
    fn test_uri_encoding() {
        assert_eq!(encode_uri_component("hello world"), "hello%20world");
        assert_eq!(encode_uri_component("test@example.com"), "test%40example.com");
        assert_eq!(encode_uri_component("keep-_.!~*'()"), "keep-_.!~*'()");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_uri_decoding() {
        assert_eq!(decode_uri_component("hello%20world").unwrap(), "hello world");
        assert_eq!(decode_uri_component("hello+world").unwrap(), "hello+world");
        assert_eq!(decode_uri_component("%C3%A9").unwrap(), "é");
    }

    #[test]
    fn test_uri_decoding_rejects_malformed() {
        assert!(matches!(
            decode_uri_component("100%"),
            Err(DecodeError::MalformedEscape { position: 3, .. })
        ));
        assert!(matches!(
            decode_uri_component("%zz"),
            Err(DecodeError::MalformedEscape { position: 0, .. })
        ));
        assert!(matches!(
            decode_uri_component("%FF"),
            Err(DecodeError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn test_parse_query_propagates_decode_errors() {
        assert!(parse_query("?q=%E0%A4%A").is_err());
    }
}
