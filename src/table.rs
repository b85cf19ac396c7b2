//! Ordered route registry.
//!
//! Routes are tried in registration order and the first match wins, so
//! register specific patterns before general ones. The bare `*` route is
//! never part of that ordered scan, wherever it was registered; callers ask
//! for it with [`RouteTable::fallback`] after a miss.
//!
//! # Example
//!
//! ```
//! use web_navigator::{Route, RouteTable, View};
//!
//! let mut table = RouteTable::new();
//! table.add_route(Route::new("/", |_| View::Empty)).unwrap();
//! table.add_route(Route::new("/product/:id", |_| View::Empty)).unwrap();
//! table.add_route(Route::new("*", |_| View::Empty)).unwrap();
//!
//! let matched = table.match_path("/product/5/").unwrap().unwrap();
//! assert_eq!(matched.route.pattern(), "/product/:id");
//! assert_eq!(matched.matched_path, "/product/5");
//! assert_eq!(matched.params.get("id"), Some("5"));
//!
//! assert!(table.match_path("/missing").unwrap().is_none());
//! assert_eq!(table.fallback("/missing").unwrap().route.pattern(), "*");
//! ```

use crate::error::{DecodeError, RouterError};
use crate::params::{self, QueryParams, RouteParams};
use crate::pattern::PathPattern;
use crate::route::Route;
use crate::{debug_log, trace_log};
use std::collections::HashMap;
use std::rc::Rc;

/// A successful match.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub route: Rc<Route>,
    pub params: RouteParams,
    /// The normalized path that was matched.
    pub matched_path: String,
}

struct Entry {
    pattern: PathPattern,
    route: Rc<Route>,
}

/// Registered routes in insertion order.
#[derive(Default)]
pub struct RouteTable {
    entries: Vec<Entry>,
    named: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route and each of its aliases.
    ///
    /// Every alias becomes an independent entry with the same component and
    /// options. Fails if any pattern does not compile; in that case nothing
    /// is registered.
    pub fn add_route(&mut self, route: Route) -> Result<(), RouterError> {
        let mut compiled = vec![(PathPattern::compile(route.pattern())?, route.clone())];
        for alias in route.aliases() {
            compiled.push((PathPattern::compile(alias)?, route.for_alias(alias)));
        }

        for (pattern, route) in compiled {
            debug_log!("Registered route '{}'", pattern.as_str());
            if let Some(name) = route.name() {
                self.named
                    .entry(name.to_string())
                    .or_insert(self.entries.len());
            }
            self.entries.push(Entry {
                pattern,
                route: Rc::new(route),
            });
        }
        Ok(())
    }

    /// Find the first non-fallback route matching `path`.
    ///
    /// A single trailing slash is ignored, except on `/` itself.
    pub fn match_path(&self, path: &str) -> Result<Option<MatchResult>, DecodeError> {
        let normalized = crate::normalize_path(path);
        for entry in self.entries.iter().filter(|e| !e.pattern.is_fallback()) {
            if let Some(params) = entry.pattern.matches(normalized)? {
                trace_log!("'{}' matched '{}'", normalized, entry.pattern.as_str());
                return Ok(Some(MatchResult {
                    route: Rc::clone(&entry.route),
                    params,
                    matched_path: normalized.to_string(),
                }));
            }
        }
        Ok(None)
    }

    /// The first `*` route, matched against `path` with no parameters.
    pub fn fallback(&self, path: &str) -> Option<MatchResult> {
        let entry = self.entries.iter().find(|e| e.pattern.is_fallback())?;
        Some(MatchResult {
            route: Rc::clone(&entry.route),
            params: RouteParams::new(),
            matched_path: crate::normalize_path(path).to_string(),
        })
    }

    /// Look up a route by name.
    pub fn by_name(&self, name: &str) -> Option<&Rc<Route>> {
        self.named.get(name).map(|&index| &self.entries[index].route)
    }

    /// Build the path of a named route.
    pub fn url_for(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
        let index = *self
            .named
            .get(name)
            .ok_or_else(|| RouterError::UnknownRouteName {
                name: name.to_string(),
            })?;
        self.entries[index]
            .pattern
            .build(params)
            .map_err(|param| RouterError::MissingParameter {
                route: name.to_string(),
                param,
            })
    }

    /// All registered routes, aliases included.
    pub fn routes(&self) -> impl Iterator<Item = &Rc<Route>> {
        self.entries.iter().map(|entry| &entry.route)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// See [`params::parse_query`].
    pub fn parse_query(search: &str) -> Result<QueryParams, DecodeError> {
        params::parse_query(search)
    }

    /// See [`params::build_url`].
    pub fn build_url(path: &str, query: &QueryParams) -> String {
        params::build_url(path, query)
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.pattern.as_str()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternError;
    use crate::view::View;

    fn route(pattern: &str) -> Route {
        Route::new(pattern, |_| View::Empty)
    }

    #[test]
    fn test_first_match_wins() {
        let mut table = RouteTable::new();
        table.add_route(route("/users/me").named("me")).unwrap();
        table.add_route(route("/users/:id").named("user")).unwrap();

        let matched = table.match_path("/users/me").unwrap().unwrap();
        assert_eq!(matched.route.name(), Some("me"));
        assert!(matched.params.is_empty());

        let matched = table.match_path("/users/7").unwrap().unwrap();
        assert_eq!(matched.route.name(), Some("user"));
    }

    #[test]
    fn test_trailing_slash_normalization() {
        let mut table = RouteTable::new();
        table.add_route(route("/")).unwrap();
        table.add_route(route("/about")).unwrap();

        assert_eq!(table.match_path("/about/").unwrap().unwrap().matched_path, "/about");
        assert_eq!(table.match_path("/").unwrap().unwrap().route.pattern(), "/");
    }

    #[test]
    fn test_fallback_is_explicit() {
        let mut table = RouteTable::new();
        table.add_route(route("/")).unwrap();
        assert!(table.fallback("/x").is_none());

        table.add_route(route("*").named("not-found")).unwrap();
        let fallback = table.fallback("/x/").unwrap();
        assert_eq!(fallback.route.name(), Some("not-found"));
        assert!(fallback.params.is_empty());
        assert_eq!(fallback.matched_path, "/x");
    }

    #[test]
    fn test_early_fallback_does_not_shadow_routes() {
        let mut table = RouteTable::new();
        table.add_route(route("*")).unwrap();
        table.add_route(route("/about")).unwrap();

        let matched = table.match_path("/about").unwrap().unwrap();
        assert_eq!(matched.route.pattern(), "/about");
        assert!(table.match_path("/contact").unwrap().is_none());
    }

    #[test]
    fn test_aliases_register_independently() {
        let mut table = RouteTable::new();
        table
            .add_route(route("/product/:id").named("product").alias("/p/:id"))
            .unwrap();
        assert_eq!(table.len(), 2);

        let matched = table.match_path("/p/9").unwrap().unwrap();
        assert_eq!(matched.route.pattern(), "/p/:id");
        assert_eq!(matched.route.name(), Some("product"));
        assert!(matched.route.aliases().is_empty());
        assert_eq!(matched.params.get("id"), Some("9"));

        // Named lookup keeps pointing at the primary pattern.
        let params: RouteParams = [("id", "9")].into_iter().collect();
        assert_eq!(table.url_for("product", &params).unwrap(), "/product/9");
    }

    #[test]
    fn test_bad_alias_registers_nothing() {
        let mut table = RouteTable::new();
        let error = table
            .add_route(route("/a/:id").alias("/b/:x/:x"))
            .unwrap_err();
        assert!(matches!(
            error,
            RouterError::Pattern(PatternError::DuplicateParam { .. })
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_url_for_errors() {
        let mut table = RouteTable::new();
        table.add_route(route("/product/:id").named("product")).unwrap();

        assert!(matches!(
            table.url_for("nope", &RouteParams::new()),
            Err(RouterError::UnknownRouteName { name }) if name == "nope"
        ));
        assert!(matches!(
            table.url_for("product", &RouteParams::new()),
            Err(RouterError::MissingParameter { param, .. }) if param == "id"
        ));
    }

    #[test]
    fn test_decode_errors_propagate() {
        let mut table = RouteTable::new();
        table.add_route(route("/search/:q")).unwrap();
        assert!(table.match_path("/search/%E0%A4%A").is_err());
    }
}
