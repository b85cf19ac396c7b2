//! Route definitions and resolved locations.
//!
//! A [`Route`] binds a path pattern to a [`Component`] and carries the
//! per-route options: a name for reverse routing, arbitrary `meta` data, a
//! `before_enter` guard, a redirect, and aliases.
//!
//! ```
//! use web_navigator::{Route, View};
//!
//! let route = Route::new("/product/:id", |cx| {
//!     View::markup(format!("<h1>Product {}</h1>", cx.params.get("id").unwrap_or("?")))
//! })
//! .named("product")
//! .with_meta("title", "Product")
//! .alias("/p/:id");
//!
//! assert_eq!(route.pattern(), "/product/:id");
//! assert_eq!(route.name(), Some("product"));
//! assert_eq!(route.aliases(), ["/p/:id"]);
//! ```

use crate::error::ComponentError;
use crate::guards::NavigationGuard;
use crate::params::{QueryParams, RouteParams};
use crate::table::MatchResult;
use crate::view::View;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

/// Route `meta` data.
pub type MetaMap = serde_json::Map<String, Value>;

/// History entry state.
pub type StateMap = serde_json::Map<String, Value>;

/// A synchronous component producer.
pub type RenderFn = dyn Fn(&RouteContext) -> View;

/// Future returned by a lazy component loader.
pub type LoadFuture = LocalBoxFuture<'static, Result<Component, ComponentError>>;

// ============================================================================
// Components
// ============================================================================

/// What a component receives when it renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteContext {
    pub params: RouteParams,
    pub query: QueryParams,
    pub state: StateMap,
}

/// A route's view producer.
#[derive(Clone)]
pub enum Component {
    /// Render directly from the route context.
    Render(Rc<RenderFn>),
    /// Load the real component on first use.
    Lazy(LazyComponent),
}

impl Component {
    /// A component backed by a render function.
    pub fn from_fn<F>(render: F) -> Self
    where
        F: Fn(&RouteContext) -> View + 'static,
    {
        Component::Render(Rc::new(render))
    }

    /// A component resolved by an async loader.
    ///
    /// `name` identifies the component in errors and in the component cache.
    pub fn lazy<F, Fut>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<Component, ComponentError>> + 'static,
    {
        Component::Lazy(LazyComponent {
            name: name.into(),
            loader: Rc::new(move || -> LoadFuture { Box::pin(loader()) }),
        })
    }

    /// A component that renders nothing.
    pub fn empty() -> Self {
        Component::from_fn(|_| View::Empty)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Render(_) => f.write_str("Component::Render"),
            Component::Lazy(lazy) => write!(f, "Component::Lazy({})", lazy.name),
        }
    }
}

/// A component loaded on demand.
#[derive(Clone)]
pub struct LazyComponent {
    name: String,
    loader: Rc<dyn Fn() -> LoadFuture>,
}

impl LazyComponent {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start loading.
    pub fn load(&self) -> LoadFuture {
        (self.loader)()
    }
}

// ============================================================================
// Redirects
// ============================================================================

/// Where a redirecting route sends the navigation.
#[derive(Clone)]
pub enum Redirect {
    /// A fixed target path.
    To(String),
    /// A target computed from the match.
    With(Rc<dyn Fn(&MatchResult) -> String>),
}

impl Redirect {
    /// Resolve the redirect target for a match.
    pub fn target(&self, matched: &MatchResult) -> String {
        match self {
            Redirect::To(path) => path.clone(),
            Redirect::With(resolve) => resolve(matched),
        }
    }
}

impl fmt::Debug for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redirect::To(path) => f.debug_tuple("To").field(path).finish(),
            Redirect::With(_) => f.write_str("With(..)"),
        }
    }
}

// ============================================================================
// Route
// ============================================================================

/// A route definition.
#[derive(Clone)]
pub struct Route {
    pattern: String,
    component: Component,
    name: Option<String>,
    meta: MetaMap,
    guard: Option<Rc<dyn NavigationGuard>>,
    redirect: Option<Redirect>,
    aliases: Vec<String>,
}

impl Route {
    /// Create a route rendering `render` for `pattern`.
    pub fn new<F>(pattern: impl Into<String>, render: F) -> Self
    where
        F: Fn(&RouteContext) -> View + 'static,
    {
        Self::with_component(pattern, Component::from_fn(render))
    }

    /// Create a route with an explicit component.
    pub fn with_component(pattern: impl Into<String>, component: Component) -> Self {
        Self {
            pattern: pattern.into(),
            component,
            name: None,
            meta: MetaMap::new(),
            guard: None,
            redirect: None,
            aliases: Vec::new(),
        }
    }

    /// Create a route whose component is loaded on first navigation.
    pub fn lazy<F, Fut>(pattern: impl Into<String>, name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<Component, ComponentError>> + 'static,
    {
        Self::with_component(pattern, Component::lazy(name, loader))
    }

    /// Create a route that only redirects.
    pub fn redirect(pattern: impl Into<String>, to: impl Into<String>) -> Self {
        Self::with_component(pattern, Component::empty()).redirect_to(to)
    }

    // Builder -----------------------------------------------------------------

    /// Name the route for [`url_for`](crate::Router::url_for).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add one `meta` entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Replace the whole `meta` map.
    pub fn meta_map(mut self, meta: MetaMap) -> Self {
        self.meta = meta;
        self
    }

    /// Guard run after the global `before_each` guards, only for this route.
    pub fn before_enter<G: NavigationGuard>(mut self, guard: G) -> Self {
        self.guard = Some(Rc::new(guard));
        self
    }

    /// Redirect to a fixed path instead of rendering.
    pub fn redirect_to(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(Redirect::To(to.into()));
        self
    }

    /// Redirect to a path computed from the match.
    pub fn redirect_with<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&MatchResult) -> String + 'static,
    {
        self.redirect = Some(Redirect::With(Rc::new(resolve)));
        self
    }

    /// Register the same route under another pattern.
    pub fn alias(mut self, pattern: impl Into<String>) -> Self {
        self.aliases.push(pattern.into());
        self
    }

    // Accessors ---------------------------------------------------------------

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    pub fn guard(&self) -> Option<&Rc<dyn NavigationGuard>> {
        self.guard.as_ref()
    }

    pub fn redirect_target(&self) -> Option<&Redirect> {
        self.redirect.as_ref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// A copy of this route registered under `pattern`, without aliases.
    pub(crate) fn for_alias(&self, pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            aliases: Vec::new(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("component", &self.component)
            .field("name", &self.name)
            .field("meta", &self.meta)
            .field("guard", &self.guard.as_ref().map(|g| g.name()))
            .field("redirect", &self.redirect)
            .field("aliases", &self.aliases)
            .finish()
    }
}

// ============================================================================
// Resolved Location
// ============================================================================

/// A fully resolved navigation target, as seen by guards and listeners.
///
/// `path` is the normalized pathname without query or hash. Before the first
/// navigation, `from` is [`ResolvedLocation::empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLocation {
    pub path: String,
    pub params: RouteParams,
    pub query: QueryParams,
    pub state: StateMap,
    pub meta: MetaMap,
    pub name: Option<String>,
}

impl ResolvedLocation {
    /// The location before any navigation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `true` for [`ResolvedLocation::empty`].
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Read a boolean `meta` flag, `false` if absent or not a bool.
    pub fn meta_flag(&self, key: &str) -> bool {
        self.meta.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// The context handed to the component.
    pub fn to_context(&self) -> RouteContext {
        RouteContext {
            params: self.params.clone(),
            query: self.query.clone(),
            state: self.state.clone(),
        }
    }
}
