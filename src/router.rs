//! The navigation controller.
//!
//! [`Router`] ties the route table, history, guard chain, middleware
//! pipeline, mount target and event listeners together. Every public
//! navigation runs the same pipeline:
//!
//! 1. split the target into pathname and query, parse the query
//! 2. match the pathname, falling back to the `*` route
//! 3. follow the route's redirect, if any
//! 4. run `before_each` guards, then the route's `before_enter` guard
//! 5. emit `BeforeNavigate`, run middleware around the render step
//! 6. commit: the new location becomes current, the old one previous
//! 7. run `after_each` hooks, emit `Navigate` and `AfterNavigate`,
//!    refresh link classes, restore scroll
//!
//! Redirects (from a route or a guard) replace the current history entry and
//! restart at step 1, up to [`RouterOptions::max_redirects`] times.
//!
//! Only one navigation runs at a time. A call made while another is in
//! flight returns [`NavigationResult::Dropped`] without touching history.
//!
//! # Example
//!
//! ```
//! use web_navigator::{MemoryHistory, MemoryMount, NavigateOptions, Route, Router, RouterOptions, View};
//!
//! let mount = MemoryMount::new("#app");
//! let router = Router::new(RouterOptions::default(), MemoryHistory::new(), mount.clone());
//! router
//!     .add(Route::new("/", |_| View::markup("<h1>Home</h1>")))?
//!     .add(Route::new("/product/:id", |cx| {
//!         View::markup(format!("<h1>Product {}</h1>", cx.params.get("id").unwrap_or_default()))
//!     }))?;
//!
//! let result = pollster::block_on(router.navigate("/product/7", NavigateOptions::default()));
//! assert!(result.is_committed());
//! assert_eq!(mount.html(), "<h1>Product 7</h1>");
//! # Ok::<(), web_navigator::RouterError>(())
//! ```

use crate::error::{NavigationResult, RouterError};
use crate::events::{EventBus, ListenerId, RouterEvent};
use crate::guards::{GuardChain, NavigationAction, NavigationGuard};
use crate::history::{HistoryAdapter, HistoryBackend, Location};
use crate::middleware::{Middleware, MiddlewarePipeline, NavigationContext};
use crate::mount::{Content, MountTarget};
use crate::options::RouterOptions;
use crate::params::{build_url, parse_query, QueryParams, RouteParams};
use crate::route::{Component, RenderFn, ResolvedLocation, Route, StateMap};
use crate::table::{MatchResult, RouteTable};
use crate::view::View;
use crate::{debug_log, error_log, info_log, trace_log, warn_log};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, ComponentCache};

/// State key that skips scroll restoration when set to `true`.
pub const PRESERVE_SCROLL: &str = "preserveScroll";

/// Per-call navigation options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
    /// State stored with the history entry and handed to the component.
    pub state: StateMap,
    /// Replace the current entry instead of pushing.
    pub replace: bool,
    /// Query appended to the path with [`build_url`].
    pub query: Option<QueryParams>,
}

impl NavigateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn with_state(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = Some(query);
        self
    }

    /// Keep the current scroll offset after this navigation.
    pub fn preserve_scroll(self) -> Self {
        self.with_state(PRESERVE_SCROLL, true)
    }
}

enum Step {
    Committed(ResolvedLocation),
    Aborted,
    Redirect(String),
}

/// Clears the in-flight flag when the navigation ends, however it ends.
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

struct RouterInner {
    options: RouterOptions,
    table: RefCell<RouteTable>,
    guards: RefCell<GuardChain>,
    middleware: RefCell<MiddlewarePipeline>,
    history: HistoryAdapter,
    mount: Box<dyn MountTarget>,
    events: EventBus,
    current: RefCell<Option<ResolvedLocation>>,
    previous: RefCell<Option<ResolvedLocation>>,
    navigating: Cell<bool>,
    #[cfg(feature = "cache")]
    components: RefCell<ComponentCache>,
}

/// Client-side router. Cloning yields another handle to the same router.
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    pub fn new(
        options: RouterOptions,
        history: impl HistoryBackend + 'static,
        mount: impl MountTarget + 'static,
    ) -> Self {
        #[cfg(feature = "cache")]
        let components = RefCell::new(ComponentCache::with_capacity(
            options.component_cache_capacity,
        ));

        Self {
            inner: Rc::new(RouterInner {
                options,
                table: RefCell::new(RouteTable::new()),
                guards: RefCell::new(GuardChain::new()),
                middleware: RefCell::new(MiddlewarePipeline::new()),
                history: HistoryAdapter::new(history),
                mount: Box::new(mount),
                events: EventBus::new(),
                current: RefCell::new(None),
                previous: RefCell::new(None),
                navigating: Cell::new(false),
                #[cfg(feature = "cache")]
                components,
            }),
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a route and its aliases.
    pub fn add(&self, route: Route) -> Result<&Self, RouterError> {
        let pattern = route.pattern().to_string();
        self.inner.table.borrow_mut().add_route(route)?;
        info_log!("Route added: '{}'", pattern);
        Ok(self)
    }

    pub fn use_middleware<M: Middleware>(&self, middleware: M) -> &Self {
        debug_log!("Middleware added: '{}'", middleware.name());
        self.inner.middleware.borrow_mut().push(middleware);
        self
    }

    pub fn before_each<G: NavigationGuard>(&self, guard: G) -> &Self {
        debug_log!("Global guard added: '{}'", guard.name());
        self.inner.guards.borrow_mut().before_each(guard);
        self
    }

    pub fn after_each<F, Fut>(&self, hook: F) -> &Self
    where
        F: Fn(&ResolvedLocation, &ResolvedLocation) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.inner.guards.borrow_mut().after_each(hook);
        self
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn on_before_navigate<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ResolvedLocation, &ResolvedLocation) + 'static,
    {
        self.inner.events.on(RouterEvent::BeforeNavigate, listener)
    }

    pub fn on_navigate<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ResolvedLocation, &ResolvedLocation) + 'static,
    {
        self.inner.events.on(RouterEvent::Navigate, listener)
    }

    pub fn on_after_navigate<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ResolvedLocation, &ResolvedLocation) + 'static,
    {
        self.inner.events.on(RouterEvent::AfterNavigate, listener)
    }

    pub fn on_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&RouterError) + 'static,
    {
        self.inner.events.on_error(listener)
    }

    /// Remove a listener registered with any `on_*` method.
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigate to `path`, pushing (or replacing) a history entry first.
    pub async fn navigate(&self, path: &str, options: NavigateOptions) -> NavigationResult {
        let Some(_flight) = self.begin(path) else {
            return NavigationResult::Dropped;
        };

        let target = match &options.query {
            Some(query) => build_url(path, query),
            None => path.to_string(),
        };
        debug_log!("Navigating to '{}'", target);

        let written = if options.replace {
            self.inner.history.replace(&target, options.state.clone())
        } else {
            self.inner.history.push(&target, options.state.clone())
        };
        if let Err(error) = written {
            return self.fail(error);
        }

        self.run(target, options.state).await
    }

    /// [`navigate`](Self::navigate) with `replace` set.
    pub async fn replace(&self, path: &str, options: NavigateOptions) -> NavigationResult {
        self.navigate(path, options.replace()).await
    }

    /// Navigate to a named route.
    pub async fn navigate_named(
        &self,
        name: &str,
        params: &RouteParams,
        options: NavigateOptions,
    ) -> NavigationResult {
        match self.url_for(name, params) {
            Ok(path) => self.navigate(&path, options).await,
            Err(error) => self.fail(error),
        }
    }

    /// Traverse history by `delta` entries.
    ///
    /// Returns `None` when the backend reports the move later through a pop
    /// event (browser) or the move is out of range.
    pub async fn go(&self, delta: isize) -> Option<NavigationResult> {
        let Some(_flight) = self.begin("history traversal") else {
            return Some(NavigationResult::Dropped);
        };
        let location = self.inner.history.go(delta)?;
        Some(self.run(location.full_path(), location.state).await)
    }

    pub async fn back(&self) -> Option<NavigationResult> {
        self.go(-1).await
    }

    pub async fn forward(&self) -> Option<NavigationResult> {
        self.go(1).await
    }

    /// Resolve a traversal the user made through the browser.
    pub async fn handle_pop(&self, location: Location) -> NavigationResult {
        let Some(_flight) = self.begin(&location.path) else {
            return NavigationResult::Dropped;
        };
        self.inner.history.notify_pop(&location);
        self.run(location.full_path(), location.state).await
    }

    /// Resolve the history's current entry without touching history.
    pub async fn start(&self) -> NavigationResult {
        let location = self.inner.history.current_location();
        let Some(_flight) = self.begin(&location.path) else {
            return NavigationResult::Dropped;
        };
        info_log!("Router started at '{}'", location.full_path());
        self.run(location.full_path(), location.state).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn current_route(&self) -> Option<ResolvedLocation> {
        self.inner.current.borrow().clone()
    }

    pub fn previous_route(&self) -> Option<ResolvedLocation> {
        self.inner.previous.borrow().clone()
    }

    /// `true` if the current path equals `path`, or starts with it when
    /// `exact` is `false`.
    pub fn is_active(&self, path: &str, exact: bool) -> bool {
        let current = self.inner.current.borrow();
        let Some(current) = current.as_ref() else {
            return false;
        };
        if exact {
            current.path == path
        } else {
            current.path.starts_with(path)
        }
    }

    /// `true` while a navigation is running.
    pub fn is_navigating(&self) -> bool {
        self.inner.navigating.get()
    }

    /// Build the path of a named route.
    pub fn url_for(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
        self.inner.table.borrow().url_for(name, params)
    }

    /// Match a path without navigating.
    pub fn resolve(&self, path: &str) -> Result<Option<MatchResult>, RouterError> {
        Ok(self.inner.table.borrow().match_path(path)?)
    }

    pub fn route_count(&self) -> usize {
        self.inner.table.borrow().len()
    }

    pub fn options(&self) -> &RouterOptions {
        &self.inner.options
    }

    pub fn history(&self) -> &HistoryAdapter {
        &self.inner.history
    }

    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.components.borrow().stats().clone()
    }

    /// Drop a resolved lazy component so its loader runs again.
    #[cfg(feature = "cache")]
    pub fn invalidate_component(&self, name: &str) -> bool {
        self.inner.components.borrow_mut().invalidate(name)
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    fn begin(&self, target: &str) -> Option<InFlight<'_>> {
        if self.inner.navigating.get() {
            warn_log!("Navigation already in progress, dropping '{}'", target);
            return None;
        }
        self.inner.navigating.set(true);
        Some(InFlight(&self.inner.navigating))
    }

    fn fail(&self, error: RouterError) -> NavigationResult {
        error_log!("Router error: {}", error);
        self.inner.events.emit_error(&error);
        NavigationResult::Failed(error)
    }

    async fn run(&self, mut url: String, mut state: StateMap) -> NavigationResult {
        let mut redirects = 0;
        loop {
            match self.resolve_once(&url, state).await {
                Ok(Step::Committed(location)) => return NavigationResult::Committed(location),
                Ok(Step::Aborted) => return NavigationResult::Aborted,
                Ok(Step::Redirect(target)) => {
                    redirects += 1;
                    if redirects > self.inner.options.max_redirects {
                        return self.fail(RouterError::RedirectLoop {
                            path: target,
                            depth: redirects,
                        });
                    }
                    debug_log!("Redirecting '{}' -> '{}'", url, target);
                    state = StateMap::new();
                    if let Err(error) = self.inner.history.replace(&target, StateMap::new()) {
                        return self.fail(error);
                    }
                    url = target;
                }
                Err(error) => return self.fail(error),
            }
        }
    }

    async fn resolve_once(&self, url: &str, state: StateMap) -> Result<Step, RouterError> {
        let location = Location::parse(url, state);
        let query = parse_query(&location.search)?;

        let matched = {
            let table = self.inner.table.borrow();
            match table.match_path(&location.path)? {
                Some(matched) => Some(matched),
                None => table.fallback(&location.path),
            }
        };
        let Some(matched) = matched else {
            return Err(RouterError::NotFound {
                path: location.path,
            });
        };
        trace_log!(
            "'{}' resolved to route '{}'",
            location.path,
            matched.route.pattern()
        );

        if let Some(redirect) = matched.route.redirect_target() {
            return Ok(Step::Redirect(redirect.target(&matched)));
        }

        let route = Rc::clone(&matched.route);
        let from = self.current_route().unwrap_or_default();
        let to = ResolvedLocation {
            path: matched.matched_path,
            params: matched.params,
            query,
            state: location.state,
            meta: route.meta().clone(),
            name: route.name().map(str::to_string),
        };

        let chain = self.inner.guards.borrow().clone();
        if let Some(step) = Self::interpret(chain.run_before(&to, &from).await) {
            return Ok(step);
        }
        if let Some(guard) = route.guard() {
            if let Some(step) = Self::interpret(guard.check(&to, &from).await) {
                return Ok(step);
            }
        }

        self.inner.events.emit(RouterEvent::BeforeNavigate, &to, &from);

        let rendered = Rc::new(Cell::new(false));
        let endpoint = {
            let router = self.clone();
            let route = Rc::clone(&route);
            let rendered = Rc::clone(&rendered);
            move |cx: Rc<NavigationContext>| {
                let router = router.clone();
                let route = Rc::clone(&route);
                let rendered = Rc::clone(&rendered);
                async move {
                    router.render(&route, &cx.to).await?;
                    rendered.set(true);
                    Ok(())
                }
            }
        };
        let cx = Rc::new(NavigationContext {
            to: to.clone(),
            from: from.clone(),
            router: self.clone(),
        });
        let pipeline = self.inner.middleware.borrow().clone();
        pipeline.execute(cx, endpoint).await?;

        if !rendered.get() {
            debug_log!("Middleware stopped navigation to '{}'", to.path);
            return Ok(Step::Aborted);
        }

        self.commit(&to, &from, &chain).await;
        Ok(Step::Committed(to))
    }

    fn interpret(action: NavigationAction) -> Option<Step> {
        match action {
            NavigationAction::Continue => None,
            NavigationAction::Deny { reason } => {
                debug_log!("Navigation denied: {}", reason);
                Some(Step::Aborted)
            }
            NavigationAction::Redirect { to, .. } => Some(Step::Redirect(to)),
        }
    }

    async fn commit(&self, to: &ResolvedLocation, from: &ResolvedLocation, chain: &GuardChain) {
        let previous = self.inner.current.replace(Some(to.clone()));
        *self.inner.previous.borrow_mut() = previous;

        chain.run_after(to, from).await;
        self.inner.events.emit(RouterEvent::Navigate, to, from);
        self.inner.events.emit(RouterEvent::AfterNavigate, to, from);

        self.inner
            .mount
            .refresh_links(&to.path, &self.inner.options.link_classes());

        let preserve = to.state.get(PRESERVE_SCROLL).and_then(Value::as_bool) == Some(true);
        if !preserve {
            self.inner.history.restore_scroll(&to.path);
        }
        info_log!("Navigated to '{}'", to.path);
    }

    async fn render(&self, route: &Route, to: &ResolvedLocation) -> Result<(), RouterError> {
        let render = self.resolve_component(route.component()).await?;
        let mut view = render(&to.to_context());
        let selector = self.inner.options.mount_selector.as_str();
        loop {
            match view {
                View::Deferred(pending) => view = pending.await?,
                View::Markup(html) => {
                    return self
                        .inner
                        .mount
                        .replace_content(selector, Content::Markup(&html))
                }
                View::Node(element) => {
                    return self
                        .inner
                        .mount
                        .replace_content(selector, Content::Node(&element))
                }
                View::Empty => {
                    trace_log!("Route '{}' rendered nothing", route.pattern());
                    return Ok(());
                }
            }
        }
    }

    async fn resolve_component(&self, component: &Component) -> Result<Rc<RenderFn>, RouterError> {
        let mut current = component.clone();
        let mut cache_key: Option<String> = None;
        loop {
            match current {
                Component::Render(render) => {
                    if let Some(key) = cache_key {
                        self.store_component(key, &render);
                    }
                    return Ok(render);
                }
                Component::Lazy(lazy) => {
                    if let Some(render) = self.cached_component(lazy.name()) {
                        return Ok(render);
                    }
                    debug_log!("Loading component '{}'", lazy.name());
                    current = lazy.load().await.map_err(|source| {
                        RouterError::ComponentResolution {
                            component: lazy.name().to_string(),
                            source,
                        }
                    })?;
                    cache_key.get_or_insert_with(|| lazy.name().to_string());
                }
            }
        }
    }

    #[cfg(feature = "cache")]
    fn cached_component(&self, name: &str) -> Option<Rc<RenderFn>> {
        self.inner.components.borrow_mut().get(name)
    }

    #[cfg(not(feature = "cache"))]
    fn cached_component(&self, _name: &str) -> Option<Rc<RenderFn>> {
        None
    }

    #[cfg(feature = "cache")]
    fn store_component(&self, name: String, render: &Rc<RenderFn>) {
        self.inner
            .components
            .borrow_mut()
            .insert(name, Rc::clone(render));
    }

    #[cfg(not(feature = "cache"))]
    fn store_component(&self, _name: String, _render: &Rc<RenderFn>) {}
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("options", &self.inner.options)
            .field("routes", &*self.inner.table.borrow())
            .field("current", &*self.inner.current.borrow())
            .field("navigating", &self.inner.navigating.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::mount::MemoryMount;

    fn router() -> (Router, MemoryHistory, MemoryMount) {
        let history = MemoryHistory::new();
        let mount = MemoryMount::new("#app");
        let router = Router::new(RouterOptions::default(), history.clone(), mount.clone());
        (router, history, mount)
    }

    #[test]
    fn test_navigate_options_builder() {
        let options = NavigateOptions::new()
            .replace()
            .with_state("from", "menu")
            .preserve_scroll();
        assert!(options.replace);
        assert_eq!(options.state.get(PRESERVE_SCROLL), Some(&Value::Bool(true)));
        assert_eq!(options.state.get("from"), Some(&Value::from("menu")));
    }

    #[test]
    fn test_in_flight_flag_resets() {
        let (router, _, _) = router();
        {
            let flight = router.begin("/a");
            assert!(flight.is_some());
            assert!(router.is_navigating());
            assert!(router.begin("/b").is_none());
        }
        assert!(!router.is_navigating());
    }

    #[test]
    fn test_query_option_is_appended() {
        let (router, history, _) = router();
        router.add(Route::new("/search", |_| View::Empty)).unwrap();

        let query: QueryParams = [("q", "a b")].into_iter().collect();
        let result = pollster::block_on(
            router.navigate("/search", NavigateOptions::new().with_query(query)),
        );

        let location = result.location().cloned().unwrap();
        assert_eq!(location.query.get("q"), Some("a b"));
        assert_eq!(history.paths(), ["/", "/search?q=a%20b"]);
    }

    #[test]
    fn test_is_active() {
        let (router, _, _) = router();
        router.add(Route::new("/products/:id", |_| View::Empty)).unwrap();
        assert!(!router.is_active("/products", false));

        pollster::block_on(router.navigate("/products/3", NavigateOptions::default()));
        assert!(router.is_active("/products", false));
        assert!(!router.is_active("/products", true));
        assert!(router.is_active("/products/3", true));
    }
}
