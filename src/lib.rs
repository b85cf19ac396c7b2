//! # web-navigator
//!
//! A History-API router for single-page web applications.
//!
//! - Path patterns with `:params`, optional `:params?`, `*` wildcards and a
//!   catch-all `*` fallback route
//! - Query string parsing and building
//! - `before_each` / `before_enter` guards and `after_each` hooks
//! - Onion-style async middleware around the render step
//! - Lazily loaded components with an LRU cache (`cache` feature)
//! - Per-path scroll restoration and active-link classes
//! - Browser binding over `window.history` and the DOM (`web` feature)
//!
//! Outside the browser the router runs against [`MemoryHistory`] and
//! [`MemoryMount`], which is how the test suite drives it.
//!
//! ## Quick Start
//!
//! ```
//! use web_navigator::{
//!     guard_fn, MemoryHistory, MemoryMount, NavigateOptions, NavigationAction, Route, Router,
//!     RouterOptions, View,
//! };
//!
//! let mount = MemoryMount::new("#app");
//! let router = Router::new(RouterOptions::default(), MemoryHistory::new(), mount.clone());
//!
//! router
//!     .add(Route::new("/", |_| View::markup("<h1>Home</h1>")))?
//!     .add(Route::new("/admin", |_| View::markup("<h1>Admin</h1>")).with_meta("requiresAuth", true))?
//!     .add(Route::new("/login", |_| View::markup("<h1>Login</h1>")))?
//!     .add(Route::new("*", |_| View::markup("<h1>Not Found</h1>")))?;
//!
//! router.before_each(guard_fn(|to, _from| {
//!     let protected = to.meta_flag("requiresAuth");
//!     async move {
//!         if protected {
//!             NavigationAction::redirect("/login")
//!         } else {
//!             NavigationAction::Continue
//!         }
//!     }
//! }));
//!
//! pollster::block_on(router.navigate("/admin", NavigateOptions::default()));
//! assert_eq!(router.current_route().unwrap().path, "/login");
//! assert_eq!(mount.html(), "<h1>Login</h1>");
//! # Ok::<(), web_navigator::RouterError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `log` | yes | logging through the `log` crate |
//! | `tracing` | no | logging through the `tracing` crate |
//! | `cache` | yes | LRU cache for lazily loaded components |
//! | `web` | no | [`web`] module: browser history, DOM mount, link interception |

#![cfg_attr(docsrs, feature(doc_cfg))]

// Logging macros must come first
#[macro_use]
pub mod logging;

#[cfg(feature = "cache")]
pub mod cache;
pub mod error;
pub mod events;
pub mod guards;
pub mod history;
pub mod links;
pub mod middleware;
pub mod mount;
pub mod options;
pub mod params;
pub mod pattern;
pub mod route;
pub mod router;
pub mod table;
pub mod view;
#[cfg(feature = "web")]
#[cfg_attr(docsrs, doc(cfg(feature = "web")))]
pub mod web;

pub use error::{ComponentError, DecodeError, NavigationResult, PatternError, RouterError};
pub use events::{EventBus, ListenerId, RouterEvent};
pub use guards::{guard_fn, AuthGuard, GuardChain, GuardFuture, NavigationAction, NavigationGuard};
pub use history::{HistoryAdapter, HistoryBackend, Location, MemoryHistory};
pub use links::{LinkClasses, LinkClick, LinkState};
pub use middleware::{
    middleware_fn, Middleware, MiddlewareFuture, MiddlewarePipeline, NavigationContext, Next,
};
pub use mount::{MemoryMount, MountTarget};
pub use options::RouterOptions;
pub use params::{QueryParams, RouteParams};
pub use pattern::PathPattern;
pub use route::{Component, MetaMap, Redirect, ResolvedLocation, Route, RouteContext, StateMap};
pub use router::{NavigateOptions, Router};
pub use table::{MatchResult, RouteTable};
pub use view::{Element, View};

/// Strip a single trailing `/`, leaving `/` itself alone.
///
/// ```
/// use web_navigator::normalize_path;
///
/// assert_eq!(normalize_path("/products/"), "/products");
/// assert_eq!(normalize_path("/products//"), "/products/");
/// assert_eq!(normalize_path("/"), "/");
/// ```
pub fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}
