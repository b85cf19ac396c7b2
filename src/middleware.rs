//! Route middleware for cross-cutting navigation concerns.
//!
//! Middleware wraps the render step of every navigation that passed its
//! guards. Each middleware receives the [`NavigationContext`] and a [`Next`]
//! handle; calling [`Next::run`] continues down the stack and, at the bottom,
//! renders the route. Code before the call runs on the way in, code after it
//! on the way out (onion model).
//!
//! | Middleware behaviour | Navigation outcome |
//! |----------------------|--------------------|
//! | awaits `next.run()`, returns `Ok` | committed |
//! | returns `Ok` without calling `next` | aborted, nothing rendered |
//! | returns `Err` | failed, error emitted |
//!
//! # Example
//!
//! ```
//! use web_navigator::middleware_fn;
//!
//! let timing = middleware_fn(|cx, next| async move {
//!     let path = cx.to.path.clone();
//!     next.run().await?;
//!     println!("rendered {path}");
//!     Ok(())
//! });
//! ```

use crate::error::RouterError;
use crate::route::ResolvedLocation;
use crate::router::Router;
use futures::future::LocalBoxFuture;
use std::future::Future;
use std::rc::Rc;

/// Future returned by middleware and the render endpoint.
pub type MiddlewareFuture<'a> = LocalBoxFuture<'a, Result<(), RouterError>>;

type Endpoint = Rc<dyn Fn(Rc<NavigationContext>) -> MiddlewareFuture<'static>>;

/// What middleware sees about the navigation in progress.
pub struct NavigationContext {
    pub to: ResolvedLocation,
    pub from: ResolvedLocation,
    /// The router performing the navigation.
    pub router: Router,
}

impl std::fmt::Debug for NavigationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationContext")
            .field("to", &self.to.path)
            .field("from", &self.from.path)
            .finish()
    }
}

// ============================================================================
// Middleware trait
// ============================================================================

/// Asynchronous navigation middleware.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use web_navigator::{Middleware, MiddlewareFuture, NavigationContext, Next, RouterError};
///
/// struct RequireQuery(&'static str);
///
/// impl Middleware for RequireQuery {
///     fn handle<'a>(&'a self, cx: Rc<NavigationContext>, next: Next) -> MiddlewareFuture<'a> {
///         Box::pin(async move {
///             if cx.to.query.contains(self.0) {
///                 next.run().await
///             } else {
///                 Err(RouterError::custom(format!("missing ?{}", self.0)))
///             }
///         })
///     }
///
///     fn name(&self) -> &'static str {
///         "RequireQuery"
///     }
/// }
/// ```
pub trait Middleware: 'static {
    fn handle<'a>(&'a self, cx: Rc<NavigationContext>, next: Next) -> MiddlewareFuture<'a>;

    /// Middleware name for debugging.
    fn name(&self) -> &'static str {
        "Middleware"
    }
}

/// Create middleware from a closure.
pub fn middleware_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(Rc<NavigationContext>, Next) -> Fut + 'static,
    Fut: Future<Output = Result<(), RouterError>> + 'static,
{
    FnMiddleware { f }
}

/// Middleware created from a closure via [`middleware_fn`].
pub struct FnMiddleware<F> {
    f: F,
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Rc<NavigationContext>, Next) -> Fut + 'static,
    Fut: Future<Output = Result<(), RouterError>> + 'static,
{
    fn handle<'a>(&'a self, cx: Rc<NavigationContext>, next: Next) -> MiddlewareFuture<'a> {
        Box::pin((self.f)(cx, next))
    }
}

// ============================================================================
// Next
// ============================================================================

/// The rest of the middleware stack.
pub struct Next {
    stack: Rc<[Rc<dyn Middleware>]>,
    index: usize,
    endpoint: Endpoint,
    cx: Rc<NavigationContext>,
}

impl Next {
    /// Run the remaining middleware and then the endpoint.
    pub fn run(self) -> MiddlewareFuture<'static> {
        match self.stack.get(self.index).cloned() {
            Some(middleware) => {
                let cx = Rc::clone(&self.cx);
                let next = Next {
                    index: self.index + 1,
                    ..self
                };
                Box::pin(async move { middleware.handle(cx, next).await })
            }
            None => (self.endpoint)(self.cx),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Ordered middleware stack. Registration order is outermost first.
#[derive(Clone, Default)]
pub struct MiddlewarePipeline {
    stack: Vec<Rc<dyn Middleware>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<M: Middleware>(&mut self, middleware: M) {
        self.stack.push(Rc::new(middleware));
    }

    /// Run the stack around `endpoint`.
    pub async fn execute<F, Fut>(&self, cx: Rc<NavigationContext>, endpoint: F) -> Result<(), RouterError>
    where
        F: Fn(Rc<NavigationContext>) -> Fut + 'static,
        Fut: Future<Output = Result<(), RouterError>> + 'static,
    {
        let endpoint: Endpoint =
            Rc::new(move |cx: Rc<NavigationContext>| -> MiddlewareFuture<'static> { Box::pin(endpoint(cx)) });
        let next = Next {
            stack: self.stack.iter().cloned().collect(),
            index: 0,
            endpoint,
            cx,
        };
        next.run().await
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stack.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
