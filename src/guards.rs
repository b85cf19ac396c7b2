//! Navigation guards and the guard chain.
//!
//! Guards run **before** a route renders and decide whether the navigation
//! continues, stops, or goes somewhere else. They are asynchronous: a guard
//! may await a session check or a confirmation prompt.
//!
//! # Execution order
//!
//! 1. Global guards registered with `before_each`, in registration order
//! 2. The matched route's `before_enter` guard
//!
//! The first non-[`Continue`](NavigationAction::Continue) result
//! short-circuits the rest. `after_each` hooks run once the new route has
//! rendered and committed; they cannot stop anything.
//!
//! # Built-in guards
//!
//! | Guard | Purpose |
//! |-------|---------|
//! | [`AuthGuard`] | Redirects when a route's `meta` requires auth and the user has none |
//!
//! # Example
//!
//! ```
//! use web_navigator::{guard_fn, NavigationAction};
//!
//! let guard = guard_fn(|to, _from| {
//!     let blocked = to.path.starts_with("/admin");
//!     async move {
//!         if blocked {
//!             NavigationAction::redirect("/login")
//!         } else {
//!             NavigationAction::Continue
//!         }
//!     }
//! });
//! ```

use crate::route::ResolvedLocation;
use crate::trace_log;
use futures::future::LocalBoxFuture;
use std::future::Future;
use std::rc::Rc;

// ============================================================================
// NavigationAction
// ============================================================================

/// Result of a guard check.
///
/// # Example
///
/// ```
/// use web_navigator::NavigationAction;
///
/// let action = NavigationAction::deny("Not authorized");
/// assert!(action.is_deny());
///
/// let action = NavigationAction::redirect("/login");
/// assert_eq!(action.redirect_path(), Some("/login"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    /// Let the navigation proceed.
    Continue,

    /// Stop the navigation. Nothing is rendered or committed.
    Deny {
        /// Human-readable reason, logged at debug level.
        reason: String,
    },

    /// Abandon this navigation and start one to `to`.
    Redirect {
        to: String,
        reason: Option<String>,
    },
}

impl NavigationAction {
    /// Alias for [`Continue`](Self::Continue).
    pub fn allow() -> Self {
        Self::Continue
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            reason: None,
        }
    }

    pub fn redirect_with_reason(to: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            reason: Some(reason.into()),
        }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Get the redirect path, if this is a redirect action.
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            Self::Redirect { to, .. } => Some(to.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for NavigationAction {
    /// `true` continues, `false` denies.
    fn from(allowed: bool) -> Self {
        if allowed {
            Self::Continue
        } else {
            Self::deny("Guard returned false")
        }
    }
}

// ============================================================================
// NavigationGuard trait
// ============================================================================

/// Future returned by [`NavigationGuard::check`].
pub type GuardFuture<'a> = LocalBoxFuture<'a, NavigationAction>;

/// An asynchronous navigation check.
///
/// # Example
///
/// ```
/// use web_navigator::{GuardFuture, NavigationAction, NavigationGuard, ResolvedLocation};
///
/// struct MaintenanceGuard {
///     enabled: bool,
/// }
///
/// impl NavigationGuard for MaintenanceGuard {
///     fn check<'a>(&'a self, to: &'a ResolvedLocation, _from: &'a ResolvedLocation) -> GuardFuture<'a> {
///         Box::pin(async move {
///             if self.enabled && to.path != "/maintenance" {
///                 NavigationAction::redirect("/maintenance")
///             } else {
///                 NavigationAction::Continue
///             }
///         })
///     }
/// }
/// ```
pub trait NavigationGuard: 'static {
    /// Decide what happens to the navigation from `from` to `to`.
    fn check<'a>(&'a self, to: &'a ResolvedLocation, from: &'a ResolvedLocation)
        -> GuardFuture<'a>;

    /// Guard name for debugging.
    fn name(&self) -> &'static str {
        "NavigationGuard"
    }
}

/// Create a guard from a closure returning a future.
///
/// The closure gets borrowed locations; copy what the future needs out of
/// them before the `async move` block.
pub fn guard_fn<F, Fut>(f: F) -> FnGuard<F>
where
    F: Fn(&ResolvedLocation, &ResolvedLocation) -> Fut + 'static,
    Fut: Future<Output = NavigationAction> + 'static,
{
    FnGuard { f }
}

/// Guard created from a function or closure.
pub struct FnGuard<F> {
    f: F,
}

impl<F, Fut> NavigationGuard for FnGuard<F>
where
    F: Fn(&ResolvedLocation, &ResolvedLocation) -> Fut + 'static,
    Fut: Future<Output = NavigationAction> + 'static,
{
    fn check<'a>(
        &'a self,
        to: &'a ResolvedLocation,
        from: &'a ResolvedLocation,
    ) -> GuardFuture<'a> {
        Box::pin((self.f)(to, from))
    }
}

// ============================================================================
// AuthGuard
// ============================================================================

/// Function type for authentication checks.
pub type AuthCheckFn = Box<dyn Fn() -> bool>;

/// Redirects to a login path when the target route's `meta` marks it as
/// requiring authentication and the check function says the user is not
/// signed in.
///
/// The meta key defaults to `requiresAuth`. Navigations to the login path
/// itself always continue.
///
/// ```
/// use web_navigator::{AuthGuard, NavigationGuard, ResolvedLocation};
///
/// let guard = AuthGuard::new(|| false, "/login");
///
/// let mut to = ResolvedLocation::empty();
/// to.path = "/admin".into();
/// to.meta.insert("requiresAuth".into(), true.into());
///
/// let action = pollster::block_on(guard.check(&to, &ResolvedLocation::empty()));
/// assert_eq!(action.redirect_path(), Some("/login"));
/// ```
pub struct AuthGuard {
    check_fn: AuthCheckFn,
    redirect_path: String,
    meta_key: String,
}

impl AuthGuard {
    pub fn new<F>(check_fn: F, redirect_path: impl Into<String>) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Self {
            check_fn: Box::new(check_fn),
            redirect_path: redirect_path.into(),
            meta_key: "requiresAuth".to_string(),
        }
    }

    /// Use a different `meta` flag than `requiresAuth`.
    pub fn meta_key(mut self, key: impl Into<String>) -> Self {
        self.meta_key = key.into();
        self
    }
}

impl NavigationGuard for AuthGuard {
    fn check<'a>(
        &'a self,
        to: &'a ResolvedLocation,
        _from: &'a ResolvedLocation,
    ) -> GuardFuture<'a> {
        let action = if !to.meta_flag(&self.meta_key)
            || to.path == self.redirect_path
            || (self.check_fn)()
        {
            NavigationAction::Continue
        } else {
            NavigationAction::redirect_with_reason(&self.redirect_path, "Authentication required")
        };
        Box::pin(futures::future::ready(action))
    }

    fn name(&self) -> &'static str {
        "AuthGuard"
    }
}

// ============================================================================
// GuardChain
// ============================================================================

/// Hook run after a navigation commits.
pub type AfterHook = Rc<dyn Fn(&ResolvedLocation, &ResolvedLocation) -> LocalBoxFuture<'static, ()>>;

/// Global `before_each` guards and `after_each` hooks.
///
/// Cloning is cheap; the router snapshots the chain before awaiting it so
/// hooks may register further hooks while running.
#[derive(Clone, Default)]
pub struct GuardChain {
    before: Vec<Rc<dyn NavigationGuard>>,
    after: Vec<AfterHook>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a guard run before every navigation.
    pub fn before_each<G: NavigationGuard>(&mut self, guard: G) {
        self.before.push(Rc::new(guard));
    }

    /// Append a hook run after every committed navigation.
    pub fn after_each<F, Fut>(&mut self, hook: F)
    where
        F: Fn(&ResolvedLocation, &ResolvedLocation) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let hook: AfterHook = Rc::new(
            move |to: &ResolvedLocation, from: &ResolvedLocation| -> LocalBoxFuture<'static, ()> {
                Box::pin(hook(to, from))
            },
        );
        self.after.push(hook);
    }

    /// Run `before_each` guards in order until one does not continue.
    pub async fn run_before(&self, to: &ResolvedLocation, from: &ResolvedLocation) -> NavigationAction {
        for guard in &self.before {
            let action = guard.check(to, from).await;
            trace_log!("Guard '{}' returned {:?}", guard.name(), action);
            if !action.is_continue() {
                return action;
            }
        }
        NavigationAction::Continue
    }

    /// Run every `after_each` hook in order.
    pub async fn run_after(&self, to: &ResolvedLocation, from: &ResolvedLocation) {
        for hook in &self.after {
            hook(to, from).await;
        }
    }

    pub fn before_count(&self) -> usize {
        self.before.len()
    }

    pub fn after_count(&self) -> usize {
        self.after.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn location(path: &str) -> ResolvedLocation {
        ResolvedLocation {
            path: path.to_string(),
            ..ResolvedLocation::default()
        }
    }

    #[test]
    fn test_navigation_action_helpers() {
        assert!(NavigationAction::allow().is_continue());
        assert!(NavigationAction::deny("no").is_deny());
        let redirect = NavigationAction::redirect_with_reason("/login", "auth");
        assert!(redirect.is_redirect());
        assert_eq!(redirect.redirect_path(), Some("/login"));
        assert_eq!(NavigationAction::Continue.redirect_path(), None);
    }

    #[test]
    fn test_bool_into_action() {
        assert!(NavigationAction::from(true).is_continue());
        assert!(NavigationAction::from(false).is_deny());
    }

    #[test]
    fn test_guard_fn_default_name() {
        let guard = guard_fn(|_, _| async { NavigationAction::Continue });
        assert_eq!(guard.name(), "NavigationGuard");
    }

    #[test]
    fn test_auth_guard_ignores_public_routes() {
        let guard = AuthGuard::new(|| false, "/login");
        let action = pollster::block_on(guard.check(&location("/"), &location("")));
        assert!(action.is_continue());
    }

    #[test]
    fn test_auth_guard_allows_authenticated() {
        let guard = AuthGuard::new(|| true, "/login");
        let mut to = location("/admin");
        to.meta.insert("requiresAuth".into(), true.into());
        let action = pollster::block_on(guard.check(&to, &location("")));
        assert!(action.is_continue());
    }

    #[test]
    fn test_auth_guard_custom_meta_key() {
        let guard = AuthGuard::new(|| false, "/signin").meta_key("private");
        let mut to = location("/inbox");
        to.meta.insert("private".into(), true.into());
        let action = pollster::block_on(guard.check(&to, &location("")));
        assert_eq!(action.redirect_path(), Some("/signin"));
        assert_eq!(guard.name(), "AuthGuard");
    }

    #[test]
    fn test_chain_short_circuits() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut chain = GuardChain::new();

        for (label, action) in [
            ("first", NavigationAction::Continue),
            ("second", NavigationAction::deny("stop")),
            ("third", NavigationAction::Continue),
        ] {
            let calls = Rc::clone(&calls);
            chain.before_each(guard_fn(move |_, _| {
                calls.borrow_mut().push(label);
                let action = action.clone();
                async move { action }
            }));
        }

        let result = pollster::block_on(chain.run_before(&location("/x"), &location("")));
        assert!(result.is_deny());
        assert_eq!(*calls.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_after_hooks_run_in_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut chain = GuardChain::new();
        for label in ["a", "b"] {
            let calls = Rc::clone(&calls);
            chain.after_each(move |to, _from| {
                calls.borrow_mut().push(format!("{label}:{}", to.path));
                async {}
            });
        }

        pollster::block_on(chain.run_after(&location("/done"), &location("")));
        assert_eq!(*calls.borrow(), vec!["a:/done", "b:/done"]);
        assert_eq!(chain.after_count(), 2);
    }
}
