//! Error handling for the router.
//!
//! This module defines the types returned when a navigation attempt cannot
//! complete successfully:
//!
//! - [`NavigationResult`]: the outcome of every public navigation call
//!   (`Committed`, `Aborted`, `Dropped`, `Failed`).
//! - [`RouterError`]: why a navigation failed (no route, mount missing,
//!   decoding failure, component failure, redirect loop, ...).
//! - [`DecodeError`]: malformed percent-encoding in a path or query string.
//! - [`ComponentError`]: the failure type of component producers and lazy
//!   loaders.
//!
//! Guard rejections are **not** errors. A guard that denies or redirects
//! produces [`NavigationResult::Aborted`] or a new navigation.
//!
//! # Examples
//!
//! ```
//! use web_navigator::error::{NavigationResult, RouterError};
//!
//! let error = RouterError::NotFound { path: "/nope".into() };
//! assert_eq!(error.to_string(), "No route found for /nope");
//!
//! let result = NavigationResult::Failed(error);
//! assert!(result.is_failed());
//! assert!(result.error().is_some_and(RouterError::is_not_found));
//! ```

use crate::route::ResolvedLocation;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Navigation Result Types
// ============================================================================

/// Outcome of a navigation attempt through the guard/middleware pipeline.
#[derive(Debug, Clone)]
pub enum NavigationResult {
    /// The route rendered and became the current route.
    Committed(ResolvedLocation),
    /// A guard or middleware stopped the navigation. Nothing was committed.
    Aborted,
    /// Another navigation was in flight; this request was ignored.
    Dropped,
    /// The navigation failed. The error was also emitted as an `error` event.
    Failed(RouterError),
}

impl NavigationResult {
    /// Check if the navigation committed a new route.
    pub fn is_committed(&self) -> bool {
        matches!(self, NavigationResult::Committed(_))
    }

    /// Check if a guard or middleware aborted the navigation.
    pub fn is_aborted(&self) -> bool {
        matches!(self, NavigationResult::Aborted)
    }

    /// Check if the request was dropped because another one was in flight.
    pub fn is_dropped(&self) -> bool {
        matches!(self, NavigationResult::Dropped)
    }

    /// Check if the navigation failed with an error.
    pub fn is_failed(&self) -> bool {
        matches!(self, NavigationResult::Failed(_))
    }

    /// The committed location, if any.
    pub fn location(&self) -> Option<&ResolvedLocation> {
        match self {
            NavigationResult::Committed(location) => Some(location),
            _ => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&RouterError> {
        match self {
            NavigationResult::Failed(error) => Some(error),
            _ => None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Detailed error variants that can occur during routing and navigation.
#[derive(Debug, Clone, Error)]
pub enum RouterError {
    /// No route matched and no `*` fallback route is registered.
    #[error("No route found for {path}")]
    NotFound { path: String },

    /// The mount point selector matched nothing.
    #[error("Router container element not found: {selector}")]
    MountNotFound { selector: String },

    /// A route pattern could not be compiled.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A path parameter or query component had malformed percent-encoding.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A lazily loaded component failed to resolve.
    #[error("Failed to load component '{component}': {source}")]
    ComponentResolution {
        component: String,
        #[source]
        source: ComponentError,
    },

    /// A component or deferred view failed while rendering.
    #[error("Render failed: {0}")]
    Render(#[from] ComponentError),

    /// Too many consecutive redirects inside one navigation.
    #[error("Redirect loop detected (depth {depth}): target '{path}'")]
    RedirectLoop { path: String, depth: usize },

    /// No route is registered under this name.
    #[error("Unknown route name: {name}")]
    UnknownRouteName { name: String },

    /// Reverse routing needs a parameter the caller did not supply.
    #[error("Missing parameter '{param}' for route '{route}'")]
    MissingParameter { route: String, param: String },

    /// The history backend rejected an update.
    #[error("History update failed: {message}")]
    History { message: String },

    /// Error raised by application middleware.
    #[error("{message}")]
    Custom { message: String },
}

impl RouterError {
    /// Create a [`RouterError::Custom`] from a message.
    pub fn custom(message: impl Into<String>) -> Self {
        RouterError::Custom {
            message: message.into(),
        }
    }

    /// Check if this is a [`RouterError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouterError::NotFound { .. })
    }
}

/// A route pattern that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The same `:name` appears twice in one pattern.
    #[error("Duplicate parameter '{name}' in pattern '{pattern}'")]
    DuplicateParam { pattern: String, name: String },

    /// The generated matcher was rejected by the regex engine.
    #[error("Invalid pattern '{pattern}': {message}")]
    Invalid { pattern: String, message: String },
}

/// Malformed percent-encoding, mirroring `decodeURIComponent` failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A `%` not followed by two hex digits.
    #[error("Malformed percent escape at byte {position} in '{input}'")]
    MalformedEscape { input: String, position: usize },

    /// The decoded bytes are not valid UTF-8.
    #[error("Decoded component '{input}' is not valid UTF-8")]
    InvalidUtf8 { input: String },
}

/// Failure reported by a component, a deferred view, or a lazy loader.
///
/// # Example
///
/// ```
/// use web_navigator::ComponentError;
///
/// let error = ComponentError::new("chunk failed to load");
/// assert_eq!(error.to_string(), "chunk failed to load");
///
/// let io = std::io::Error::new(std::io::ErrorKind::Other, "offline");
/// let wrapped = ComponentError::from_error(io);
/// assert!(std::error::Error::source(&wrapped).is_some());
/// ```
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ComponentError {
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl ComponentError {
    /// Create an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap another error, keeping it as the source.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_navigation_result_predicates() {
        let committed = NavigationResult::Committed(ResolvedLocation::empty());
        assert!(committed.is_committed());
        assert!(committed.location().is_some());
        assert!(!committed.is_failed());

        assert!(NavigationResult::Aborted.is_aborted());
        assert!(NavigationResult::Dropped.is_dropped());
        assert!(NavigationResult::Dropped.location().is_none());
    }

    #[test]
    fn test_navigation_result_error() {
        let result = NavigationResult::Failed(RouterError::custom("boom"));
        assert!(result.is_failed());
        assert_eq!(result.error().map(ToString::to_string).as_deref(), Some("boom"));
    }

    #[test]
    fn test_router_error_display() {
        assert_eq!(
            RouterError::MountNotFound {
                selector: "#app".into()
            }
            .to_string(),
            "Router container element not found: #app"
        );
        assert_eq!(
            RouterError::RedirectLoop {
                path: "/a".into(),
                depth: 6
            }
            .to_string(),
            "Redirect loop detected (depth 6): target '/a'"
        );
    }

    #[test]
    fn test_component_resolution_keeps_context() {
        let error = RouterError::ComponentResolution {
            component: "ProductDetail".into(),
            source: ComponentError::new("network down"),
        };
        assert_eq!(
            error.to_string(),
            "Failed to load component 'ProductDetail': network down"
        );
        assert_eq!(error.source().map(ToString::to_string).as_deref(), Some("network down"));
    }

    #[test]
    fn test_decode_error_converts() {
        let decode = DecodeError::MalformedEscape {
            input: "%zz".into(),
            position: 0,
        };
        let error: RouterError = decode.clone().into();
        assert!(matches!(error, RouterError::Decode(inner) if inner == decode));
    }

    #[test]
    fn test_component_error_into_render() {
        let error: RouterError = ComponentError::new("bad markup").into();
        assert_eq!(error.to_string(), "Render failed: bad markup");
    }
}
