//! Logging abstraction layer.
//!
//! The router never installs a logger of its own. Every message goes through
//! one of the macros below, which forward to [`log`](https://docs.rs/log) or
//! [`tracing`](https://docs.rs/tracing) depending on the enabled feature.
//! Enable at most one of the two.
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! All messages use the `web_navigator` target so applications can filter
//! router output, e.g. `RUST_LOG=web_navigator=debug`.
//!
//! ```ignore
//! use web_navigator::{debug_log, warn_log};
//!
//! debug_log!("Matched '{}' against '{}'", path, pattern);
//! warn_log!("Navigation in progress, ignoring '{}'", path);
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __navigator_log {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::$level!(target: "web_navigator", $($arg)*);
        #[cfg(feature = "log")]
        ::log::$level!(target: "web_navigator", $($arg)*);
    }};
}

/// Emit a **trace**-level message (per-segment matching, hook internals).
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        $crate::__navigator_log!(trace, $($arg)*)
    };
}

/// Emit a **debug**-level message (navigation steps).
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::__navigator_log!(debug, $($arg)*)
    };
}

/// Emit an **info**-level message (route registration, commits).
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        $crate::__navigator_log!(info, $($arg)*)
    };
}

/// Emit a **warn**-level message (dropped navigations, missing mount links).
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::__navigator_log!(warn, $($arg)*)
    };
}

/// Emit an **error**-level message (failed navigations).
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        $crate::__navigator_log!(error, $($arg)*)
    };
}
