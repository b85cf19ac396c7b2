//! Router configuration.
//!
//! | Option | Default | Meaning |
//! |--------|---------|---------|
//! | `mount_selector` | `#app` | CSS selector of the container routes render into |
//! | `link_active_class` | `router-link-active` | class for links whose href prefixes the current path |
//! | `link_exact_active_class` | `router-link-exact-active` | extra class for links equal to the current path |
//! | `max_redirects` | `5` | consecutive redirects allowed inside one navigation |
//! | `component_cache_capacity` | `64` | lazily loaded components kept resolved |
//!
//! Options deserialize from JSON with camelCase keys; missing keys take
//! their defaults.
//!
//! ```
//! use web_navigator::RouterOptions;
//!
//! let options = RouterOptions::from_json(r##"{ "mountSelector": "#root", "maxRedirects": 2 }"##).unwrap();
//! assert_eq!(options.mount_selector, "#root");
//! assert_eq!(options.max_redirects, 2);
//! assert_eq!(options.link_active_class, "router-link-active");
//! ```

use crate::links::LinkClasses;
use serde::{Deserialize, Serialize};

/// Default redirect limit per navigation.
pub const MAX_REDIRECT_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterOptions {
    pub mount_selector: String,
    pub link_active_class: String,
    pub link_exact_active_class: String,
    pub max_redirects: usize,
    pub component_cache_capacity: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            mount_selector: "#app".to_string(),
            link_active_class: "router-link-active".to_string(),
            link_exact_active_class: "router-link-exact-active".to_string(),
            max_redirects: MAX_REDIRECT_DEPTH,
            component_cache_capacity: 64,
        }
    }
}

impl RouterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn mount_selector(mut self, selector: impl Into<String>) -> Self {
        self.mount_selector = selector.into();
        self
    }

    pub fn link_active_class(mut self, class: impl Into<String>) -> Self {
        self.link_active_class = class.into();
        self
    }

    pub fn link_exact_active_class(mut self, class: impl Into<String>) -> Self {
        self.link_exact_active_class = class.into();
        self
    }

    pub fn max_redirects(mut self, limit: usize) -> Self {
        self.max_redirects = limit;
        self
    }

    pub fn component_cache_capacity(mut self, capacity: usize) -> Self {
        self.component_cache_capacity = capacity;
        self
    }

    pub fn link_classes(&self) -> LinkClasses {
        LinkClasses {
            active: self.link_active_class.clone(),
            exact_active: self.link_exact_active_class.clone(),
        }
    }
}
