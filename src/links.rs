//! Link click interception and active-link classification.
//!
//! The browser binding turns every click on an anchor into a [`LinkClick`]
//! and asks [`should_intercept`] whether the router takes over. After each
//! committed navigation every internal anchor is classified with
//! [`link_state`] and given the matching classes from [`LinkClasses`].

/// The parts of a click on an anchor that decide interception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClick {
    /// The anchor's `href` attribute as written.
    pub href: Option<String>,
    /// The anchor has a `target` attribute.
    pub has_target: bool,
    /// The anchor has a `download` attribute.
    pub has_download: bool,
    /// Mouse button, `0` for the primary button.
    pub button: i16,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
}

impl LinkClick {
    /// A plain primary-button click on `href`.
    pub fn primary(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }
}

/// `true` when the router should handle the click instead of the browser.
///
/// The href must be same-origin absolute (`/...` but not `//host`), the
/// anchor must not open elsewhere or download, and the click must be a
/// primary-button click without modifier keys.
///
/// ```
/// use web_navigator::links::{should_intercept, LinkClick};
///
/// assert!(should_intercept(&LinkClick::primary("/products")));
/// assert!(!should_intercept(&LinkClick::primary("https://example.com/")));
/// assert!(!should_intercept(&LinkClick {
///     ctrl_key: true,
///     ..LinkClick::primary("/products")
/// }));
/// ```
pub fn should_intercept(click: &LinkClick) -> bool {
    let Some(href) = click.href.as_deref() else {
        return false;
    };

    href.starts_with('/')
        && !href.starts_with("//")
        && !click.has_target
        && !click.has_download
        && click.button == 0
        && !(click.ctrl_key || click.meta_key || click.shift_key || click.alt_key)
}

/// How a link relates to the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Inactive,
    /// The current path starts with the link's href.
    Active,
    /// The link's href equals the current path.
    ExactActive,
}

/// Classify `href` against `current_path`.
///
/// `/` is only ever exact-active, otherwise every link would be active.
pub fn link_state(href: &str, current_path: &str) -> LinkState {
    if href == current_path {
        LinkState::ExactActive
    } else if href != "/" && !current_path.is_empty() && current_path.starts_with(href) {
        LinkState::Active
    } else {
        LinkState::Inactive
    }
}

/// Class names applied to active links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClasses {
    pub active: String,
    pub exact_active: String,
}

impl LinkClasses {
    /// Classes a link in `state` should carry.
    pub fn for_state(&self, state: LinkState) -> Vec<&str> {
        match state {
            LinkState::Inactive => Vec::new(),
            LinkState::Active => vec![self.active.as_str()],
            LinkState::ExactActive => vec![self.active.as_str(), self.exact_active.as_str()],
        }
    }

    /// Every class this router manages.
    pub fn all(&self) -> [&str; 2] {
        [self.active.as_str(), self.exact_active.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intercept_rejections() {
        let base = LinkClick::primary("/a");
        assert!(should_intercept(&base));

        let cases = [
            LinkClick { href: None, ..base.clone() },
            LinkClick::primary("//cdn.example.com/x"),
            LinkClick::primary("relative/path"),
            LinkClick::primary("#top"),
            LinkClick { has_target: true, ..base.clone() },
            LinkClick { has_download: true, ..base.clone() },
            LinkClick { button: 1, ..base.clone() },
            LinkClick { meta_key: true, ..base.clone() },
            LinkClick { shift_key: true, ..base.clone() },
            LinkClick { alt_key: true, ..base.clone() },
        ];
        for click in cases {
            assert!(!should_intercept(&click), "{click:?}");
        }
    }

    #[test]
    fn test_link_state() {
        assert_eq!(link_state("/products", "/products"), LinkState::ExactActive);
        assert_eq!(link_state("/products", "/products/42"), LinkState::Active);
        assert_eq!(link_state("/", "/products"), LinkState::Inactive);
        assert_eq!(link_state("/", "/"), LinkState::ExactActive);
        assert_eq!(link_state("/about", "/products"), LinkState::Inactive);
        assert_eq!(link_state("/about", ""), LinkState::Inactive);
    }

    #[test]
    fn test_classes_for_state() {
        let classes = LinkClasses {
            active: "on".into(),
            exact_active: "exact".into(),
        };
        assert!(classes.for_state(LinkState::Inactive).is_empty());
        assert_eq!(classes.for_state(LinkState::Active), ["on"]);
        assert_eq!(classes.for_state(LinkState::ExactActive), ["on", "exact"]);
    }
}
