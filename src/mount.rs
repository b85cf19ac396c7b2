//! Mount point abstraction.
//!
//! The router renders into exactly one container, addressed by the CSS
//! selector in [`RouterOptions::mount_selector`](crate::RouterOptions). A
//! [`MountTarget`] replaces that container's content and refreshes link
//! classes. The browser implementation lives in the `web` module;
//! [`MemoryMount`] records everything for tests and server-side hosts.

use crate::error::RouterError;
use crate::links::{link_state, LinkClasses};
use crate::view::Element;
use std::cell::RefCell;
use std::rc::Rc;

/// Settled component output handed to the mount target.
#[derive(Debug, Clone, Copy)]
pub enum Content<'a> {
    Markup(&'a str),
    Node(&'a Element),
}

/// Where rendered routes go.
pub trait MountTarget {
    /// Replace the content of the container matching `selector`.
    ///
    /// Fails with [`RouterError::MountNotFound`] when nothing matches.
    fn replace_content(&self, selector: &str, content: Content<'_>) -> Result<(), RouterError>;

    /// Re-apply active classes to every internal link for `current_path`.
    fn refresh_links(&self, current_path: &str, classes: &LinkClasses);
}

#[derive(Debug, Default)]
struct MemoryDocument {
    selector: String,
    html: String,
    renders: usize,
    links: Vec<(String, Vec<String>)>,
}

/// A mount target backed by an in-memory document with one container and a
/// list of internal links.
///
/// ```
/// use web_navigator::mount::{Content, MemoryMount, MountTarget};
///
/// let mount = MemoryMount::new("#app");
/// mount.replace_content("#app", Content::Markup("<h1>Home</h1>")).unwrap();
/// assert_eq!(mount.html(), "<h1>Home</h1>");
///
/// assert!(mount.replace_content("#main", Content::Markup("")).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryMount {
    document: Rc<RefCell<MemoryDocument>>,
}

impl MemoryMount {
    /// A document whose only container matches `selector`.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            document: Rc::new(RefCell::new(MemoryDocument {
                selector: selector.into(),
                ..MemoryDocument::default()
            })),
        }
    }

    /// Add an internal link to the document.
    pub fn with_link(self, href: impl Into<String>) -> Self {
        self.document.borrow_mut().links.push((href.into(), Vec::new()));
        self
    }

    /// Current container content.
    pub fn html(&self) -> String {
        self.document.borrow().html.clone()
    }

    /// Number of times the container content was replaced.
    pub fn render_count(&self) -> usize {
        self.document.borrow().renders
    }

    /// Classes on the first link with this href.
    pub fn link_classes(&self, href: &str) -> Vec<String> {
        self.document
            .borrow()
            .links
            .iter()
            .find(|(h, _)| h == href)
            .map(|(_, classes)| classes.clone())
            .unwrap_or_default()
    }
}

impl MountTarget for MemoryMount {
    fn replace_content(&self, selector: &str, content: Content<'_>) -> Result<(), RouterError> {
        let mut document = self.document.borrow_mut();
        if document.selector != selector {
            return Err(RouterError::MountNotFound {
                selector: selector.to_string(),
            });
        }
        document.html = match content {
            Content::Markup(html) => html.to_string(),
            Content::Node(element) => element.to_html(),
        };
        document.renders += 1;
        Ok(())
    }

    fn refresh_links(&self, current_path: &str, classes: &LinkClasses) {
        let mut document = self.document.borrow_mut();
        for (href, link_classes) in &mut document.links {
            link_classes.retain(|class| !classes.all().contains(&class.as_str()));
            let state = link_state(href, current_path);
            link_classes.extend(classes.for_state(state).into_iter().map(String::from));
        }
    }
}
