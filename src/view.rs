//! Component output.
//!
//! A component returns a [`View`]: an HTML string, an [`Element`] tree, a
//! deferred view that resolves later, or nothing. The mount target receives
//! the settled markup or element and replaces the container's content.
//! [`View::Empty`] leaves the container untouched.

use crate::error::ComponentError;
use futures::future::LocalBoxFuture;
use std::fmt;
use std::future::Future;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// What a component produced.
pub enum View {
    /// Raw HTML assigned as the container's inner HTML.
    Markup(String),
    /// An element tree appended as the container's only child.
    Node(Element),
    /// A view that is awaited before mounting.
    Deferred(LocalBoxFuture<'static, Result<View, ComponentError>>),
    /// Render nothing.
    Empty,
}

impl View {
    pub fn markup(html: impl Into<String>) -> Self {
        View::Markup(html.into())
    }

    /// Wrap a future producing the real view.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<View, ComponentError>> + 'static,
    {
        View::Deferred(Box::pin(future))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, View::Empty)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Markup(html) => f.debug_tuple("Markup").field(html).finish(),
            View::Node(element) => f.debug_tuple("Node").field(element).finish(),
            View::Deferred(_) => f.write_str("Deferred(..)"),
            View::Empty => f.write_str("Empty"),
        }
    }
}

impl From<String> for View {
    fn from(html: String) -> Self {
        View::Markup(html)
    }
}

impl From<&str> for View {
    fn from(html: &str) -> Self {
        View::Markup(html.to_string())
    }
}

impl From<Element> for View {
    fn from(element: Element) -> Self {
        View::Node(element)
    }
}

// ============================================================================
// Element
// ============================================================================

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// A detached element tree.
///
/// ```
/// use web_navigator::Element;
///
/// let card = Element::new("div")
///     .attr("class", "card")
///     .child(Element::new("h2").text("Tom & Jerry"))
///     .child(Element::new("img").attr("src", "/a.png"));
///
/// assert_eq!(
///     card.to_html(),
///     r#"<div class="card"><h2>Tom &amp; Jerry</h2><img src="/a.png"></div>"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing an earlier value.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Serialize to HTML with text and attribute values escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }

        for child in &self.children {
            match child {
                Node::Text(text) => escape_into(text, false, out),
                Node::Element(element) => element.write_html(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
