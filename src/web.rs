//! Browser binding (`web` feature).
//!
//! [`BrowserHistory`] drives `window.history`, [`DomMount`] renders into the
//! document, and [`start`] wires `popstate` and delegated link clicks to a
//! [`Router`].
//!
//! ```ignore
//! use web_navigator::{Route, Router, RouterOptions, View};
//!
//! let router = Router::browser(RouterOptions::default())?;
//! router.add(Route::new("/", |_| View::markup("<h1>Home</h1>")))?;
//! web_navigator::web::start(&router)?;
//! ```

use crate::error::RouterError;
use crate::history::{HistoryBackend, Location};
use crate::links::{link_state, should_intercept, LinkClasses, LinkClick};
use crate::mount::{Content, MountTarget};
use crate::options::RouterOptions;
use crate::route::StateMap;
use crate::router::{NavigateOptions, Router};
use crate::view::{Element, Node};
use crate::{debug_log, warn_log};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, MouseEvent, PopStateEvent, Window};

fn js_error(context: &str, error: &JsValue) -> RouterError {
    RouterError::History {
        message: format!("{context}: {error:?}"),
    }
}

fn window() -> Result<Window, RouterError> {
    web_sys::window().ok_or_else(|| RouterError::History {
        message: "no global window".to_string(),
    })
}

fn state_to_js(state: &StateMap) -> Result<JsValue, RouterError> {
    if state.is_empty() {
        return Ok(JsValue::NULL);
    }
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    serde::Serialize::serialize(state, &serializer).map_err(|error| RouterError::History {
        message: format!("history state is not serializable: {error}"),
    })
}

fn state_from_js(value: JsValue) -> StateMap {
    if value.is_null() || value.is_undefined() {
        return StateMap::new();
    }
    serde_wasm_bindgen::from_value(value).unwrap_or_else(|error| {
        warn_log!("Ignoring foreign history state: {}", error);
        StateMap::new()
    })
}

// ============================================================================
// History
// ============================================================================

/// [`HistoryBackend`] over `window.history`.
#[derive(Debug, Clone)]
pub struct BrowserHistory {
    window: Window,
}

impl BrowserHistory {
    pub fn new() -> Result<Self, RouterError> {
        Ok(Self { window: window()? })
    }

    fn history(&self) -> Result<web_sys::History, RouterError> {
        self.window
            .history()
            .map_err(|error| js_error("window.history unavailable", &error))
    }
}

impl HistoryBackend for BrowserHistory {
    fn push_state(&self, url: &str, state: &StateMap) -> Result<(), RouterError> {
        self.history()?
            .push_state_with_url(&state_to_js(state)?, "", Some(url))
            .map_err(|error| js_error("pushState failed", &error))
    }

    fn replace_state(&self, url: &str, state: &StateMap) -> Result<(), RouterError> {
        self.history()?
            .replace_state_with_url(&state_to_js(state)?, "", Some(url))
            .map_err(|error| js_error("replaceState failed", &error))
    }

    fn go(&self, delta: isize) -> Option<Location> {
        match self.history() {
            Ok(history) => {
                if let Err(error) = history.go_with_delta(delta as i32) {
                    warn_log!("history.go({}) failed: {:?}", delta, error);
                }
            }
            Err(error) => warn_log!("{}", error),
        }
        // The browser reports the new entry through popstate.
        None
    }

    fn location(&self) -> Location {
        let location = self.window.location();
        let state = self
            .history()
            .ok()
            .and_then(|history| history.state().ok())
            .map(state_from_js)
            .unwrap_or_default();
        Location {
            path: location.pathname().unwrap_or_else(|_| "/".to_string()),
            search: location.search().unwrap_or_default(),
            hash: location.hash().unwrap_or_default(),
            state,
        }
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&self, offset: f64) {
        self.window.scroll_to_with_x_and_y(0.0, offset);
    }
}

// ============================================================================
// Mount
// ============================================================================

/// [`MountTarget`] over the live document.
#[derive(Debug, Clone)]
pub struct DomMount {
    document: Document,
}

impl DomMount {
    pub fn new() -> Result<Self, RouterError> {
        let document = window()?.document().ok_or_else(|| RouterError::History {
            message: "window has no document".to_string(),
        })?;
        Ok(Self { document })
    }

    fn build(&self, element: &Element) -> Result<web_sys::Element, JsValue> {
        let node = self.document.create_element(element.tag())?;
        for (name, value) in element.attributes() {
            node.set_attribute(name, value)?;
        }
        for child in element.children() {
            match child {
                Node::Text(text) => {
                    node.append_child(&self.document.create_text_node(text))?;
                }
                Node::Element(inner) => {
                    node.append_child(&self.build(inner)?)?;
                }
            }
        }
        Ok(node)
    }
}

impl MountTarget for DomMount {
    fn replace_content(&self, selector: &str, content: Content<'_>) -> Result<(), RouterError> {
        let container = self
            .document
            .query_selector(selector)
            .ok()
            .flatten()
            .ok_or_else(|| RouterError::MountNotFound {
                selector: selector.to_string(),
            })?;

        match content {
            Content::Markup(html) => container.set_inner_html(html),
            Content::Node(element) => {
                let node = self
                    .build(element)
                    .map_err(|error| js_error("building element failed", &error))?;
                container.set_inner_html("");
                container
                    .append_child(&node)
                    .map_err(|error| js_error("appendChild failed", &error))?;
            }
        }
        Ok(())
    }

    fn refresh_links(&self, current_path: &str, classes: &LinkClasses) {
        let Ok(links) = self.document.query_selector_all(r#"a[href^="/"]"#) else {
            return;
        };
        let [active, exact] = classes.all();
        for index in 0..links.length() {
            let Some(link) = links
                .item(index)
                .and_then(|node| node.dyn_into::<web_sys::Element>().ok())
            else {
                continue;
            };
            let Some(href) = link.get_attribute("href") else {
                continue;
            };
            let class_list = link.class_list();
            let result = class_list.remove_2(active, exact).and_then(|()| {
                match classes.for_state(link_state(&href, current_path)).as_slice() {
                    [] => Ok(()),
                    [one] => class_list.add_1(one),
                    [first, second, ..] => class_list.add_2(first, second),
                }
            });
            if let Err(error) = result {
                warn_log!("Updating classes on '{}' failed: {:?}", href, error);
            }
        }
    }
}

// ============================================================================
// Wiring
// ============================================================================

impl Router {
    /// A router over the browser history and document.
    pub fn browser(options: RouterOptions) -> Result<Self, RouterError> {
        Ok(Router::new(options, BrowserHistory::new()?, DomMount::new()?))
    }
}

fn link_click(event: &MouseEvent) -> Option<(LinkClick, String)> {
    let target = event.target()?.dyn_into::<web_sys::Element>().ok()?;
    let anchor = target.closest("a").ok()??;
    let href = anchor.get_attribute("href");
    let click = LinkClick {
        href: href.clone(),
        has_target: anchor.has_attribute("target"),
        has_download: anchor.has_attribute("download"),
        button: event.button(),
        ctrl_key: event.ctrl_key(),
        meta_key: event.meta_key(),
        shift_key: event.shift_key(),
        alt_key: event.alt_key(),
    };
    Some((click, href?))
}

/// Listen for `popstate` and internal link clicks, then resolve the
/// current URL.
///
/// The listeners live for the rest of the page.
pub fn start(router: &Router) -> Result<(), RouterError> {
    let window = window()?;
    let document = window.document().ok_or_else(|| RouterError::History {
        message: "window has no document".to_string(),
    })?;

    let on_pop = {
        let router = router.clone();
        Closure::<dyn FnMut(PopStateEvent)>::new(move |_event: PopStateEvent| {
            let router = router.clone();
            let location = router.history().current_location();
            debug_log!("popstate to '{}'", location.full_path());
            wasm_bindgen_futures::spawn_local(async move {
                router.handle_pop(location).await;
            });
        })
    };
    window
        .add_event_listener_with_callback("popstate", on_pop.as_ref().unchecked_ref())
        .map_err(|error| js_error("popstate listener failed", &error))?;
    on_pop.forget();

    let on_click = {
        let router = router.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            if event.default_prevented() {
                return;
            }
            let Some((click, href)) = link_click(&event) else {
                return;
            };
            if !should_intercept(&click) {
                return;
            }
            event.prevent_default();
            let router = router.clone();
            wasm_bindgen_futures::spawn_local(async move {
                router.navigate(&href, NavigateOptions::default()).await;
            });
        })
    };
    document
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(|error| js_error("click listener failed", &error))?;
    on_click.forget();

    let router = router.clone();
    wasm_bindgen_futures::spawn_local(async move {
        router.start().await;
    });
    Ok(())
}
