//! History abstraction and scroll bookkeeping.
//!
//! [`HistoryBackend`] is the seam between the router and the session history
//! it drives: the browser's History API (`web` feature) or the in-memory
//! [`MemoryHistory`] used by tests and non-browser hosts. [`HistoryAdapter`]
//! wraps a backend, records the scroll offset of the page being left, and
//! notifies change listeners.
//!
//! # Example
//!
//! ```
//! use web_navigator::history::{HistoryAdapter, MemoryHistory};
//!
//! let memory = MemoryHistory::new();
//! let history = HistoryAdapter::new(memory.clone());
//!
//! memory.set_scroll(320.0);
//! history.push("/products", Default::default()).unwrap();
//! assert_eq!(history.saved_scroll("/"), Some(320.0));
//! assert_eq!(memory.paths(), ["/", "/products"]);
//! ```

use crate::error::RouterError;
use crate::route::StateMap;
use crate::trace_log;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// ============================================================================
// Location
// ============================================================================

/// A history entry as the backend reports it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    /// Pathname, always starting with `/` for browser locations.
    pub path: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
    pub state: StateMap,
}

impl Location {
    /// Split `path?query#hash` into its parts.
    ///
    /// ```
    /// use web_navigator::history::Location;
    ///
    /// let location = Location::parse("/search?q=rust#top", Default::default());
    /// assert_eq!(location.path, "/search");
    /// assert_eq!(location.search, "?q=rust");
    /// assert_eq!(location.hash, "#top");
    /// assert_eq!(location.full_path(), "/search?q=rust#top");
    /// ```
    pub fn parse(url: &str, state: StateMap) -> Self {
        let (rest, hash) = match url.find('#') {
            Some(index) => url.split_at(index),
            None => (url, ""),
        };
        let (path, search) = match rest.find('?') {
            Some(index) => rest.split_at(index),
            None => (rest, ""),
        };
        Self {
            path: path.to_string(),
            search: search.to_string(),
            hash: hash.to_string(),
            state,
        }
    }

    /// `path + search + hash`.
    pub fn full_path(&self) -> String {
        format!("{}{}{}", self.path, self.search, self.hash)
    }
}

/// How the history changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Push,
    Replace,
    /// Back/forward traversal, including browser popstate.
    Pop,
}

/// Delivered to [`HistoryAdapter::on_change`] listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryChange {
    pub path: String,
    pub state: StateMap,
    pub kind: ChangeKind,
}

// ============================================================================
// Backend
// ============================================================================

/// Session history storage.
pub trait HistoryBackend {
    /// Add an entry after the current one, discarding forward entries.
    fn push_state(&self, url: &str, state: &StateMap) -> Result<(), RouterError>;

    /// Overwrite the current entry.
    fn replace_state(&self, url: &str, state: &StateMap) -> Result<(), RouterError>;

    /// Move `delta` entries through the history.
    ///
    /// Returns the new location when the move completed synchronously. The
    /// browser backend returns `None` and reports the move later through a
    /// pop event.
    fn go(&self, delta: isize) -> Option<Location>;

    /// The current entry.
    fn location(&self) -> Location;

    /// Current vertical scroll offset of the page.
    fn scroll_offset(&self) -> f64;

    fn scroll_to(&self, offset: f64);
}

type ChangeListener = Rc<dyn Fn(&HistoryChange)>;

/// Drives a [`HistoryBackend`] and keeps a scroll offset per path.
pub struct HistoryAdapter {
    backend: Box<dyn HistoryBackend>,
    scroll_positions: RefCell<HashMap<String, f64>>,
    listeners: RefCell<Vec<ChangeListener>>,
}

impl HistoryAdapter {
    pub fn new(backend: impl HistoryBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            scroll_positions: RefCell::new(HashMap::new()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe to push, replace and pop changes.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(&HistoryChange) + 'static,
    {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Record the scroll of the page being left, then push `url`.
    pub fn push(&self, url: &str, state: StateMap) -> Result<(), RouterError> {
        self.save_scroll();
        self.backend.push_state(url, &state)?;
        self.notify(HistoryChange {
            path: url.to_string(),
            state,
            kind: ChangeKind::Push,
        });
        Ok(())
    }

    /// Replace the current entry. The scroll record is left alone.
    pub fn replace(&self, url: &str, state: StateMap) -> Result<(), RouterError> {
        self.backend.replace_state(url, &state)?;
        self.notify(HistoryChange {
            path: url.to_string(),
            state,
            kind: ChangeKind::Replace,
        });
        Ok(())
    }

    /// Traverse the history. See [`HistoryBackend::go`].
    pub fn go(&self, delta: isize) -> Option<Location> {
        self.save_scroll();
        let location = self.backend.go(delta)?;
        self.notify_pop(&location);
        Some(location)
    }

    pub fn back(&self) -> Option<Location> {
        self.go(-1)
    }

    pub fn forward(&self) -> Option<Location> {
        self.go(1)
    }

    /// Report a traversal the backend performed on its own (browser popstate).
    pub fn notify_pop(&self, location: &Location) {
        self.notify(HistoryChange {
            path: location.full_path(),
            state: location.state.clone(),
            kind: ChangeKind::Pop,
        });
    }

    pub fn current_location(&self) -> Location {
        self.backend.location()
    }

    /// Scroll to the offset recorded for `path`, or to the top.
    pub fn restore_scroll(&self, path: &str) {
        let offset = self.saved_scroll(path).unwrap_or(0.0);
        trace_log!("Restoring scroll for '{}' to {}", path, offset);
        self.backend.scroll_to(offset);
    }

    pub fn saved_scroll(&self, path: &str) -> Option<f64> {
        self.scroll_positions.borrow().get(path).copied()
    }

    fn save_scroll(&self) {
        let path = self.backend.location().path;
        let offset = self.backend.scroll_offset();
        self.scroll_positions.borrow_mut().insert(path, offset);
    }

    fn notify(&self, change: HistoryChange) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&change);
        }
    }
}

impl std::fmt::Debug for HistoryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryAdapter")
            .field("location", &self.backend.location())
            .field("scroll_positions", &self.scroll_positions.borrow())
            .finish()
    }
}

// ============================================================================
// MemoryHistory
// ============================================================================

#[derive(Debug)]
struct MemoryStack {
    entries: Vec<Location>,
    index: usize,
    scroll: f64,
}

/// In-memory history stack.
///
/// Clones share the same stack, so a test can keep a handle after giving
/// one to the router.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    inner: Rc<RefCell<MemoryStack>>,
}

impl MemoryHistory {
    /// A history with a single `/` entry.
    pub fn new() -> Self {
        Self::with_initial("/")
    }

    pub fn with_initial(url: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryStack {
                entries: vec![Location::parse(url, StateMap::new())],
                index: 0,
                scroll: 0.0,
            })),
        }
    }

    /// Full paths of every entry, oldest first.
    pub fn paths(&self) -> Vec<String> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(Location::full_path)
            .collect()
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.inner.borrow().index
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Simulate the user scrolling the page.
    pub fn set_scroll(&self, offset: f64) {
        self.inner.borrow_mut().scroll = offset;
    }

    pub fn scroll(&self) -> f64 {
        self.inner.borrow().scroll
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBackend for MemoryHistory {
    fn push_state(&self, url: &str, state: &StateMap) -> Result<(), RouterError> {
        let mut stack = self.inner.borrow_mut();
        let next = stack.index + 1;
        stack.entries.truncate(next);
        stack.entries.push(Location::parse(url, state.clone()));
        stack.index = next;
        Ok(())
    }

    fn replace_state(&self, url: &str, state: &StateMap) -> Result<(), RouterError> {
        let mut stack = self.inner.borrow_mut();
        let index = stack.index;
        stack.entries[index] = Location::parse(url, state.clone());
        Ok(())
    }

    fn go(&self, delta: isize) -> Option<Location> {
        let mut stack = self.inner.borrow_mut();
        let target = stack.index.checked_add_signed(delta)?;
        let location = stack.entries.get(target)?.clone();
        stack.index = target;
        Some(location)
    }

    fn location(&self) -> Location {
        let stack = self.inner.borrow();
        stack.entries[stack.index].clone()
    }

    fn scroll_offset(&self) -> f64 {
        self.inner.borrow().scroll
    }

    fn scroll_to(&self, offset: f64) {
        self.inner.borrow_mut().scroll = offset;
    }
}

// ============================================================================
// Tests
// ============================================================================
