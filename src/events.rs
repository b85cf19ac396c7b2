//! Router event listeners.
//!
//! | Event | When | Payload |
//! |-------|------|---------|
//! | [`BeforeNavigate`](RouterEvent::BeforeNavigate) | guards passed, before middleware and render | `(to, from)` |
//! | [`Navigate`](RouterEvent::Navigate) | after commit and `after_each` hooks | `(to, from)` |
//! | [`AfterNavigate`](RouterEvent::AfterNavigate) | right after `Navigate` | `(to, from)` |
//! | [`Error`](RouterError) | a navigation failed | `&RouterError` |
//!
//! Listeners run synchronously in registration order. A listener may
//! register or remove listeners; the change applies from the next emit.

use crate::error::RouterError;
use crate::route::ResolvedLocation;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Transition events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterEvent {
    BeforeNavigate,
    Navigate,
    AfterNavigate,
}

/// Handle returned by registration, used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type TransitionListener = Rc<dyn Fn(&ResolvedLocation, &ResolvedLocation)>;
type ErrorListener = Rc<dyn Fn(&RouterError)>;

/// Listener registry.
#[derive(Default)]
pub struct EventBus {
    next_id: Cell<u64>,
    transitions: RefCell<Vec<(ListenerId, RouterEvent, TransitionListener)>>,
    errors: RefCell<Vec<(ListenerId, ErrorListener)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, event: RouterEvent, listener: F) -> ListenerId
    where
        F: Fn(&ResolvedLocation, &ResolvedLocation) + 'static,
    {
        let id = self.allocate();
        self.transitions
            .borrow_mut()
            .push((id, event, Rc::new(listener)));
        id
    }

    pub fn on_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&RouterError) + 'static,
    {
        let id = self.allocate();
        self.errors.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut transitions = self.transitions.borrow_mut();
        let before = transitions.len();
        transitions.retain(|(existing, _, _)| *existing != id);
        if transitions.len() != before {
            return true;
        }
        drop(transitions);

        let mut errors = self.errors.borrow_mut();
        let before = errors.len();
        errors.retain(|(existing, _)| *existing != id);
        errors.len() != before
    }

    pub fn emit(&self, event: RouterEvent, to: &ResolvedLocation, from: &ResolvedLocation) {
        let listeners: Vec<TransitionListener> = self
            .transitions
            .borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == event)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(to, from);
        }
    }

    pub fn emit_error(&self, error: &RouterError) {
        let listeners: Vec<ErrorListener> = self
            .errors
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(error);
        }
    }

    pub fn listener_count(&self, event: RouterEvent) -> usize {
        self.transitions
            .borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == event)
            .count()
    }

    pub fn error_listener_count(&self) -> usize {
        self.errors.borrow().len()
    }

    fn allocate(&self) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ListenerId(id)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("transitions", &self.transitions.borrow().len())
            .field("errors", &self.errors.borrow().len())
            .finish()
    }
}
