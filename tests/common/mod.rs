//! Test utilities for router integration tests
//!
//! Provides a router wired to in-memory history and mount targets, plus
//! small recording helpers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use web_navigator::*;

/// A router together with handles on its history and mount point.
pub struct Fixture {
    pub router: Router,
    pub history: MemoryHistory,
    pub mount: MemoryMount,
}

/// Router over `MemoryHistory` at `/` rendering into `#app`.
pub fn fixture() -> Fixture {
    fixture_with(RouterOptions::default())
}

pub fn fixture_with(options: RouterOptions) -> Fixture {
    init_logging();
    let history = MemoryHistory::new();
    let mount = MemoryMount::new("#app")
        .with_link("/")
        .with_link("/products")
        .with_link("/products/7")
        .with_link("/about");
    let router = Router::new(options, history.clone(), mount.clone());
    Fixture {
        router,
        history,
        mount,
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A component rendering `<h1>{title}</h1>`.
pub fn page(title: &'static str) -> impl Fn(&RouteContext) -> View + 'static {
    move |_| View::markup(format!("<h1>{}</h1>", title))
}

/// Shared, ordered record of what happened.
pub type Log = Rc<RefCell<Vec<String>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Assert that a navigation committed and return the location.
pub fn committed(result: NavigationResult) -> ResolvedLocation {
    match result {
        NavigationResult::Committed(location) => location,
        other => panic!("expected a committed navigation, got {:?}", other),
    }
}

/// Assert that a navigation failed and return the error.
pub fn failed(result: NavigationResult) -> RouterError {
    match result {
        NavigationResult::Failed(error) => error,
        other => panic!("expected a failed navigation, got {:?}", other),
    }
}
