//! Lazy component caching.
//!
//! Lazily loaded components are resolved once and then served from an LRU
//! cache keyed by the component name given to
//! [`Component::lazy`](crate::Component::lazy). It is gated behind the
//! `cache` feature flag and uses the [`lru`] crate internally.
//!
//! Failed loads are never stored, so the next navigation retries the loader.
//! [`CacheStats`] tracks hits, misses, and invalidations.
//!
//! # Examples
//!
//! ```
//! use std::rc::Rc;
//! use web_navigator::cache::ComponentCache;
//! use web_navigator::{RouteContext, View};
//!
//! let mut cache = ComponentCache::with_capacity(4);
//! assert!(cache.get("ProductDetail").is_none());
//!
//! cache.insert("ProductDetail", Rc::new(|_: &RouteContext| View::Empty));
//! assert!(cache.get("ProductDetail").is_some());
//! assert_eq!(cache.stats().hits, 1);
//! assert_eq!(cache.stats().misses, 1);
//! ```

use crate::route::RenderFn;
use crate::{debug_log, trace_log};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// Counters tracking cache hit/miss rates and invalidations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Entries removed by [`ComponentCache::invalidate`] or
    /// [`ComponentCache::clear`].
    pub invalidations: usize,
}

impl CacheStats {
    /// Return the hit rate as a value in `0.0..=1.0`.
    ///
    /// Returns `0.0` if no lookups have been performed.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of resolved lazy components.
pub struct ComponentCache {
    entries: LruCache<String, Rc<RenderFn>>,
    stats: CacheStats,
}

impl ComponentCache {
    const DEFAULT_CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Look up a resolved component. Updates hit/miss stats.
    pub fn get(&mut self, name: &str) -> Option<Rc<RenderFn>> {
        if let Some(render) = self.entries.get(name) {
            self.stats.hits += 1;
            trace_log!("Component cache hit for '{}'", name);
            Some(Rc::clone(render))
        } else {
            self.stats.misses += 1;
            trace_log!("Component cache miss for '{}'", name);
            None
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, render: Rc<RenderFn>) {
        let name = name.into();
        trace_log!("Caching component '{}'", name);
        self.entries.push(name, render);
    }

    /// Drop one component so its loader runs again.
    pub fn invalidate(&mut self, name: &str) -> bool {
        let removed = self.entries.pop(name).is_some();
        if removed {
            self.stats.invalidations += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        let len = self.entries.len();
        self.entries.clear();
        self.stats.invalidations += len;
        debug_log!(
            "Component cache cleared: {} entries removed (hit rate: {:.1}%)",
            len,
            self.stats.hit_rate() * 100.0
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ComponentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ComponentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCache")
            .field("len", &self.entries.len())
            .field("cap", &self.entries.cap())
            .field("stats", &self.stats)
            .finish()
    }
}
