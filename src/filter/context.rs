//! Per-request scratch space shared between a filter's pre and post phase.
//!
//! # Design Decisions
//! - Owned exclusively by one request's chain execution; no locking
//! - String keys, type-erased values with typed accessors
//! - A filter must only read keys it wrote itself; keys are namespaced by
//!   convention (`<filter>.<key>`)

use std::any::Any;
use std::collections::HashMap;

/// Mutable per-request key/value store, created at request entry and dropped
/// when the exchange completes.
#[derive(Default)]
pub struct RequestContext {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, replacing any previous value.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: &str, value: T) {
        self.values.insert(key.to_string(), Box::new(value));
    }

    /// Typed read access. Returns `None` if the key is absent or holds a
    /// different type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Remove and return a value, transferring ownership to the caller.
    pub fn remove<T: Any + Send + Sync>(&mut self, key: &str) -> Option<T> {
        self.values
            .remove(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}
