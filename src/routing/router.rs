//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes sorted by `order`
//! - Select the matching route for a request path
//! - Return an explicit no-match rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks); the gateway
//!   swaps whole Router snapshots on reconfiguration
//! - O(n) scan in `order`; overlapping routes with equal `order` are a
//!   load-time configuration error, so selection is deterministic

use crate::routing::route::Route;

/// Immutable route table.
#[derive(Debug)]
pub struct Router {
    /// Routes sorted ascending by `order` (stable).
    routes: Vec<Route>,
}

impl Router {
    /// Build a route table. Sorting is stable, so equal orders keep their
    /// configuration order (validation rejects equal orders that overlap).
    pub fn new(mut routes: Vec<Route>) -> Self {
        routes.sort_by_key(|r| r.order);
        Self { routes }
    }

    /// Select the route for `path`: the matching route with the smallest
    /// `order`, or `None`.
    pub fn select(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matches(path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
