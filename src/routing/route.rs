//! Route definition.

use std::sync::Arc;

use axum::http::Uri;

use crate::filter::Filter;
use crate::routing::matcher::PathPattern;

/// A compiled route: path predicate, upstream target, and route-scoped
/// filters. Immutable at request time; replaced wholesale on reload.
pub struct Route {
    /// Unique route identifier, used in logs and validation errors.
    pub id: String,
    /// Path predicate for this route.
    pub pattern: PathPattern,
    /// Upstream target the terminal proxy action forwards to.
    pub upstream: Uri,
    /// Tie-break among overlapping routes; smaller wins.
    pub order: i32,
    /// Route-scoped filters, in registration order.
    pub filters: Vec<Arc<dyn Filter>>,
}

impl Route {
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("upstream", &self.upstream)
            .field("order", &self.order)
            .field(
                "filters",
                &self.filters.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
