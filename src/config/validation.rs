//! Configuration validation and route compilation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (filter refs resolve in the registry)
//! - Detect duplicate route ids and ambiguous overlapping orders
//! - Compile validated config into runtime `Route` values
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Compilation and validation are one pass: a config that compiles is
//!   valid, nothing is silently dropped
//! - Runs before the gateway starts serving; a failed reload keeps the
//!   previous table

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::Uri;
use thiserror::Error;

use crate::config::schema::{FilterRef, GatewayConfig, RouteConfig};
use crate::filter::registry::{FilterRegistry, RegistryError};
use crate::filter::Filter;
use crate::routing::matcher::PathPattern;
use crate::routing::route::Route;
use crate::routing::router::Router;

/// A single semantic problem in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("duplicate route id {0:?}")]
    DuplicateRouteId(String),

    #[error("routes {first:?} and {second:?} overlap with equal order {order}")]
    AmbiguousOrder {
        first: String,
        second: String,
        order: i32,
    },

    #[error("route {route:?}: invalid path pattern: {reason}")]
    InvalidPattern { route: String, reason: String },

    #[error("route {route:?}: invalid upstream uri {uri:?}: {reason}")]
    InvalidUpstream {
        route: String,
        uri: String,
        reason: String,
    },

    #[error("route {route:?}: {source}")]
    RouteFilter {
        route: String,
        source: RegistryError,
    },

    #[error("global filter: {0}")]
    GlobalFilter(RegistryError),
}

/// Validate the whole configuration against a registry. All errors are
/// collected and reported together.
pub fn validate_config(
    config: &GatewayConfig,
    registry: &FilterRegistry,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if let Err(mut e) = compile_global_filters(&config.global_filters, registry) {
        errors.append(&mut e);
    }
    match compile_routes(&config.routes, registry) {
        Ok(_) => {}
        Err(mut e) => errors.append(&mut e),
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Resolve the global filter references.
pub fn compile_global_filters(
    refs: &[FilterRef],
    registry: &FilterRegistry,
) -> Result<Vec<Arc<dyn Filter>>, Vec<ValidationError>> {
    let mut filters = Vec::with_capacity(refs.len());
    let mut errors = Vec::new();
    for filter_ref in refs {
        match registry.build(filter_ref) {
            Ok(f) => filters.push(f),
            Err(e) => errors.push(ValidationError::GlobalFilter(e)),
        }
    }
    if errors.is_empty() {
        Ok(filters)
    } else {
        Err(errors)
    }
}

/// Compile route configs into an immutable route table, collecting every
/// semantic error on the way.
pub fn compile_routes(
    routes: &[RouteConfig],
    registry: &FilterRegistry,
) -> Result<Router, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut compiled: Vec<Route> = Vec::with_capacity(routes.len());

    for rc in routes {
        if !seen_ids.insert(rc.id.clone()) {
            errors.push(ValidationError::DuplicateRouteId(rc.id.clone()));
        }

        let pattern = match PathPattern::parse(&rc.path) {
            Ok(p) => Some(p),
            Err(reason) => {
                errors.push(ValidationError::InvalidPattern {
                    route: rc.id.clone(),
                    reason,
                });
                None
            }
        };

        let upstream = match rc.upstream.parse::<Uri>() {
            Ok(uri) if uri.scheme().is_some() && uri.authority().is_some() => Some(uri),
            Ok(_) => {
                errors.push(ValidationError::InvalidUpstream {
                    route: rc.id.clone(),
                    uri: rc.upstream.clone(),
                    reason: "must be absolute (scheme and authority)".to_string(),
                });
                None
            }
            Err(e) => {
                errors.push(ValidationError::InvalidUpstream {
                    route: rc.id.clone(),
                    uri: rc.upstream.clone(),
                    reason: e.to_string(),
                });
                None
            }
        };

        let mut filters = Vec::with_capacity(rc.filters.len());
        let mut filters_ok = true;
        for filter_ref in &rc.filters {
            match registry.build(filter_ref) {
                Ok(f) => filters.push(f),
                Err(e) => {
                    filters_ok = false;
                    errors.push(ValidationError::RouteFilter {
                        route: rc.id.clone(),
                        source: e,
                    });
                }
            }
        }

        if let (Some(pattern), Some(upstream), true) = (pattern, upstream, filters_ok) {
            compiled.push(Route {
                id: rc.id.clone(),
                pattern,
                upstream,
                order: rc.order,
                filters,
            });
        }
    }

    // Overlapping patterns with the same order have no deterministic winner.
    for (i, a) in compiled.iter().enumerate() {
        for b in &compiled[i + 1..] {
            if a.order == b.order && a.pattern.overlaps(&b.pattern) {
                errors.push(ValidationError::AmbiguousOrder {
                    first: a.id.clone(),
                    second: b.id.clone(),
                    order: a.order,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(Router::new(compiled))
    } else {
        Err(errors)
    }
}
