//! Gateway composition.
//!
//! # Responsibilities
//! - Select the route for each inbound request
//! - Merge the global filter set with the route's filters into one chain,
//!   interleaved by priority (not by group)
//! - Bind the terminal action to the route's upstream and execute the chain
//! - Convert errors to HTTP responses at this boundary
//!
//! # Design Decisions
//! - Route table lives behind `arc_swap`: reconfiguration replaces the
//!   whole snapshot atomically, in-flight requests keep the snapshot they
//!   matched against
//! - Global filters are fixed at startup; reload only swaps routes
//! - Explicit construction: the gateway takes its registry, filters and
//!   forwarder as inputs, no ambient state

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use tokio_util::sync::CancellationToken;

use crate::config::loader::ConfigError;
use crate::config::schema::GatewayConfig;
use crate::config::validation::{compile_global_filters, compile_routes, ValidationError};
use crate::error::GatewayError;
use crate::filter::chain::Terminal;
use crate::filter::registry::FilterRegistry;
use crate::filter::{Filter, FilterChain, RequestContext};
use crate::http::request::GatewayRequest;
use crate::http::response::GatewayResponse;
use crate::observability::metrics;
use crate::proxy::Forwarder;
use crate::routing::router::Router;

/// Terminal action bound to one route's upstream.
struct UpstreamCall<'a> {
    forwarder: &'a dyn Forwarder,
    upstream: &'a Uri,
}

#[async_trait]
impl Terminal for UpstreamCall<'_> {
    async fn call(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        self.forwarder.forward(request, self.upstream).await
    }
}

/// Top-level entry point: routes a request, runs the merged filter chain,
/// and returns the response.
pub struct Gateway {
    routes: ArcSwap<Router>,
    global_filters: Vec<Arc<dyn Filter>>,
    registry: Arc<FilterRegistry>,
    forwarder: Arc<dyn Forwarder>,
}

impl Gateway {
    pub fn new(
        router: Router,
        global_filters: Vec<Arc<dyn Filter>>,
        registry: Arc<FilterRegistry>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        Self {
            routes: ArcSwap::from_pointee(router),
            global_filters,
            registry,
            forwarder,
        }
    }

    /// Compile a validated configuration into a running gateway.
    pub fn from_config(
        config: &GatewayConfig,
        registry: Arc<FilterRegistry>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Result<Self, ConfigError> {
        let global_filters = compile_global_filters(&config.global_filters, &registry)
            .map_err(ConfigError::Validation)?;
        let router =
            compile_routes(&config.routes, &registry).map_err(ConfigError::Validation)?;
        Ok(Self::new(router, global_filters, registry, forwarder))
    }

    /// Replace the route table from a new configuration. Global filters are
    /// fixed at startup and deliberately left untouched. In-flight requests
    /// keep the snapshot they already loaded.
    pub fn apply_config(&self, config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
        let router = compile_routes(&config.routes, &self.registry)?;
        self.routes.store(Arc::new(router));
        tracing::info!(routes = config.routes.len(), "Route table replaced");
        Ok(())
    }

    /// Current route table snapshot.
    pub fn router(&self) -> Arc<Router> {
        self.routes.load_full()
    }

    /// Process one inbound request to completion.
    pub async fn handle(
        &self,
        request: GatewayRequest,
        cancel: CancellationToken,
    ) -> GatewayResponse {
        let start = Instant::now();
        let method = request.method.to_string();
        let path = request.path().to_string();
        let request_id = request.request_id.clone();

        // Snapshot: reloads after this point do not affect this request.
        let table = self.routes.load_full();
        let route = match table.select(&path) {
            Some(r) => r,
            None => {
                tracing::warn!(request_id = %request_id, path = %path, "No route matched");
                let e = GatewayError::RouteNotFound(path);
                metrics::record_request(&method, e.status_code().as_u16(), "none", start);
                return error_response(e.status_code(), &e);
            }
        };

        tracing::debug!(
            request_id = %request_id,
            route = %route.id,
            upstream = %route.upstream,
            "Route matched"
        );

        // Global and route filters interleave by priority, ties keep
        // registration order (globals registered first).
        let mut filters = Vec::with_capacity(self.global_filters.len() + route.filters.len());
        filters.extend(self.global_filters.iter().cloned());
        filters.extend(route.filters.iter().cloned());
        let chain = FilterChain::new(filters);

        let terminal = UpstreamCall {
            forwarder: self.forwarder.as_ref(),
            upstream: &route.upstream,
        };
        let mut ctx = RequestContext::new();

        match chain.execute(request, &mut ctx, &terminal, &cancel).await {
            Ok(response) => {
                metrics::record_request(&method, response.status.as_u16(), &route.id, start);
                response
            }
            Err(e) => {
                let status = e.status_code();
                tracing::error!(
                    request_id = %request_id,
                    route = %route.id,
                    path = %path,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Request failed"
                );
                metrics::record_request(&method, status.as_u16(), &route.id, start);
                error_response(status, &e)
            }
        }
    }
}

fn error_response(status: StatusCode, error: &GatewayError) -> GatewayResponse {
    let body = serde_json::json!({ "error": error.to_string() }).to_string();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    GatewayResponse::new(status, headers, body.into())
}
