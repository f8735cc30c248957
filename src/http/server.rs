//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all gateway handler
//! - Wire up middleware (tracing, timeout)
//! - Buffer inbound bodies and hand requests to the gateway
//! - Apply config reloads and run graceful shutdown
//!
//! # Design Decisions
//! - The chain runs in a spawned task with a cancellation token armed by a
//!   drop guard: if the client goes away mid-exchange, entered filters
//!   still unwind with a cancellation signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header::HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::loader::ConfigError;
use crate::config::schema::GatewayConfig;
use crate::filter::registry::FilterRegistry;
use crate::gateway::Gateway;
use crate::http::request::{GatewayRequest, X_REQUEST_ID};
use crate::proxy::HttpForwarder;

/// Largest inbound body the gateway buffers.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application state injected into the handler.
#[derive(Clone)]
struct AppState {
    gateway: Arc<Gateway>,
}

/// HTTP server hosting the gateway.
pub struct HttpServer {
    router: Router,
    gateway: Arc<Gateway>,
}

impl HttpServer {
    /// Build the server from a validated configuration, using the built-in
    /// filter registry and the hyper-backed forwarder.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let registry = Arc::new(FilterRegistry::builtin());
        let gateway = Arc::new(Gateway::from_config(
            config,
            registry,
            Arc::new(HttpForwarder::new(Duration::from_secs(
                config.timeouts.upstream_secs,
            ))),
        )?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Build the server around an existing gateway (used by tests to inject
    /// forwarders or registries).
    pub fn with_gateway(config: &GatewayConfig, gateway: Arc<Gateway>) -> Self {
        let state = AppState {
            gateway: gateway.clone(),
        };

        let router = Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http());

        Self { router, gateway }
    }

    pub fn gateway(&self) -> Arc<Gateway> {
        self.gateway.clone()
    }

    /// Run the server until shutdown, applying configuration updates as
    /// they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                match gateway.apply_config(&new_config) {
                    Ok(()) => tracing::info!("Configuration reload applied"),
                    Err(errors) => {
                        for e in &errors {
                            tracing::error!(error = %e, "Rejected configuration update");
                        }
                    }
                }
            }
        });

        let app = self.router.into_make_service();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: buffer the request and run it through the gateway.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
        }
    };

    let gw_request = GatewayRequest::new(parts.method, parts.uri, parts.headers, body);
    let request_id = gw_request.request_id.clone();

    // The chain runs in its own task so a dropped handler (client gone)
    // cancels via the drop guard instead of abandoning the post-phase.
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let gateway = state.gateway.clone();
    let outcome = tokio::spawn(async move { gateway.handle(gw_request, cancel).await }).await;
    guard.disarm();

    match outcome {
        Ok(response) => {
            let mut response = response.into_response();
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
            response
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Gateway task panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Resolve when either ctrl-c or the coordinator signals shutdown.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if result.is_err() {
                tracing::error!("Failed to install Ctrl+C handler");
            }
        }
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
