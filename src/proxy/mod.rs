//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! FilterChain terminal action
//!     → Forwarder::forward (method, headers, body preserved;
//!       original query string appended to the upstream URI)
//!     → upstream HTTP response, buffered
//! ```
//!
//! # Design Decisions
//! - `Forwarder` is the seam between the chain core and the network:
//!   production uses the hyper client, tests substitute counters/mocks
//! - No retries, pooling policy or TLS termination here; transport failures
//!   surface as `GatewayError::Upstream`

pub mod client;

use async_trait::async_trait;
use axum::http::Uri;

use crate::error::GatewayError;
use crate::http::request::GatewayRequest;
use crate::http::response::GatewayResponse;

/// The proxy collaborator: forward one request to an upstream target and
/// return its buffered response.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(
        &self,
        request: GatewayRequest,
        upstream: &Uri,
    ) -> Result<GatewayResponse, GatewayError>;
}

pub use client::HttpForwarder;
