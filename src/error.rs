//! Gateway error taxonomy.
//!
//! # Design Decisions
//! - Errors are per-request: they convert to an HTTP response at the
//!   gateway boundary and never tear down the process
//! - Configuration errors live in `config::loader` / `config::validation`;
//!   this module only covers request-time failures

use axum::http::StatusCode;
use thiserror::Error;

/// Request-time errors raised inside the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no route matches path {0}")]
    RouteNotFound(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("upstream request timed out")]
    Timeout,

    #[error("filter {filter} failed: {reason}")]
    Filter { filter: String, reason: String },

    #[error("request cancelled by client")]
    Cancelled,

    #[error("invalid upstream uri: {0}")]
    InvalidUri(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status code this error maps to at the gateway boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Filter { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            // 499: client closed request before the exchange completed.
            GatewayError::Cancelled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            GatewayError::InvalidUri(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
