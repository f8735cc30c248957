//! Global access-control filter.
//!
//! Rejects any request that does not carry a non-blank `token` query
//! parameter. Runs at priority -100 so it wraps every other filter and the
//! upstream never sees unauthenticated traffic.

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::error::GatewayError;
use crate::filter::{Filter, FilterAction, RequestContext};
use crate::http::request::GatewayRequest;
use crate::http::response::GatewayResponse;

/// Name under which the registry exposes this filter.
pub const NAME: &str = "token";

/// Token-based access check, applied globally.
pub struct AccessTokenFilter {
    priority: i32,
}

impl AccessTokenFilter {
    pub fn new() -> Self {
        Self { priority: -100 }
    }
}

impl Default for AccessTokenFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Filter for AccessTokenFilter {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn before(
        &self,
        request: &mut GatewayRequest,
        _ctx: &mut RequestContext,
    ) -> Result<FilterAction, GatewayError> {
        match request.query_param("token") {
            Some(token) if !token.trim().is_empty() => Ok(FilterAction::Continue),
            _ => {
                tracing::info!(
                    request_id = %request.request_id,
                    path = request.path(),
                    "token is empty, rejecting"
                );
                Ok(FilterAction::ShortCircuit(GatewayResponse::status_only(
                    StatusCode::UNAUTHORIZED,
                )))
            }
        }
    }
}
