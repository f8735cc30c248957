//! Static request-header injection filter.
//!
//! Appends a configured header to the forwarded request, the gateway
//! equivalent of an `AddRequestHeader` route filter.

use async_trait::async_trait;
use axum::http::header::{HeaderName, HeaderValue};

use crate::error::GatewayError;
use crate::filter::{Filter, FilterAction, RequestContext};
use crate::http::request::GatewayRequest;

/// Name under which the registry exposes this filter.
pub const NAME: &str = "add_request_header";

/// Adds one static header to every request on the route.
pub struct AddRequestHeaderFilter {
    header: HeaderName,
    value: HeaderValue,
}

impl AddRequestHeaderFilter {
    /// Parse header name and value; invalid input is a configuration error,
    /// reported by the registry at load time.
    pub fn new(header: &str, value: &str) -> Result<Self, String> {
        let header: HeaderName = header
            .parse()
            .map_err(|_| format!("invalid header name {:?}", header))?;
        let value: HeaderValue = value
            .parse()
            .map_err(|_| format!("invalid header value {:?}", value))?;
        Ok(Self { header, value })
    }
}

#[async_trait]
impl Filter for AddRequestHeaderFilter {
    fn name(&self) -> &str {
        NAME
    }

    async fn before(
        &self,
        request: &mut GatewayRequest,
        _ctx: &mut RequestContext,
    ) -> Result<FilterAction, GatewayError> {
        request
            .headers
            .append(self.header.clone(), self.value.clone());
        Ok(FilterAction::Continue)
    }
}
