//! Inbound request representation.
//!
//! # Responsibilities
//! - Carry method, URI, headers and buffered body through the filter chain
//! - Generate a unique request ID for tracing (UUID v4, or the inbound
//!   `x-request-id` when the caller already set one)
//! - Expose query parameters to filters without re-parsing the URI
//!
//! # Design Decisions
//! - Body is buffered up front: filters may inspect or replace it, and the
//!   chain core stays free of streaming concerns
//! - Filters receive `&mut` access; the request they modify is the request
//!   the terminal proxy action forwards

use axum::http::{HeaderMap, Method, Uri};
use bytes::Bytes;
use std::borrow::Cow;

/// Canonical request-ID header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A buffered inbound request flowing through the filter chain.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub request_id: String,
}

impl GatewayRequest {
    /// Create a request, reusing the caller's `x-request-id` if present.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            method,
            uri,
            headers,
            body,
            request_id,
        }
    }

    /// Request path component.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// First value of a query parameter, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<Cow<'_, str>> {
        let query = self.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
