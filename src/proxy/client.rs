//! Hyper-backed production forwarder.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::uri::PathAndQuery;
use axum::http::{header, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::error::GatewayError;
use crate::http::request::GatewayRequest;
use crate::http::response::GatewayResponse;
use crate::proxy::Forwarder;

/// Upstream deadline applied when the caller supplies none.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Forwards requests over HTTP/1.1 using the hyper legacy client.
pub struct HttpForwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl HttpForwarder {
    /// `timeout` bounds one full upstream exchange, connect through body.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }
}

impl Default for HttpForwarder {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

/// Compose the upstream target: the route's URI with the original request's
/// query string appended.
fn target_uri(upstream: &Uri, request_query: Option<&str>) -> Result<Uri, GatewayError> {
    let path = upstream.path();
    let path_and_query = match (upstream.query(), request_query) {
        (None, None) => path.to_string(),
        (Some(q), None) | (None, Some(q)) => format!("{}?{}", path, q),
        (Some(a), Some(b)) => format!("{}?{}&{}", path, a, b),
    };

    let mut parts = upstream.clone().into_parts();
    parts.path_and_query = Some(
        path_and_query
            .parse::<PathAndQuery>()
            .map_err(|e| GatewayError::InvalidUri(e.to_string()))?,
    );
    Uri::from_parts(parts).map_err(|e| GatewayError::InvalidUri(e.to_string()))
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(
        &self,
        request: GatewayRequest,
        upstream: &Uri,
    ) -> Result<GatewayResponse, GatewayError> {
        let uri = target_uri(upstream, request.query())?;

        let mut builder = Request::builder().method(request.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in request.headers.iter() {
                // Host must reflect the upstream authority, not the caller's.
                if name == header::HOST {
                    continue;
                }
                headers.insert(name.clone(), value.clone());
            }
        }

        let outgoing = builder
            .body(Body::from(request.body))
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        let exchange = async {
            let response = self
                .client
                .request(outgoing)
                .await
                .map_err(|e| GatewayError::Upstream(e.to_string()))?;

            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(Body::new(body), usize::MAX)
                .await
                .map_err(|e| GatewayError::Upstream(e.to_string()))?;

            Ok(GatewayResponse::new(parts.status, parts.headers, body))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| GatewayError::Timeout)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_uri_appends_request_query() {
        let upstream: Uri = "http://httpbin.org:80/get".parse().unwrap();
        let uri = target_uri(&upstream, Some("token=123456")).unwrap();
        assert_eq!(uri.to_string(), "http://httpbin.org:80/get?token=123456");
    }

    #[test]
    fn test_target_uri_merges_existing_query() {
        let upstream: Uri = "http://backend/search?src=gw".parse().unwrap();
        let uri = target_uri(&upstream, Some("q=abc")).unwrap();
        assert_eq!(uri.to_string(), "http://backend/search?src=gw&q=abc");
    }

    #[test]
    fn test_target_uri_without_query() {
        let upstream: Uri = "http://backend:9000/".parse().unwrap();
        let uri = target_uri(&upstream, None).unwrap();
        assert_eq!(uri.to_string(), "http://backend:9000/");
    }

    #[tokio::test]
    async fn test_slow_upstream_elapses_deadline() {
        use axum::http::{HeaderMap, Method};
        use bytes::Bytes;

        // Accept the connection but hold it open without answering.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _held = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let forwarder = HttpForwarder::new(Duration::from_millis(100));
        let request = GatewayRequest::new(
            Method::GET,
            "http://gw/x".parse().unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        );
        let upstream: Uri = format!("http://{}/", addr).parse().unwrap();

        let err = forwarder.forward(request, &upstream).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout));
    }
}
