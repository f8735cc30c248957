//! Latency logging filter.
//!
//! Records a start instant in the pre-phase and logs
//! `<path>:<elapsed>ms` in the post-phase, optionally appending the query
//! parameters. The post-phase logs on every completion kind, so failed or
//! cancelled exchanges still leave a timing record.

use std::time::Instant;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::filter::{Completion, Filter, FilterAction, RequestContext};
use crate::http::request::GatewayRequest;

/// Name under which the registry exposes this filter.
pub const NAME: &str = "request_time";

const BEGIN_KEY: &str = "request_time.begin";
const PATH_KEY: &str = "request_time.path";
const PARAMS_KEY: &str = "request_time.params";

/// Per-route latency logger.
pub struct RequestTimeFilter {
    with_params: bool,
}

impl RequestTimeFilter {
    pub fn new(with_params: bool) -> Self {
        Self { with_params }
    }
}

impl Default for RequestTimeFilter {
    fn default() -> Self {
        Self::new(false)
    }
}

#[async_trait]
impl Filter for RequestTimeFilter {
    fn name(&self) -> &str {
        NAME
    }

    async fn before(
        &self,
        request: &mut GatewayRequest,
        ctx: &mut RequestContext,
    ) -> Result<FilterAction, GatewayError> {
        ctx.insert(BEGIN_KEY, Instant::now());
        ctx.insert(PATH_KEY, request.path().to_string());
        if self.with_params {
            ctx.insert(PARAMS_KEY, request.query().unwrap_or("").to_string());
        }
        Ok(FilterAction::Continue)
    }

    async fn after(
        &self,
        completion: &mut Completion,
        ctx: &mut RequestContext,
    ) -> Result<(), GatewayError> {
        // Only keys this filter wrote in its own pre-phase.
        let Some(begin) = ctx.get::<Instant>(BEGIN_KEY) else {
            return Ok(());
        };
        let elapsed_ms = begin.elapsed().as_millis();
        let path = ctx
            .get::<String>(PATH_KEY)
            .map(String::as_str)
            .unwrap_or("<unknown>");

        let outcome = match completion {
            Completion::Response(_) => "ok",
            Completion::Failed(_) => "failed",
            Completion::Cancelled => "cancelled",
        };

        match ctx.get::<String>(PARAMS_KEY) {
            Some(params) if self.with_params => {
                tracing::info!(outcome, "{}:{}ms params[{}]", path, elapsed_ms, params);
            }
            _ => {
                tracing::info!(outcome, "{}:{}ms", path, elapsed_ms);
            }
        }
        Ok(())
    }
}
