//! Filter chain execution engine.
//!
//! # Responsibilities
//! - Order filters by priority (stable on ties)
//! - Run the pre-phase forward, the terminal action, the post-phase in
//!   strict reverse order
//! - Honor short-circuits, errors and cancellation without skipping the
//!   post-phase for filters already entered
//!
//! # Design Decisions
//! - Nested-scope (onion) model: each filter wraps everything inside it, so
//!   anything acquired in `before` is released by the same filter's `after`
//! - A single completion latch per execution: the post-phase runs exactly
//!   once even if cancellation races terminal completion
//! - No retries here; retry policy belongs to the proxy collaborator

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::GatewayError;
use crate::filter::{Completion, Filter, FilterAction, RequestContext};
use crate::http::request::GatewayRequest;
use crate::http::response::GatewayResponse;

/// The action at the center of the chain, normally a proxy call to the
/// matched route's upstream.
#[async_trait]
pub trait Terminal: Send + Sync {
    async fn call(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError>;
}

/// One-shot gate deciding which of completion and cancellation wins.
///
/// Whoever observes `try_complete() == true` owns the post-phase; the loser
/// must not run it again.
pub struct CompletionLatch {
    fired: AtomicBool,
}

impl CompletionLatch {
    pub fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Returns true exactly once across all callers.
    pub fn try_complete(&self) -> bool {
        !self.fired.swap(true, Ordering::AcqRel)
    }
}

impl Default for CompletionLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered pipeline of filters around one terminal action.
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
}

impl FilterChain {
    /// Build a chain from the participating filters. Sorting is stable, so
    /// equal priorities keep their registration order.
    pub fn new(mut filters: Vec<Arc<dyn Filter>>) -> Self {
        filters.sort_by_key(|f| f.priority());
        Self { filters }
    }

    /// Filters in execution (pre-phase) order.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    /// Execute the pipeline around `terminal`.
    ///
    /// The pre-phase runs in priority order until a filter short-circuits or
    /// fails. The terminal action races `cancel`; whichever wins, the
    /// post-phase then runs in strict reverse order for every filter whose
    /// `before` returned `Continue`.
    pub async fn execute(
        &self,
        mut request: GatewayRequest,
        ctx: &mut RequestContext,
        terminal: &dyn Terminal,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse, GatewayError> {
        let latch = CompletionLatch::new();
        let mut entered = 0usize;
        let mut completion: Option<Completion> = None;

        for filter in &self.filters {
            match filter.before(&mut request, ctx).await {
                Ok(FilterAction::Continue) => entered += 1,
                Ok(FilterAction::ShortCircuit(resp)) => {
                    tracing::debug!(
                        filter = filter.name(),
                        status = resp.status.as_u16(),
                        "Filter short-circuited"
                    );
                    completion = Some(Completion::Response(resp));
                    break;
                }
                Err(e) => {
                    tracing::warn!(filter = filter.name(), error = %e, "Filter pre-phase failed");
                    completion = Some(Completion::Failed(e));
                    break;
                }
            }
        }

        let mut completion = match completion {
            Some(c) => c,
            // Every filter continued: invoke the terminal action, racing
            // cancellation. select! resolves one branch; the latch keeps the
            // post-phase single-shot even if both ever raced to it.
            None => tokio::select! {
                result = terminal.call(request) => match result {
                    Ok(resp) => Completion::Response(resp),
                    Err(e) => Completion::Failed(e),
                },
                _ = cancel.cancelled() => Completion::Cancelled,
            },
        };

        if latch.try_complete() {
            for filter in self.filters[..entered].iter().rev() {
                if let Err(e) = filter.after(&mut completion, ctx).await {
                    tracing::warn!(filter = filter.name(), error = %e, "Filter post-phase failed");
                    completion = Completion::Failed(e);
                }
            }
        }

        match completion {
            Completion::Response(resp) => Ok(resp),
            Completion::Failed(e) => Err(e),
            Completion::Cancelled => Err(GatewayError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, Method, StatusCode};
    use bytes::Bytes;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;

    type EventLog = Arc<Mutex<Vec<String>>>;

    /// Test filter that records pre/post invocations and can be programmed
    /// to short-circuit or fail.
    struct ProbeFilter {
        name: &'static str,
        priority: i32,
        events: EventLog,
        short_circuit: Option<StatusCode>,
        fail_before: bool,
    }

    impl ProbeFilter {
        fn new(name: &'static str, priority: i32, events: EventLog) -> Self {
            Self {
                name,
                priority,
                events,
                short_circuit: None,
                fail_before: false,
            }
        }

        fn short_circuiting(mut self, status: StatusCode) -> Self {
            self.short_circuit = Some(status);
            self
        }

        fn failing(mut self) -> Self {
            self.fail_before = true;
            self
        }
    }

    #[async_trait]
    impl Filter for ProbeFilter {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        async fn before(
            &self,
            _request: &mut GatewayRequest,
            _ctx: &mut RequestContext,
        ) -> Result<FilterAction, GatewayError> {
            self.events.lock().unwrap().push(format!("{}:before", self.name));
            if self.fail_before {
                return Err(GatewayError::Filter {
                    filter: self.name.to_string(),
                    reason: "programmed failure".into(),
                });
            }
            match self.short_circuit {
                Some(status) => Ok(FilterAction::ShortCircuit(GatewayResponse::status_only(
                    status,
                ))),
                None => Ok(FilterAction::Continue),
            }
        }

        async fn after(
            &self,
            completion: &mut Completion,
            _ctx: &mut RequestContext,
        ) -> Result<(), GatewayError> {
            let tag = match completion {
                Completion::Response(_) => "response",
                Completion::Failed(_) => "failed",
                Completion::Cancelled => "cancelled",
            };
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:after:{}", self.name, tag));
            Ok(())
        }
    }

    struct CountingTerminal {
        calls: AtomicU32,
    }

    impl CountingTerminal {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Terminal for CountingTerminal {
        async fn call(&self, _request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GatewayResponse::status_only(StatusCode::OK))
        }
    }

    /// Terminal that never completes; used to exercise cancellation.
    struct HangingTerminal;

    #[async_trait]
    impl Terminal for HangingTerminal {
        async fn call(&self, _request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    struct FailingTerminal;

    #[async_trait]
    impl Terminal for FailingTerminal {
        async fn call(&self, _request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
            Err(GatewayError::Upstream("connection refused".into()))
        }
    }

    fn request() -> GatewayRequest {
        GatewayRequest::new(
            Method::GET,
            "/customer/123".parse().unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        )
    }

    fn events() -> EventLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_onion_ordering_by_priority() {
        let log = events();
        // Registered inner-first: priority must dominate registration order.
        let chain = FilterChain::new(vec![
            Arc::new(ProbeFilter::new("timing", 0, log.clone())),
            Arc::new(ProbeFilter::new("token", -100, log.clone())),
        ]);

        let terminal = CountingTerminal::new();
        let mut ctx = RequestContext::new();
        let cancel = CancellationToken::new();
        let resp = chain
            .execute(request(), &mut ctx, &terminal, &cancel)
            .await
            .unwrap();

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "token:before",
                "timing:before",
                "timing:after:response",
                "token:after:response",
            ]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_terminal_and_inner_filters() {
        let log = events();
        let chain = FilterChain::new(vec![
            Arc::new(ProbeFilter::new("outer", -10, log.clone())),
            Arc::new(
                ProbeFilter::new("guard", 0, log.clone())
                    .short_circuiting(StatusCode::UNAUTHORIZED),
            ),
            Arc::new(ProbeFilter::new("inner", 10, log.clone())),
        ]);

        let terminal = CountingTerminal::new();
        let mut ctx = RequestContext::new();
        let cancel = CancellationToken::new();
        let resp = chain
            .execute(request(), &mut ctx, &terminal, &cancel)
            .await
            .unwrap();

        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert_eq!(terminal.calls(), 0);
        // The rejecting filter terminated the exchange itself; only filters
        // it was nested inside get their post-phase.
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer:before", "guard:before", "outer:after:response"]
        );
    }

    #[tokio::test]
    async fn test_before_error_still_unwinds_entered_filters() {
        let log = events();
        let chain = FilterChain::new(vec![
            Arc::new(ProbeFilter::new("outer", -10, log.clone())),
            Arc::new(ProbeFilter::new("broken", 0, log.clone()).failing()),
        ]);

        let terminal = CountingTerminal::new();
        let mut ctx = RequestContext::new();
        let cancel = CancellationToken::new();
        let err = chain
            .execute(request(), &mut ctx, &terminal, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Filter { .. }));
        assert_eq!(terminal.calls(), 0);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer:before", "broken:before", "outer:after:failed"]
        );
    }

    #[tokio::test]
    async fn test_terminal_error_runs_full_post_phase() {
        let log = events();
        let chain = FilterChain::new(vec![
            Arc::new(ProbeFilter::new("a", -1, log.clone())),
            Arc::new(ProbeFilter::new("b", 1, log.clone())),
        ]);

        let mut ctx = RequestContext::new();
        let cancel = CancellationToken::new();
        let err = chain
            .execute(request(), &mut ctx, &FailingTerminal, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Upstream(_)));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:before", "b:before", "b:after:failed", "a:after:failed"]
        );
    }

    #[tokio::test]
    async fn test_cancellation_unwinds_with_cancelled_signal() {
        let log = events();
        let chain = FilterChain::new(vec![
            Arc::new(ProbeFilter::new("a", -1, log.clone())),
            Arc::new(ProbeFilter::new("b", 1, log.clone())),
        ]);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let mut ctx = RequestContext::new();
        let err = chain
            .execute(request(), &mut ctx, &HangingTerminal, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Cancelled));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "a:before",
                "b:before",
                "b:after:cancelled",
                "a:after:cancelled",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_just_calls_terminal() {
        let chain = FilterChain::new(Vec::new());
        let terminal = CountingTerminal::new();
        let mut ctx = RequestContext::new();
        let cancel = CancellationToken::new();
        let resp = chain
            .execute(request(), &mut ctx, &terminal, &cancel)
            .await
            .unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(terminal.calls(), 1);
    }

    #[test]
    fn test_latch_fires_exactly_once() {
        let latch = CompletionLatch::new();
        assert!(latch.try_complete());
        assert!(!latch.try_complete());
        assert!(!latch.try_complete());
    }

    #[test]
    fn test_stable_sort_keeps_registration_order_on_ties() {
        let log = events();
        let chain = FilterChain::new(vec![
            Arc::new(ProbeFilter::new("first", 0, log.clone())),
            Arc::new(ProbeFilter::new("second", 0, log.clone())),
            Arc::new(ProbeFilter::new("earliest", -5, log.clone())),
        ]);
        let names: Vec<&str> = chain.filters().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["earliest", "first", "second"]);
    }
}
