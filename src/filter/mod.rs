//! Filter subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → chain.rs (sort by priority, run pre-phase in order)
//!     → [a filter may short-circuit with a terminal response]
//!     → terminal proxy action (proxy::Forwarder)
//!     → chain.rs (run post-phase in strict reverse order)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Filters are trait objects composed over a shared interface; no
//!   inheritance, construction is explicit via the registry
//! - Priority is a total order: lower runs earlier in the pre-phase and
//!   later in the post-phase (onion model); ties keep registration order
//! - The post-phase runs for every filter that returned `Continue`, on
//!   every exit path (success, short-circuit, error, cancellation)

pub mod chain;
pub mod context;
pub mod header;
pub mod registry;
pub mod request_time;
pub mod token;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::http::request::GatewayRequest;
use crate::http::response::GatewayResponse;

pub use chain::FilterChain;
pub use context::RequestContext;
pub use registry::FilterRegistry;

/// Outcome of a filter's pre-phase.
#[derive(Debug)]
pub enum FilterAction {
    /// Proceed to the next filter (or the terminal proxy action).
    Continue,
    /// Stop advancing and answer the caller with this terminal response.
    /// The upstream is never invoked.
    ShortCircuit(GatewayResponse),
}

/// How the wrapped exchange ended, as seen by a filter's post-phase.
#[derive(Debug)]
pub enum Completion {
    /// The upstream (or a short-circuiting filter further in) produced a
    /// response. Post-phase filters may modify it in place.
    Response(GatewayResponse),
    /// The exchange failed; no response exists.
    Failed(GatewayError),
    /// The inbound caller went away while the exchange was in flight.
    Cancelled,
}

impl Completion {
    /// The response, when the exchange produced one.
    pub fn response_mut(&mut self) -> Option<&mut GatewayResponse> {
        match self {
            Completion::Response(resp) => Some(resp),
            _ => None,
        }
    }
}

/// A unit of pre/post logic wrapped around the proxy call.
///
/// `before` runs on the way in, in ascending priority order; `after` runs on
/// the way out, in the exact reverse order. State established in `before`
/// travels to the same filter's `after` through the [`RequestContext`].
#[async_trait]
pub trait Filter: Send + Sync {
    /// Stable identifier used in logs and configuration references.
    fn name(&self) -> &str;

    /// Lower runs earlier in the pre-phase and later in the post-phase.
    fn priority(&self) -> i32 {
        0
    }

    /// Pre-phase: inspect or mutate the outgoing request, stash state in the
    /// context, or short-circuit with a terminal response. An `Err` aborts
    /// the exchange and surfaces as a 5xx at the gateway boundary.
    async fn before(
        &self,
        request: &mut GatewayRequest,
        ctx: &mut RequestContext,
    ) -> Result<FilterAction, GatewayError>;

    /// Post-phase: observe or mutate the completion. Runs only if this
    /// filter's `before` returned `Continue`, and must not assume a success
    /// response exists. Errors here replace the completion but do not stop
    /// the remaining post-phase.
    async fn after(
        &self,
        completion: &mut Completion,
        ctx: &mut RequestContext,
    ) -> Result<(), GatewayError> {
        let _ = (completion, ctx);
        Ok(())
    }
}

impl std::fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter").field("name", &self.name()).finish()
    }
}
