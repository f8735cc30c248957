//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (scan routes in order)
//!     → matcher.rs (evaluate path pattern)
//!     → Return: matched Route or no-match
//!
//! Route Compilation (at startup / reload):
//!     RouteConfig[]
//!     → Resolve filter refs via the registry
//!     → Sort by order (stable)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime; reload swaps the
//!   whole table atomically
//! - Prefix and `/**` glob patterns only; no regex in the hot path
//! - Deterministic: smallest `order` wins, overlapping ties are rejected at
//!   load time

pub mod matcher;
pub mod route;
pub mod router;

pub use matcher::PathPattern;
pub use route::Route;
pub use router::Router;
