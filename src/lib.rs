//! Filter-chain API gateway library.
//!
//! Routes requests matching a path pattern to an upstream HTTP service and
//! wraps the proxy call in an ordered pipeline of pre/post filters with
//! per-route and global scopes, deterministic priority ordering, and
//! short-circuiting on rejection.

pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
