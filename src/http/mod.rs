//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request.rs (buffer body, attach request ID)
//!     → gateway (route match + filter chain + proxy)
//!     → response.rs (convert back to Axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{GatewayRequest, X_REQUEST_ID};
pub use response::GatewayResponse;
pub use server::HttpServer;
