//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Compile routes/filters → Start listener
//!
//! Shutdown:
//!     Signal received → Stop accepting → Drain in-flight chains → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
