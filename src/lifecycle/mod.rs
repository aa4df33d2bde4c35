//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging → Build transport/client → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C received → Cancel in-flight calls → Stop accepting → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Shutdown cancels upstream work instead of waiting for it

pub mod shutdown;

pub use shutdown::Shutdown;
