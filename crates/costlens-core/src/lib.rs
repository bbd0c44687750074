//! # costlens-core
//!
//! Core errors, paths, and logging for costlens.
//!
//! This crate provides:
//! - [`CostlensError`] - Errors raised while setting up the costlens runtime
//! - [`logging`] - Tracing setup and log management utilities
//! - [`paths`] - Locations of the costlens data directory, logs and config
//!
//! ## Example
//!
//! ```no_run
//! use costlens_core::logging;
//!
//! fn main() -> costlens_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!     tracing::info!("costlens started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod paths;

// Re-export main types for convenience
pub use error::{CostlensError, Result};
pub use logging::{LogGuard, init_logging};
