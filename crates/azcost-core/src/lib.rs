//! # azcost-core
//!
//! Shared errors and logging for the azcost crates.
//!
//! This crate provides:
//! - [`AzcostError`] - Configuration, I/O and environment errors
//! - [`logging`] - Tracing setup (JSON file log + compact stderr)
//!
//! ## Example
//!
//! ```no_run
//! fn main() -> azcost_core::Result<()> {
//!     let _guard = azcost_core::init_logging(None, false)?;
//!     tracing::info!("azcost started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{AzcostError, Result};
pub use logging::{LogGuard, init_logging};
