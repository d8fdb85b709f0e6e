//! Roster Common Library
//!
//! Shared error handling and logging infrastructure for the roster workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all roster workspace members:
//!
//! - **Error Handling**: The common [`RosterError`] type and `Result` alias
//! - **Logging**: Centralized `tracing` configuration with console/file sinks
//!
//! # Example
//!
//! ```no_run
//! use roster_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{Result, RosterError};
