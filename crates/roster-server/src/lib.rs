//! Roster Server Library
//!
//! HTTP server for managing subscriber groups and bulk-importing members
//! from uploaded CSV files.
//!
//! # Overview
//!
//! - **API Endpoints**: group management, member listing, and the CSV
//!   import endpoint
//! - **Import Pipeline**: streaming batch ingestion with adaptive batch
//!   sizing, bounded concurrency, and backpressure ([`ingest`])
//! - **Persistence**: PostgreSQL via SQLx behind the [`store::MemberStore`]
//!   seam
//! - **Configuration**: environment-based configuration management
//!
//! # Architecture
//!
//! Features are vertical slices (`features/<name>/{commands,queries,routes}`)
//! with plain-function handlers. The import pipeline under [`ingest`] is the
//! core of the system: it turns an unbounded row stream into bounded,
//! concurrently processed insert batches, isolating per-row and per-batch
//! failures into report rows while keeping the run's stats exact.
//!
//! # Example
//!
//! ```no_run
//! use roster_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod features;
pub mod ingest;
pub mod store;
