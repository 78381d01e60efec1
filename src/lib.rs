//! # Congressional Record Ingestion Engine
//!
//! ## Overview
//! This library implements a sequential ingestion pipeline for U.S. federal
//! legislative records from the congress.gov API: bills, enacted laws,
//! amendments, and daily/bound Congressional Record issues, each enriched to
//! a complete aggregate with resolved document text.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `ingestion`: Pacing, HTTP client, pagination, enrichment fan-out,
//!   tiered document resolution, and the orchestrating engine
//! - `records`: Typed data model for every gathered entity
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Date windows or congress numbers, API credentials
//! - **Output**: Fully enriched aggregate records plus diagnostics for every
//!   tolerated failure
//! - **Pacing**: All traffic is held under the account-wide hourly ceiling
//!
//! ## Usage
//! ```rust,no_run
//! use congress_ingest::{Config, IngestionEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let mut engine = IngestionEngine::new(&config)?;
//!     let outcome = engine.gather_bills("2022-01-01", "2022-06-30").await?;
//!     println!("Gathered {} bills", outcome.records.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod ingestion;
pub mod records;

// Re-exports for convenience
pub use config::Config;
pub use errors::{IngestError, Result};
pub use ingestion::{Diagnostic, GatherOutcome, IngestionEngine};
pub use records::{AggregateAmendment, AggregateBill, BoundRecordIssue, RecordIssue};
