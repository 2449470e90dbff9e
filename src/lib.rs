//! # paperfetcher-web
//!
//! Web front-end for an external paperfetcher service: collect search
//! parameters, forward them once per submission to a pluggable fetch
//! backend, and render the returned records with a download action.
//!
//! ## Modules
//!
//! - [`shell`] - validate -> fetch -> render orchestration (stateless)
//! - [`query`] - search parameters and validation
//! - [`results`] - immutable record/result-set models
//! - [`backend`] - the external fetch capability as a trait, plus a stub
//! - [`remote`] - HTTP adapter for the external service
//! - [`export`] - CSV and plain-list download artifacts
//! - [`report`] - search report text
//! - [`render`] - HTML and terminal rendering
//! - [`journals`] - journal picker list from a local CSV
//! - [`config`] - environment-derived runtime settings
//! - [`error`] - custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use paperfetcher_web::{query::Query, remote::RemoteBackend, shell::Shell};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = RemoteBackend::new("http://127.0.0.1:8000", 30)?;
//!     let shell = Shell::new(Arc::new(backend), None);
//!     let query = Query::handsearch(vec!["1476-4687".into()])
//!         .keywords(vec!["CRISPR".into()]);
//!     let outcome = shell.submit(query).await?;
//!     println!("Found {} records", outcome.results.len());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod journals;
pub mod query;
pub mod remote;
pub mod render;
pub mod report;
pub mod results;
pub mod shell;

pub use error::{Result, ShellError};
