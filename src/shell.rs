//! The UI shell.
//!
//! One submission is one independent validate -> fetch -> outcome cycle.
//! The shell holds only the backend handle and immutable settings; no
//! state survives between submissions, so a failed cycle never poisons
//! the next one.

use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::FetchBackend;
use crate::error::{Result, ShellError};
use crate::export::{self, ExportArtifact};
use crate::query::Query;
use crate::report;
use crate::results::ResultSet;

/// Outcome of one successful submission: everything the UI needs to
/// render a table, show the report, and offer the download.
#[derive(Debug)]
pub struct SearchOutcome {
    /// The query that produced this outcome
    pub query: Query,
    /// Fetched records, in backend order
    pub results: ResultSet,
    /// Plain-text search report
    pub report: String,
}

impl SearchOutcome {
    /// Serialize the results in the format the query selected.
    pub fn export(&self) -> Result<ExportArtifact> {
        export::export(&self.results, self.query.format, &self.query.keywords)
    }
}

/// Stateless request/render orchestrator over a fetch backend.
pub struct Shell {
    backend: Arc<dyn FetchBackend>,
    result_limit: Option<usize>,
}

impl Shell {
    /// Create a shell over the given backend.
    pub fn new(backend: Arc<dyn FetchBackend>, result_limit: Option<usize>) -> Self {
        Self {
            backend,
            result_limit,
        }
    }

    /// Run one submission.
    ///
    /// Validates the query before the backend is touched, enforces the
    /// result limit via a dry run when one is configured, then makes the
    /// single outbound fetch call.
    ///
    /// # Errors
    ///
    /// [`ShellError::InvalidQuery`] for rejected input (no backend call is
    /// made), [`ShellError::LimitExceeded`] when the dry run overshoots
    /// the limit, [`ShellError::EmptyResult`] for zero records, and
    /// [`ShellError::Fetch`] for backend failures.
    pub async fn submit(&self, query: Query) -> Result<SearchOutcome> {
        query.validate()?;

        info!(
            backend = self.backend.id(),
            kind = ?query.kind,
            sources = query.sources.len(),
            "Submitting search"
        );

        if let Some(limit) = self.result_limit {
            self.check_limit(&query, limit).await?;
        }

        let results = self.backend.fetch(&query).await?;

        if results.is_empty() {
            return Err(ShellError::EmptyResult);
        }

        info!(count = results.len(), "Search complete");
        let report = report::build(&query, results.len());

        Ok(SearchOutcome {
            query,
            results,
            report,
        })
    }

    /// Dry-run guard. Backends without dry-run support are fetched from
    /// directly; only a definite overshoot rejects the search.
    async fn check_limit(&self, query: &Query, limit: usize) -> Result<()> {
        match self.backend.dry_run(query).await {
            Ok(expected) if expected > limit => {
                warn!(expected, limit, "Search rejected by result limit");
                Err(ShellError::LimitExceeded { expected, limit })
            }
            Ok(_) => Ok(()),
            Err(crate::backend::FetchError::NotSupported) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
