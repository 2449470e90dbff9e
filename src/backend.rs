//! The external fetch capability as a trait.
//!
//! All substantive work (citation retrieval, parsing, deduplication) lives
//! behind [`FetchBackend`]. The shell consumes it through a call-and-render
//! contract: one `fetch` per submission, plus an optional `dry_run` when a
//! result limit is configured. [`StubBackend`] is the in-process
//! implementation used by tests and offline demos.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

use crate::query::Query;
use crate::results::ResultSet;

/// Errors the external fetch capability can surface.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or transport error reaching the backend
    #[error("network error: {0}")]
    Network(String),

    /// The backend call exceeded the bounded wait
    #[error("the backend did not respond within {0}s")]
    Timeout(u64),

    /// The backend answered with an error status
    #[error("backend error {status}: {message}")]
    Api {
        /// HTTP status code from the backend
        status: u16,
        /// Error message from the backend
        message: String,
    },

    /// The backend response could not be decoded
    #[error("malformed backend response: {0}")]
    Parse(String),

    /// The backend does not implement this operation (e.g. dry runs)
    #[error("operation not supported by this backend")]
    NotSupported,
}

/// External fetch capability consumed by the shell.
///
/// Implementations own everything the shell must not do: database access,
/// rate limiting, citation parsing, caching.
#[async_trait]
pub trait FetchBackend: Send + Sync {
    /// Short identifier for logs and reports (e.g. "remote", "stub").
    fn id(&self) -> &str;

    /// Execute the query and return the fetched records.
    async fn fetch(&self, query: &Query) -> Result<ResultSet, FetchError>;

    /// Estimate the result count without fetching. Backends that cannot
    /// estimate return [`FetchError::NotSupported`]; the shell then skips
    /// its result-limit guard.
    async fn dry_run(&self, _query: &Query) -> Result<usize, FetchError> {
        Err(FetchError::NotSupported)
    }
}

/// Scripted backend returning predefined responses.
///
/// Each queued response answers exactly one `fetch`; when the script is
/// exhausted the stub answers with an empty set. Calls are counted so
/// tests can assert that invalid queries never reach the backend.
#[derive(Default)]
pub struct StubBackend {
    script: Mutex<Vec<Result<ResultSet, FetchError>>>,
    dry_run_count: Mutex<Option<usize>>,
    fetch_calls: AtomicUsize,
    dry_run_calls: AtomicUsize,
}

impl StubBackend {
    /// Create an empty stub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn push_records(&self, set: ResultSet) {
        self.script
            .lock()
            .expect("stub script lock")
            .push(Ok(set));
    }

    /// Queue a failure.
    pub fn push_error(&self, err: FetchError) {
        self.script
            .lock()
            .expect("stub script lock")
            .push(Err(err));
    }

    /// Fix the count reported by `dry_run`.
    pub fn set_dry_run_count(&self, count: usize) {
        *self.dry_run_count.lock().expect("stub dry-run lock") = Some(count);
    }

    /// Number of `fetch` calls made so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of `dry_run` calls made so far.
    pub fn dry_run_calls(&self) -> usize {
        self.dry_run_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchBackend for StubBackend {
    fn id(&self) -> &str {
        "stub"
    }

    async fn fetch(&self, _query: &Query) -> Result<ResultSet, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().expect("stub script lock");
        if script.is_empty() {
            Ok(ResultSet::default())
        } else {
            script.remove(0)
        }
    }

    async fn dry_run(&self, _query: &Query) -> Result<usize, FetchError> {
        self.dry_run_calls.fetch_add(1, Ordering::SeqCst);
        match *self.dry_run_count.lock().expect("stub dry-run lock") {
            Some(count) => Ok(count),
            None => Err(FetchError::NotSupported),
        }
    }
}
