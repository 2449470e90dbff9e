//! Runtime settings.
//!
//! Read once at startup from the environment, then overridden by CLI
//! flags. The shell itself only ever sees the final immutable values.
//!
//! Environment variables:
//!
//! - `PAPERFETCHER_BACKEND_URL`  - base URL of the external fetch service
//! - `PAPERFETCHER_SEARCH_LIMIT` - reject searches expected to exceed this
//!   many records (unset means unlimited; used to keep cloud instances
//!   within resource limits)
//! - `PAPERFETCHER_TIMEOUT_SECS` - bounded wait for one backend call

use std::env;

use crate::error::{Result, ShellError};
use crate::remote::DEFAULT_TIMEOUT_SECS;

/// Default backend service address.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Immutable runtime settings shared by both CLI modes.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the external fetch service
    pub backend_url: String,
    /// Bounded wait for one backend call, in seconds
    pub timeout_secs: u64,
    /// Maximum expected result count, enforced via backend dry runs
    pub result_limit: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            result_limit: None,
        }
    }
}

impl Settings {
    /// Build settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Config`] when a variable is set but cannot be
    /// parsed.
    pub fn from_env() -> Result<Self> {
        let mut settings = Settings::default();

        if let Ok(url) = env::var("PAPERFETCHER_BACKEND_URL") {
            if !url.trim().is_empty() {
                settings.backend_url = url;
            }
        }

        if let Ok(raw) = env::var("PAPERFETCHER_SEARCH_LIMIT") {
            let limit: usize = raw.trim().parse().map_err(|_| {
                ShellError::Config(format!("PAPERFETCHER_SEARCH_LIMIT must be a number, got '{raw}'"))
            })?;
            settings.result_limit = Some(limit);
        }

        if let Ok(raw) = env::var("PAPERFETCHER_TIMEOUT_SECS") {
            settings.timeout_secs = raw.trim().parse().map_err(|_| {
                ShellError::Config(format!("PAPERFETCHER_TIMEOUT_SECS must be a number, got '{raw}'"))
            })?;
        }

        Ok(settings)
    }

    /// Apply CLI overrides on top of the environment values.
    pub fn with_overrides(
        mut self,
        backend_url: Option<String>,
        timeout_secs: Option<u64>,
        result_limit: Option<usize>,
    ) -> Self {
        if let Some(url) = backend_url {
            self.backend_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.timeout_secs = secs;
        }
        if result_limit.is_some() {
            self.result_limit = result_limit;
        }
        self
    }
}
