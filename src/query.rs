//! Query model.
//!
//! A [`Query`] captures one user submission: what kind of search to run,
//! which sources to search, and how the results should be exported. It is
//! built once per interaction, validated before the backend is invoked,
//! and discarded after the corresponding result is rendered.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{Result, ShellError};

/// Kind of literature search to forward to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchKind {
    /// Search within journals (by ISSN), optionally refined by keywords
    Handsearch,
    /// For each seed paper, find the papers it cites
    SnowballBackward,
    /// For each seed paper, find the papers that cite it
    SnowballForward,
}

impl SearchKind {
    /// Human-readable label, used in reports and the web form.
    pub fn label(&self) -> &'static str {
        match self {
            SearchKind::Handsearch => "Handsearch",
            SearchKind::SnowballBackward => "Snowball-search (backward reference chasing)",
            SearchKind::SnowballForward => "Snowball-search (forward citation chasing)",
        }
    }
}

/// Export format selector. The shell only offers these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Comma-separated values, header row plus one row per record
    #[default]
    Csv,
    /// Plain list, one line per record
    PlainList,
}

impl ExportFormat {
    /// File extension for the download artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::PlainList => "txt",
        }
    }

    /// MIME type for the download response.
    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::PlainList => "text/plain; charset=utf-8",
        }
    }

    /// Value used in the web form and the `/export` URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::PlainList => "plain-list",
        }
    }
}

/// One search submission. Immutable once handed to the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Kind of search
    pub kind: SearchKind,
    /// Search keywords (handsearch refinement; required non-empty there)
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Source identifiers: journal ISSNs (handsearch) or seed DOIs (snowball)
    #[serde(default)]
    pub sources: Vec<String>,
    /// Fetch articles from this date onwards
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    /// Fetch articles up to this date
    #[serde(default)]
    pub until_date: Option<NaiveDate>,
    /// Requested export format
    #[serde(default)]
    pub format: ExportFormat,
}

impl Query {
    /// Create a handsearch query for the given ISSNs.
    pub fn handsearch(issns: Vec<String>) -> Self {
        Self {
            kind: SearchKind::Handsearch,
            keywords: Vec::new(),
            sources: issns,
            from_date: None,
            until_date: None,
            format: ExportFormat::default(),
        }
    }

    /// Create a snowball query for the given seed DOIs.
    pub fn snowball(dois: Vec<String>, forward: bool) -> Self {
        Self {
            kind: if forward {
                SearchKind::SnowballForward
            } else {
                SearchKind::SnowballBackward
            },
            keywords: Vec::new(),
            sources: dois,
            from_date: None,
            until_date: None,
            format: ExportFormat::default(),
        }
    }

    /// Set keywords (builder style).
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Set the date range (builder style).
    pub fn date_range(mut self, from: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        self.from_date = from;
        self.until_date = until;
        self
    }

    /// Set the export format (builder style).
    pub fn format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Validate the query. Called by the shell before any backend call.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::InvalidQuery`] when keywords are empty for a
    /// handsearch, no sources are given, an ISSN or DOI is malformed, or
    /// the date range is inverted.
    pub fn validate(&self) -> Result<()> {
        match self.kind {
            SearchKind::Handsearch => {
                if self.keywords.iter().all(|k| k.trim().is_empty()) {
                    return Err(ShellError::InvalidQuery(
                        "search keywords must not be empty".to_string(),
                    ));
                }
                if self.sources.is_empty() {
                    return Err(ShellError::InvalidQuery(
                        "select at least one journal (ISSN) to search in".to_string(),
                    ));
                }
                for issn in &self.sources {
                    if !is_valid_issn(issn) {
                        return Err(ShellError::InvalidQuery(format!(
                            "'{issn}' is not a valid ISSN (expected NNNN-NNNC)"
                        )));
                    }
                }
            }
            SearchKind::SnowballBackward | SearchKind::SnowballForward => {
                if self.sources.is_empty() {
                    return Err(ShellError::InvalidQuery(
                        "enter at least one DOI to start from".to_string(),
                    ));
                }
                for doi in &self.sources {
                    if !is_valid_doi(doi) {
                        return Err(ShellError::InvalidQuery(format!(
                            "'{doi}' is not a valid DOI (expected 10.NNNN/...)"
                        )));
                    }
                }
            }
        }

        if let (Some(from), Some(until)) = (self.from_date, self.until_date) {
            if from > until {
                return Err(ShellError::InvalidQuery(format!(
                    "from-date {from} is after until-date {until}"
                )));
            }
        }

        Ok(())
    }
}

/// Split a comma-separated user input into trimmed, non-empty items.
///
/// The web form and the original app both take keywords and DOIs as a
/// single comma-separated text field.
pub fn split_comma_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn issn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{3}[\dxX]$").expect("literal ISSN pattern"))
}

fn doi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("literal DOI pattern"))
}

/// Check ISSN shape (NNNN-NNNC, where C is a digit or X).
pub fn is_valid_issn(issn: &str) -> bool {
    issn_regex().is_match(issn.trim())
}

/// Check DOI shape (10.NNNN/suffix).
pub fn is_valid_doi(doi: &str) -> bool {
    doi_regex().is_match(doi.trim())
}
