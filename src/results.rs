//! Record and result-set models.
//!
//! A [`ResultSet`] is the ordered sequence of records a backend returned
//! for one submission. It is owned transiently by the shell for one render
//! cycle and never mutated after receipt: display filtering produces a new
//! set, export only reads it.

use serde::{Deserialize, Serialize};

/// Column order for tables and CSV export.
///
/// The upstream library never fixed an ordering, so this constant is the
/// single place it is decided.
pub const EXPORT_COLUMNS: &[&str] = &[
    "title",
    "authors",
    "journal",
    "published_date",
    "doi",
    "url",
    "abstract_text",
];

/// A single bibliographic record returned by the fetch backend.
/// Fields the backend omits deserialize as empty.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Record {
    /// Article title
    pub title: String,
    /// Authors (comma-separated)
    pub authors: String,
    /// Journal or venue name
    pub journal: String,
    /// Publication date (YYYY-MM-DD or partial)
    pub published_date: String,
    /// DOI (may be empty when the backend could not resolve one)
    pub doi: String,
    /// Direct URL to the article
    pub url: String,
    /// Article abstract
    pub abstract_text: String,
}

impl Record {
    /// Field values in [`EXPORT_COLUMNS`] order.
    pub fn values(&self) -> [&str; 7] {
        [
            &self.title,
            &self.authors,
            &self.journal,
            &self.published_date,
            &self.doi,
            &self.url,
            &self.abstract_text,
        ]
    }

    /// One-line identifier for the plain-list export: the DOI when known,
    /// otherwise the title.
    pub fn plain_line(&self) -> &str {
        if self.doi.trim().is_empty() {
            &self.title
        } else {
            &self.doi
        }
    }
}

/// Ordered, immutable collection of records from one backend call.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ResultSet {
    records: Vec<Record>,
}

impl ResultSet {
    /// Take ownership of records fetched by a backend.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read-only view of the records, in backend order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Display filter: a new set holding clones of the matching records.
    /// The original set is left untouched.
    pub fn filtered<F>(&self, predicate: F) -> ResultSet
    where
        F: Fn(&Record) -> bool,
    {
        ResultSet::new(self.records.iter().filter(|r| predicate(r)).cloned().collect())
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
