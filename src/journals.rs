//! Journal picker list.
//!
//! The web form offers a journal title/ISSN picker backed by a local copy
//! of the Crossref title list CSV (`JournalTitle,pissn,eissn` columns).
//! Loading is a plain file read; keeping the list current is the
//! operator's job, not this crate's.

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// One selectable journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Journal title
    pub title: String,
    /// Electronic ISSN (the one paperfetcher searches by)
    pub issn: String,
}

impl JournalEntry {
    /// Label shown in the picker, mirroring the original app.
    pub fn label(&self) -> String {
        format!("{}, ISSN:{}", self.title, self.issn)
    }
}

#[derive(Debug, Deserialize)]
struct TitleFileRow {
    #[serde(rename = "JournalTitle", default)]
    journal_title: String,
    #[serde(rename = "eissn", default)]
    eissn: String,
}

/// Load the picker list from a Crossref title-list CSV.
///
/// Rows without an electronic ISSN are skipped, as are rows whose ISSN
/// does not look like one (the upstream file contains stray values).
pub fn load_journal_csv(path: &Path) -> Result<Vec<JournalEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut entries = Vec::new();
    for row in rdr.deserialize::<TitleFileRow>() {
        let row = row?;
        let issn = row.eissn.trim();
        if crate::query::is_valid_issn(issn) && !row.journal_title.trim().is_empty() {
            entries.push(JournalEntry {
                title: row.journal_title.trim().to_string(),
                issn: issn.to_string(),
            });
        }
    }

    info!(count = entries.len(), path = %path.display(), "Loaded journal list");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_skips_rows_without_eissn() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "JournalTitle,pissn,eissn").expect("write");
        writeln!(file, "Nature,0028-0836,1476-4687").expect("write");
        writeln!(file, "No Electronic Edition,1111-2222,").expect("write");
        writeln!(file, "Bad ISSN,,not-an-issn").expect("write");
        writeln!(file, "Science,0036-8075,1095-9203").expect("write");

        let entries = load_journal_csv(file.path()).expect("load");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Nature");
        assert_eq!(entries[0].issn, "1476-4687");
        assert_eq!(entries[1].label(), "Science, ISSN:1095-9203");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_journal_csv(Path::new("/nonexistent/titles.csv")).is_err());
    }
}
