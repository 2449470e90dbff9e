//! Export serialization.
//!
//! Turns a [`ResultSet`] into the downloadable artifact the user asked
//! for: CSV (header plus one row per record) or a plain list (one line per
//! record). Serialization reads the set verbatim; nothing is reordered or
//! deduplicated here.

use chrono::Local;

use crate::error::Result;
use crate::query::ExportFormat;
use crate::results::{Record, ResultSet};

/// A serialized result set ready for download or writing to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name (timestamped, derived from the keywords)
    pub filename: String,
    /// MIME type matching the chosen format
    pub mime: &'static str,
    /// Serialized body
    pub body: String,
}

/// Serialize a result set in the requested format.
pub fn export(set: &ResultSet, format: ExportFormat, keywords: &[String]) -> Result<ExportArtifact> {
    let body = match format {
        ExportFormat::Csv => to_csv(set)?,
        ExportFormat::PlainList => to_plain_list(set),
    };

    Ok(ExportArtifact {
        filename: suggest_filename(keywords, format),
        mime: format.mime(),
        body,
    })
}

/// Serialize to CSV. Field order follows [`crate::results::EXPORT_COLUMNS`]
/// (the `Record` declaration order); quoting is the csv crate's default,
/// which quotes only fields containing delimiters, quotes, or newlines.
pub fn to_csv(set: &ResultSet) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    for record in set {
        wtr.serialize(record)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| std::io::Error::other(e.to_string()).into())
}

/// Parse a CSV export back into records. Used by tests to verify the
/// round-trip property and by anyone re-importing a download.
pub fn from_csv(data: &str) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());

    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Serialize to a plain list: one line per record, DOI when known,
/// otherwise the title. Ends with a trailing newline unless empty.
pub fn to_plain_list(set: &ResultSet) -> String {
    let mut out = String::new();
    for record in set {
        out.push_str(record.plain_line());
        out.push('\n');
    }
    out
}

/// Timestamped download name derived from the search keywords.
fn suggest_filename(keywords: &[String], format: ExportFormat) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let safe_keyword: String = keywords
        .join(" ")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_");

    if safe_keyword.is_empty() {
        format!("paperfetcher_{}.{}", timestamp, format.extension())
    } else {
        format!("paperfetcher_{}_{}.{}", timestamp, safe_keyword, format.extension())
    }
}
