//! Search report generation.
//!
//! Every successful submission yields a plain-text report the user can
//! copy into the methods section of a systematic review: what was
//! searched, when, with which parameters, and how many records came back.

use chrono::{Local, NaiveDate};

use crate::query::{Query, SearchKind};

/// Build the report text for a completed submission.
pub fn build(query: &Query, record_count: usize) -> String {
    build_for_date(query, record_count, Local::now().date_naive())
}

// Split out so tests can pin the date.
fn build_for_date(query: &Query, record_count: usize, date: NaiveDate) -> String {
    let sources_label = match query.kind {
        SearchKind::Handsearch => "Journals/ISSNs searched",
        _ => "Seed DOIs",
    };

    let sources = query
        .sources
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n");

    let keywords = if query.keywords.is_empty() {
        "None".to_string()
    } else {
        query.keywords.join(",")
    };

    let date_range = match (query.from_date, query.until_date) {
        (Some(from), Some(until)) => format!("Between: {from} and {until}.\n\n"),
        (Some(from), None) => format!("From: {from} onwards.\n\n"),
        (None, Some(until)) => format!("Until: {until}.\n\n"),
        (None, None) => String::new(),
    };

    format!(
        "Search performed on {date} using paperfetcher-web v{version}.\n\n\
         Search type: {kind}\n\n\
         {sources_label}:\n{sources}\n\n\
         {date_range}\
         Keywords: {keywords}\n\n\
         Fetched record count: {record_count}",
        date = date.format("%B %d, %Y"),
        version = env!("CARGO_PKG_VERSION"),
        kind = query.kind.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
    }

    #[test]
    fn test_handsearch_report() {
        let query = Query::handsearch(vec!["1234-5678".to_string(), "0028-083X".to_string()])
            .keywords(vec!["CRISPR".to_string(), "cas9".to_string()])
            .date_range(Some(date("2018-01-01")), Some(date("2022-12-31")));

        let report = build_for_date(&query, 3, date("2022-03-01"));

        assert!(report.starts_with("Search performed on March 01, 2022"));
        assert!(report.contains("Search type: Handsearch"));
        assert!(report.contains("- 1234-5678"));
        assert!(report.contains("- 0028-083X"));
        assert!(report.contains("Between: 2018-01-01 and 2022-12-31."));
        assert!(report.contains("Keywords: CRISPR,cas9"));
        assert!(report.ends_with("Fetched record count: 3"));
    }

    #[test]
    fn test_snowball_report_without_dates_or_keywords() {
        let query = Query::snowball(vec!["10.1038/test.1".to_string()], true);
        let report = build_for_date(&query, 12, date("2022-03-01"));

        assert!(report.contains("Search type: Snowball-search (forward citation chasing)"));
        assert!(report.contains("Seed DOIs:\n- 10.1038/test.1"));
        assert!(report.contains("Keywords: None"));
        assert!(!report.contains("Between:"));
    }
}
