//! Rendering.
//!
//! HTML pages for the web UI and a terminal table for the CLI. Rendering
//! only reads the result set; truncation of long abstracts is a display
//! concern and never touches the exported data.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::journals::JournalEntry;
use crate::query::Query;
use crate::results::ResultSet;
use crate::shell::SearchOutcome;

/// Longest abstract shown in a table cell before truncation.
const ABSTRACT_DISPLAY_LIMIT: usize = 200;

/// Escape text for HTML output.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn truncate_display(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{cut}…")
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2rem auto; max-width: 70rem; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 0.4rem; text-align: left; vertical-align: top; }}\n\
         .error {{ background: #fdd; border: 1px solid #c00; padding: 0.8rem; }}\n\
         pre {{ background: #f4f4f4; padding: 0.8rem; overflow-x: auto; }}\n\
         label {{ display: block; margin-top: 0.8rem; }}\n\
         </style>\n</head>\n<body>\n\
         <h1>Paperfetcher</h1>\n\
         <p>Automate handsearch for your systematic review.</p>\n\
         {body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

/// The search form, with an optional error banner from the last submission.
pub fn index_page(journals: &[JournalEntry], error: Option<&str>) -> String {
    let banner = error
        .map(|msg| format!("<div class=\"error\">{}</div>\n", escape(msg)))
        .unwrap_or_default();

    let options: String = journals
        .iter()
        .map(|j| format!("<option value=\"{}\">{}</option>\n", escape(&j.issn), escape(&j.label())))
        .collect();

    let body = format!(
        "{banner}\
         <form method=\"post\" action=\"/search\">\n\
         <h2>1. What type of search do you want to perform?</h2>\n\
         <label><input type=\"radio\" name=\"kind\" value=\"handsearch\" checked> Handsearch</label>\n\
         <label><input type=\"radio\" name=\"kind\" value=\"snowball-backward\"> Snowball-search (backward reference chasing)</label>\n\
         <label><input type=\"radio\" name=\"kind\" value=\"snowball-forward\"> Snowball-search (forward citation chasing)</label>\n\
         <h2>2. Define your search parameters.</h2>\n\
         <label>Journal ISSNs (comma-separated, handsearch)\n\
         <input name=\"issns\" list=\"journal-list\" size=\"60\"></label>\n\
         <datalist id=\"journal-list\">\n{options}</datalist>\n\
         <label>Seed DOIs (comma-separated, snowball-search)\n\
         <input name=\"dois\" size=\"60\"></label>\n\
         <label>Keywords (comma-separated)\n\
         <input name=\"keywords\" size=\"60\"></label>\n\
         <label>Fetch from this date onwards <input type=\"date\" name=\"from_date\"></label>\n\
         <label>Fetch until this date <input type=\"date\" name=\"until_date\"></label>\n\
         <h2>3. Select output format.</h2>\n\
         <label><input type=\"radio\" name=\"format\" value=\"csv\" checked> CSV (.csv)</label>\n\
         <label><input type=\"radio\" name=\"format\" value=\"plain-list\"> Plain list of DOIs (.txt)</label>\n\
         <p><button type=\"submit\">Search</button></p>\n\
         </form>"
    );

    page("Paperfetcher", &body)
}

/// HTML table for a result set.
pub fn results_table(set: &ResultSet) -> String {
    let mut html = String::from(
        "<table>\n<tr><th>Title</th><th>Authors</th><th>Journal</th>\
         <th>Date</th><th>DOI</th><th>Abstract</th></tr>\n",
    );

    for record in set {
        let title_cell = if record.url.is_empty() {
            escape(&record.title)
        } else {
            format!(
                "<a href=\"{}\">{}</a>",
                escape(&record.url),
                escape(&record.title)
            )
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            title_cell,
            escape(&record.authors),
            escape(&record.journal),
            escape(&record.published_date),
            escape(&record.doi),
            escape(&truncate_display(&record.abstract_text, ABSTRACT_DISPLAY_LIMIT)),
        ));
    }

    html.push_str("</table>\n");
    html
}

/// Full results page: table, report, download link.
pub fn results_page(outcome: &SearchOutcome) -> String {
    let body = format!(
        "<p><a href=\"/\">&larr; New search</a></p>\n\
         <h2>Results ({count})</h2>\n\
         {table}\
         <p><a href=\"{href}\" download>Download results (.{ext} file)</a></p>\n\
         <h2>Search report</h2>\n<pre>{report}</pre>",
        count = outcome.results.len(),
        table = results_table(&outcome.results),
        href = escape(&download_href(&outcome.query)),
        ext = outcome.query.format.extension(),
        report = escape(&outcome.report),
    );

    page("Paperfetcher - results", &body)
}

/// Build the `/export` link that re-runs this query for download.
/// The query travels as one URL-encoded JSON parameter; the shell keeps
/// no state between submissions.
pub fn download_href(query: &Query) -> String {
    let json = serde_json::to_string(query).unwrap_or_default();
    format!("/export?q={}", urlencoding::encode(&json))
}

/// Terminal table for the CLI `search` command.
pub fn text_table(set: &ResultSet) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Title", "Authors", "Journal", "Date", "DOI"]);

    for record in set {
        table.add_row(vec![
            truncate_display(&record.title, 60),
            truncate_display(&record.authors, 40),
            truncate_display(&record.journal, 30),
            record.published_date.clone(),
            record.doi.clone(),
        ]);
    }

    table.to_string()
}
