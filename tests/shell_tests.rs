//! Integration tests for the shell's request/render cycle.
//!
//! Everything runs against the scripted stub backend: no network, no
//! external service. These cover the observable contract of the shell,
//! from submission through export.

use paperfetcher_web::backend::{FetchBackend, FetchError, StubBackend};
use paperfetcher_web::export;
use paperfetcher_web::query::{ExportFormat, Query};
use paperfetcher_web::render;
use paperfetcher_web::results::{Record, ResultSet};
use paperfetcher_web::shell::Shell;
use paperfetcher_web::ShellError;
use std::sync::Arc;

fn crispr_query(format: ExportFormat) -> Query {
    Query::handsearch(vec!["1476-4687".to_string()])
        .keywords(vec!["CRISPR".to_string()])
        .format(format)
}

fn sample_records(n: usize) -> ResultSet {
    ResultSet::new(
        (0..n)
            .map(|i| Record {
                title: format!("CRISPR paper {i}"),
                authors: "Doe J".to_string(),
                journal: "Nature".to_string(),
                published_date: "2021-06-15".to_string(),
                doi: format!("10.1038/crispr.{i}"),
                url: format!("https://example.com/{i}"),
                abstract_text: "Genome editing, with \"quotes\" and, commas".to_string(),
            })
            .collect(),
    )
}

fn shell_over(stub: &Arc<StubBackend>, limit: Option<usize>) -> Shell {
    Shell::new(Arc::clone(stub) as Arc<dyn FetchBackend>, limit)
}

/// query="CRISPR", format=CSV, backend returns 3 records:
/// the UI shows 3 rows and the download is a 4-line CSV.
#[tokio::test]
async fn crispr_csv_scenario() {
    let stub = Arc::new(StubBackend::new());
    stub.push_records(sample_records(3));
    let shell = shell_over(&stub, None);

    let outcome = shell
        .submit(crispr_query(ExportFormat::Csv))
        .await
        .expect("submission succeeds");

    assert_eq!(outcome.results.len(), 3);

    let table = render::results_table(&outcome.results);
    assert_eq!(table.matches("<tr>").count(), 4); // header + 3 rows

    let artifact = outcome.export().expect("export succeeds");
    assert_eq!(artifact.mime, "text/csv; charset=utf-8");
    assert_eq!(artifact.body.trim_end().lines().count(), 4); // header + 3 rows
}

/// An empty query yields InvalidQuery and the backend records no call.
#[tokio::test]
async fn empty_query_never_calls_backend() {
    for format in [ExportFormat::Csv, ExportFormat::PlainList] {
        let stub = Arc::new(StubBackend::new());
        let shell = shell_over(&stub, Some(1000));

        let query = Query::handsearch(vec!["1476-4687".to_string()]).format(format);
        let err = shell.submit(query).await.expect_err("must reject");

        assert!(matches!(err, ShellError::InvalidQuery(_)));
        assert!(!err.user_message().is_empty());
        assert_eq!(stub.fetch_calls(), 0);
        assert_eq!(stub.dry_run_calls(), 0);
    }
}

/// N records in means exactly N rows rendered, for a range of N.
#[tokio::test]
async fn row_count_matches_backend_count() {
    for n in [1, 2, 10, 57] {
        let stub = Arc::new(StubBackend::new());
        stub.push_records(sample_records(n));
        let shell = shell_over(&stub, None);

        let outcome = shell
            .submit(crispr_query(ExportFormat::Csv))
            .await
            .expect("submission succeeds");

        assert_eq!(outcome.results.len(), n);
        assert_eq!(
            render::results_table(&outcome.results).matches("<tr>").count(),
            n + 1
        );
    }
}

/// The exported CSV parses back to the exact field values the backend
/// returned, including fields with commas, quotes, and newlines.
#[tokio::test]
async fn csv_export_round_trips() {
    let stub = Arc::new(StubBackend::new());
    let mut records = sample_records(2).records().to_vec();
    records[1].abstract_text = "multi\nline, \"tricky\" abstract".to_string();
    stub.push_records(ResultSet::new(records.clone()));
    let shell = shell_over(&stub, None);

    let outcome = shell
        .submit(crispr_query(ExportFormat::Csv))
        .await
        .expect("submission succeeds");
    let artifact = outcome.export().expect("export succeeds");

    let parsed = export::from_csv(&artifact.body).expect("CSV parses back");
    assert_eq!(parsed, records);
}

/// Plain-list export: one line per record, DOI preferred.
#[tokio::test]
async fn plain_list_export() {
    let stub = Arc::new(StubBackend::new());
    stub.push_records(sample_records(3));
    let shell = shell_over(&stub, None);

    let outcome = shell
        .submit(crispr_query(ExportFormat::PlainList))
        .await
        .expect("submission succeeds");
    let artifact = outcome.export().expect("export succeeds");

    assert_eq!(artifact.mime, "text/plain; charset=utf-8");
    assert_eq!(
        artifact.body,
        "10.1038/crispr.0\n10.1038/crispr.1\n10.1038/crispr.2\n"
    );
}

/// A backend failure leaves the shell usable: the next submission on the
/// same shell succeeds.
#[tokio::test]
async fn shell_survives_backend_failure() {
    let stub = Arc::new(StubBackend::new());
    stub.push_error(FetchError::Api {
        status: 503,
        message: "database overloaded".to_string(),
    });
    stub.push_records(sample_records(5));
    let shell = shell_over(&stub, None);

    let err = shell
        .submit(crispr_query(ExportFormat::Csv))
        .await
        .expect_err("first submission fails");
    assert!(matches!(err, ShellError::Fetch(_)));
    assert!(err.user_message().contains("database overloaded"));

    let outcome = shell
        .submit(crispr_query(ExportFormat::Csv))
        .await
        .expect("second submission succeeds");
    assert_eq!(outcome.results.len(), 5);
    assert_eq!(stub.fetch_calls(), 2);
}

/// A timeout is surfaced as a message, not a hang or a crash.
#[tokio::test]
async fn timeout_is_a_recoverable_message() {
    let stub = Arc::new(StubBackend::new());
    stub.push_error(FetchError::Timeout(30));
    let shell = shell_over(&stub, None);

    let err = shell
        .submit(crispr_query(ExportFormat::Csv))
        .await
        .expect_err("must fail");
    assert!(err.user_message().contains("30s"));
}

/// Zero records is its own user-visible condition.
#[tokio::test]
async fn empty_result_is_reported() {
    let stub = Arc::new(StubBackend::new());
    stub.push_records(ResultSet::default());
    let shell = shell_over(&stub, None);

    let err = shell
        .submit(crispr_query(ExportFormat::Csv))
        .await
        .expect_err("must fail");
    assert!(matches!(err, ShellError::EmptyResult));
    assert!(err.user_message().contains("no results"));
}

/// The result-limit guard rejects oversized searches before fetching.
#[tokio::test]
async fn result_limit_guard() {
    let stub = Arc::new(StubBackend::new());
    stub.set_dry_run_count(2000);
    let shell = shell_over(&stub, Some(500));

    let err = shell
        .submit(crispr_query(ExportFormat::Csv))
        .await
        .expect_err("must reject");
    assert!(matches!(
        err,
        ShellError::LimitExceeded {
            expected: 2000,
            limit: 500
        }
    ));
    assert_eq!(stub.fetch_calls(), 0);

    // Same shell, smaller search: goes through.
    stub.set_dry_run_count(3);
    stub.push_records(sample_records(3));
    let outcome = shell
        .submit(crispr_query(ExportFormat::Csv))
        .await
        .expect("submission succeeds");
    assert_eq!(outcome.results.len(), 3);
}

/// Snowball submissions flow through the same cycle.
#[tokio::test]
async fn snowball_submission() {
    let stub = Arc::new(StubBackend::new());
    stub.push_records(sample_records(4));
    let shell = shell_over(&stub, None);

    let query = Query::snowball(vec!["10.1038/crispr.0".to_string()], false)
        .format(ExportFormat::PlainList);
    let outcome = shell.submit(query).await.expect("submission succeeds");

    assert_eq!(outcome.results.len(), 4);
    assert!(outcome
        .report
        .contains("Snowball-search (backward reference chasing)"));
}

/// The download link re-encodes the exact query, so the stateless export
/// endpoint can re-run it.
#[tokio::test]
async fn download_href_round_trips_the_query() {
    let stub = Arc::new(StubBackend::new());
    stub.push_records(sample_records(1));
    let shell = shell_over(&stub, None);

    let outcome = shell
        .submit(crispr_query(ExportFormat::PlainList))
        .await
        .expect("submission succeeds");

    let href = render::download_href(&outcome.query);
    let encoded = href.strip_prefix("/export?q=").expect("export link shape");
    let decoded = urlencoding::decode(encoded).expect("decodes");
    let reparsed: Query = serde_json::from_str(&decoded).expect("query parses back");

    assert_eq!(reparsed.kind, outcome.query.kind);
    assert_eq!(reparsed.keywords, outcome.query.keywords);
    assert_eq!(reparsed.format, ExportFormat::PlainList);
}
