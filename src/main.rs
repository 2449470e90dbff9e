//! paperfetcher-web - Web front-end for paperfetcher
//!
//! Collects search parameters, forwards them to an external fetch
//! backend, and renders the results with a download action.
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! paperfetcher-web search "CRISPR" --issn 1476-4687 --format csv
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! paperfetcher-web serve --port 3000
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::{Form, Query as UrlQuery, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use paperfetcher_web::{
    backend::FetchBackend,
    config::Settings,
    journals::{self, JournalEntry},
    query::{self, ExportFormat, Query, SearchKind},
    remote::RemoteBackend,
    render,
    results::Record,
    shell::Shell,
    ShellError,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Web front-end for paperfetcher
#[derive(Parser)]
#[command(name = "paperfetcher-web")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search submission and write the export file
    Search {
        /// Comma-separated search keywords
        keywords: Option<String>,

        /// Search kind
        #[arg(long, default_value = "handsearch",
              value_parser = ["handsearch", "snowball-backward", "snowball-forward"])]
        kind: String,

        /// Journal ISSN to search in (repeatable, handsearch)
        #[arg(long)]
        issn: Vec<String>,

        /// Seed DOI to start from (repeatable, snowball-search)
        #[arg(long)]
        doi: Vec<String>,

        /// Fetch from this date onwards (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Fetch until this date (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,

        /// Export format
        #[arg(long, default_value = "csv", value_parser = ["csv", "plain-list"])]
        format: String,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Fetch backend base URL (overrides PAPERFETCHER_BACKEND_URL)
        #[arg(long)]
        backend_url: Option<String>,

        /// Backend call timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Reject searches expected to exceed this many records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Local Crossref title-list CSV for the journal picker
        #[arg(long)]
        journals_csv: Option<PathBuf>,

        /// Fetch backend base URL (overrides PAPERFETCHER_BACKEND_URL)
        #[arg(long)]
        backend_url: Option<String>,

        /// Backend call timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Reject searches expected to exceed this many records
        #[arg(long)]
        limit: Option<usize>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Search {
            keywords,
            kind,
            issn,
            doi,
            from,
            until,
            format,
            output,
            backend_url,
            timeout,
            limit,
        } => {
            run_search(
                keywords,
                kind,
                issn,
                doi,
                from,
                until,
                format,
                output,
                backend_url,
                timeout,
                limit,
            )
            .await
        }
        Commands::Serve {
            port,
            host,
            journals_csv,
            backend_url,
            timeout,
            limit,
        } => run_server(host, port, journals_csv, backend_url, timeout, limit).await,
    }
}

fn build_shell(settings: &Settings) -> Result<Shell> {
    let backend = RemoteBackend::new(&settings.backend_url, settings.timeout_secs)
        .with_context(|| format!("Cannot reach backend at {}", settings.backend_url))?;
    Ok(Shell::new(
        Arc::new(backend) as Arc<dyn FetchBackend>,
        settings.result_limit,
    ))
}

fn parse_date(label: &str, value: Option<String>) -> Result<Option<NaiveDate>, ShellError> {
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ShellError::InvalidQuery(format!("{label} '{raw}' is not a YYYY-MM-DD date"))
            }),
    }
}

fn parse_kind(kind: &str) -> Result<SearchKind, ShellError> {
    match kind {
        "handsearch" => Ok(SearchKind::Handsearch),
        "snowball-backward" => Ok(SearchKind::SnowballBackward),
        "snowball-forward" => Ok(SearchKind::SnowballForward),
        other => Err(ShellError::InvalidQuery(format!(
            "unknown search kind '{other}'"
        ))),
    }
}

fn parse_format(format: &str) -> Result<ExportFormat, ShellError> {
    match format {
        "csv" => Ok(ExportFormat::Csv),
        "plain-list" => Ok(ExportFormat::PlainList),
        other => Err(ShellError::InvalidQuery(format!(
            "unknown export format '{other}' (expected csv or plain-list)"
        ))),
    }
}

// ============================================================================
// One-shot CLI Search
// ============================================================================

#[allow(clippy::too_many_arguments)]
async fn run_search(
    keywords: Option<String>,
    kind: String,
    issn: Vec<String>,
    doi: Vec<String>,
    from: Option<String>,
    until: Option<String>,
    format: String,
    output_dir: PathBuf,
    backend_url: Option<String>,
    timeout: Option<u64>,
    limit: Option<usize>,
) -> Result<()> {
    let settings = Settings::from_env()?.with_overrides(backend_url, timeout, limit);
    let shell = build_shell(&settings)?;

    let kind = parse_kind(&kind)?;
    let sources = match kind {
        SearchKind::Handsearch => issn,
        _ => doi,
    };

    let query = Query {
        kind,
        keywords: keywords
            .as_deref()
            .map(query::split_comma_list)
            .unwrap_or_default(),
        sources,
        from_date: parse_date("--from", from)?,
        until_date: parse_date("--until", until)?,
        format: parse_format(&format)?,
    };

    let outcome = match shell.submit(query).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // Recoverable by design: report and exit non-zero without a backtrace.
            error!(error = %e, "Search failed");
            anyhow::bail!("{}", e.user_message());
        }
    };

    println!("{}", render::text_table(&outcome.results));
    println!("\n{}\n", outcome.report);

    let artifact = outcome.export()?;
    std::fs::create_dir_all(&output_dir).context("Failed to create output directory")?;
    let path = output_dir.join(&artifact.filename);
    std::fs::write(&path, &artifact.body).context("Failed to write export file")?;
    println!("Saved: {}", path.display());

    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

struct AppState {
    shell: Shell,
    journals: Vec<JournalEntry>,
}

async fn run_server(
    host: String,
    port: u16,
    journals_csv: Option<PathBuf>,
    backend_url: Option<String>,
    timeout: Option<u64>,
    limit: Option<usize>,
) -> Result<()> {
    let settings = Settings::from_env()?.with_overrides(backend_url, timeout, limit);
    let shell = build_shell(&settings)?;

    let journals = match journals_csv {
        Some(path) => journals::load_journal_csv(&path)
            .with_context(|| format!("Failed to load journal list from {}", path.display()))?,
        None => Vec::new(),
    };

    info!(host = %host, port = port, backend = %settings.backend_url, "Starting HTTP server");

    let app_state = Arc::new(AppState { shell, journals });

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/search", post(search_form_handler))
        .route("/export", get(export_handler))
        .route("/api/search", post(api_search_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Search form page
async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render::index_page(&state.journals, None))
}

/// Fields posted by the search form. Everything arrives as text; parsing
/// failures become an InvalidQuery banner, never a 500.
#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    keywords: String,
    #[serde(default)]
    issns: String,
    #[serde(default)]
    dois: String,
    #[serde(default)]
    from_date: String,
    #[serde(default)]
    until_date: String,
    #[serde(default)]
    format: String,
}

fn query_from_form(form: SearchForm) -> Result<Query, ShellError> {
    let kind = parse_kind(&form.kind)?;
    let sources = match kind {
        SearchKind::Handsearch => query::split_comma_list(&form.issns),
        _ => query::split_comma_list(&form.dois),
    };
    let format = if form.format.is_empty() {
        ExportFormat::default()
    } else {
        parse_format(&form.format)?
    };

    Ok(Query {
        kind,
        keywords: query::split_comma_list(&form.keywords),
        sources,
        from_date: parse_date("from date", non_empty(form.from_date))?,
        until_date: parse_date("until date", non_empty(form.until_date))?,
        format,
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Form submission: one full request/render cycle, HTML in and out.
async fn search_form_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Html<String> {
    let query = match query_from_form(form) {
        Ok(query) => query,
        Err(e) => return Html(render::index_page(&state.journals, Some(&e.user_message()))),
    };

    match state.shell.submit(query).await {
        Ok(outcome) => Html(render::results_page(&outcome)),
        Err(e) => {
            error!(error = %e, "Search failed");
            Html(render::index_page(&state.journals, Some(&e.user_message())))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExportParams {
    /// URL-encoded JSON query, produced by [`render::download_href`]
    q: String,
}

fn status_for(err: &ShellError) -> StatusCode {
    match err {
        ShellError::InvalidQuery(_) | ShellError::LimitExceeded { .. } => StatusCode::BAD_REQUEST,
        ShellError::EmptyResult => StatusCode::NOT_FOUND,
        ShellError::Fetch(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Download endpoint. The shell keeps no state between submissions, so
/// the export re-runs the query and streams the serialized form back.
async fn export_handler(
    State(state): State<Arc<AppState>>,
    UrlQuery(params): UrlQuery<ExportParams>,
) -> axum::response::Response {
    let query: Query = match serde_json::from_str(&params.q) {
        Ok(query) => query,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("Malformed export request: {e}"),
            )
                .into_response()
        }
    };

    let result = state.shell.submit(query).await.and_then(|o| o.export());
    match result {
        Ok(artifact) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, artifact.mime.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", artifact.filename),
                ),
            ],
            artifact.body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Export failed");
            (status_for(&e), e.user_message()).into_response()
        }
    }
}

/// JSON API response
#[derive(Debug, Serialize)]
struct SearchResponse {
    status: String,
    count: usize,
    rows: Vec<Record>,
    report: String,
    download_url: String,
}

/// JSON search endpoint for programmatic clients
async fn api_search_handler(
    State(state): State<Arc<AppState>>,
    Json(query): Json<Query>,
) -> Json<SearchResponse> {
    match state.shell.submit(query).await {
        Ok(outcome) => Json(SearchResponse {
            status: "success".to_string(),
            count: outcome.results.len(),
            rows: outcome.results.records().to_vec(),
            report: outcome.report.clone(),
            download_url: render::download_href(&outcome.query),
        }),
        Err(e) => {
            error!(error = %e, "Search failed");
            Json(SearchResponse {
                status: format!("error: {}", e.user_message()),
                count: 0,
                rows: vec![],
                report: String::new(),
                download_url: String::new(),
            })
        }
    }
}
