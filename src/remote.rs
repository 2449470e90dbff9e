//! HTTP adapter for an external paperfetcher service.
//!
//! Forwards a [`Query`] as JSON to the configured service and decodes the
//! returned records. One outbound call per `fetch`, with a bounded wait so
//! the shell surfaces a timeout instead of hanging.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::backend::{FetchBackend, FetchError};
use crate::query::Query;
use crate::results::{Record, ResultSet};

/// Default bounded wait for a backend call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent to the backend service.
const USER_AGENT: &str = concat!("paperfetcher-web/", env!("CARGO_PKG_VERSION"));

/// Search response from the paperfetcher service.
#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    records: Vec<Record>,
}

/// Dry-run response from the paperfetcher service.
#[derive(Debug, Deserialize)]
struct DryRunResponse {
    count: usize,
}

/// [`FetchBackend`] implementation over HTTP.
pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl RemoteBackend {
    /// Create a backend for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Fails when the URL cannot be parsed or the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| FetchError::Network(format!("invalid backend URL '{base_url}': {e}")))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| FetchError::Network("backend URL cannot be a base".to_string()))?;
            segments.pop_if_empty().push(path);
        }
        Ok(url)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<T, FetchError> {
        let url = self.endpoint(path)?;
        debug!(url = %url, "Calling fetch backend");

        let response = self
            .client
            .post(url)
            .json(query)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Backend returned error status");
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl FetchBackend for RemoteBackend {
    fn id(&self) -> &str {
        "remote"
    }

    async fn fetch(&self, query: &Query) -> Result<ResultSet, FetchError> {
        let response: FetchResponse = self.post_json("search", query).await?;
        info!(count = response.records.len(), "Backend fetch complete");
        Ok(ResultSet::new(response.records))
    }

    async fn dry_run(&self, query: &Query) -> Result<usize, FetchError> {
        let response: DryRunResponse = self.post_json("dry-run", query).await?;
        debug!(count = response.count, "Backend dry run complete");
        Ok(response.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query {
        Query::handsearch(vec!["1234-5678".to_string()]).keywords(vec!["CRISPR".to_string()])
    }

    #[tokio::test]
    async fn test_fetch_decodes_records() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"records":[
                    {"title":"A","authors":"X","journal":"J","published_date":"2021-01-01",
                     "doi":"10.1/a","url":"https://example.com/a","abstract_text":""},
                    {"title":"B","authors":"Y","journal":"J","published_date":"2021-02-01",
                     "doi":"10.1/b","url":"https://example.com/b","abstract_text":""}
                ]}"#,
            )
            .create_async()
            .await;

        let backend =
            RemoteBackend::new(&server.url(), DEFAULT_TIMEOUT_SECS).expect("backend builds");
        let set = backend.fetch(&query()).await.expect("fetch succeeds");

        mock.assert_async().await;
        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[0].doi, "10.1/a");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/search")
            .with_status(502)
            .with_body("upstream database unreachable")
            .create_async()
            .await;

        let backend =
            RemoteBackend::new(&server.url(), DEFAULT_TIMEOUT_SECS).expect("backend builds");
        let err = backend.fetch(&query()).await.expect_err("must fail");

        match err {
            FetchError::Api { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("unreachable"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_maps_to_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/dry-run")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let backend =
            RemoteBackend::new(&server.url(), DEFAULT_TIMEOUT_SECS).expect("backend builds");
        let err = backend.dry_run(&query()).await.expect_err("must fail");
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(RemoteBackend::new("not a url", 5).is_err());
    }

    #[test]
    fn test_endpoint_joining_handles_trailing_slash() {
        let backend = RemoteBackend::new("http://localhost:8000/", 5).expect("backend builds");
        let url = backend.endpoint("search").expect("endpoint");
        assert_eq!(url.as_str(), "http://localhost:8000/search");
    }
}
