//! Backend aggregator client.
//!
//! [`SearchBackend`] is the seam between the controller and the network.
//! [`HttpBackend`] implements it over `reqwest` against the aggregator's
//! REST contract:
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `GET`  | `/api/search?q=<query>&page=<n>` | search page |
//! | `GET`  | `/api/details/<source>/<id>` | one result record |
//! | `GET`  | `/api/collections` | `[{ id, title }]` |
//! | `POST` | `/add_to_collection/<id>` | `{ message }` |
//!
//! Requests are never retried; the caller decides how to surface failures.

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::FetchError;
use crate::models::{
    AddToCollectionRequest, Collection, MessageResponse, ResultItem, SearchPage, SearchResponse,
    SourceId,
};

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetch one page of aggregated results.
    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, FetchError>;

    /// Fetch the full record of a single item.
    async fn details(&self, source: SourceId, id: &str) -> Result<ResultItem, FetchError>;

    async fn collections(&self) -> Result<Vec<Collection>, FetchError>;

    /// Add an item to a collection, returning the backend's message.
    async fn add_to_collection(
        &self,
        collection_id: &str,
        request: &AddToCollectionRequest,
    ) -> Result<String, FetchError>;
}

/// [`SearchBackend`] over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("backend.base_url cannot be a base URL: {}", config.base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("hsearch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout(),
        })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            e.into()
        }
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, FetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        debug!(%url, ?query, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.read_json(response).await
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, FetchError> {
        let url = self.endpoint(&["api", "search"]);
        let response: SearchResponse = self
            .get_json(url, &[("q", query.to_string()), ("page", page.to_string())])
            .await?;

        let page = SearchPage::from_response(response, page).map_err(FetchError::Malformed)?;
        for err in &page.upstream_errors {
            warn!(upstream_error = %err, "backend reported a failing source");
        }
        Ok(page)
    }

    async fn details(&self, source: SourceId, id: &str) -> Result<ResultItem, FetchError> {
        let url = self.endpoint(&["api", "details", source.as_str(), id]);
        let value: Value = self.get_json(url, &[]).await?;
        ResultItem::from_value(source, value)
            .ok_or_else(|| FetchError::Malformed("detail record is not an object".to_string()))
    }

    async fn collections(&self) -> Result<Vec<Collection>, FetchError> {
        let url = self.endpoint(&["api", "collections"]);
        self.get_json(url, &[]).await
    }

    async fn add_to_collection(
        &self,
        collection_id: &str,
        request: &AddToCollectionRequest,
    ) -> Result<String, FetchError> {
        let url = self.endpoint(&["add_to_collection", collection_id]);
        debug!(%url, source = %request.source, "POST");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let body: MessageResponse = self.read_json(response).await?;
        Ok(body.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(&BackendConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn endpoint_appends_segments() {
        let b = backend("http://localhost:5000");
        assert_eq!(
            b.endpoint(&["api", "search"]).as_str(),
            "http://localhost:5000/api/search"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let b = backend("http://localhost:5000/heritage/");
        assert_eq!(
            b.endpoint(&["api", "collections"]).as_str(),
            "http://localhost:5000/heritage/api/collections"
        );
    }

    #[test]
    fn endpoint_encodes_identifiers() {
        let b = backend("http://localhost:5000");
        let url = b.endpoint(&["api", "details", "internet_archive", "a b/c"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/details/internet_archive/a%20b%2Fc"
        );
    }
}
