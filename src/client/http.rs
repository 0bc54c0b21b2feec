//! HTTP implementation of [`ComicSource`] for the xkcd JSON API

use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::errors::{FetchError, FetchResult};
use super::types::Comic;
use super::ComicSource;
use crate::config::XkcdConfig;
use crate::utils::USER_AGENT;

/// `reqwest`-backed xkcd API client
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct XkcdClient {
    http: Client,
    base_url: String,
}

impl XkcdClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(FetchError::Config("base URL must not be empty".to_string()));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    /// Create a client from the crate configuration
    pub fn from_config(config: &XkcdConfig) -> FetchResult<Self> {
        Self::new(config.base_url(), config.request_timeout())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn latest_url(&self) -> String {
        format!("{}/info.0.json", self.base_url)
    }

    fn comic_url(&self, num: u32) -> String {
        format!("{}/{num}/info.0.json", self.base_url)
    }

    async fn fetch_comic(&self, url: String, num: Option<u32>) -> FetchResult<Comic> {
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND
            && let Some(num) = num
        {
            return Err(FetchError::NotFound(num));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            url: url.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }
}

impl ComicSource for XkcdClient {
    async fn latest(&self) -> FetchResult<Comic> {
        self.fetch_comic(self.latest_url(), None).await
    }

    async fn get(&self, num: u32) -> FetchResult<Comic> {
        let comic = self.fetch_comic(self.comic_url(num), Some(num)).await?;
        tracing::trace!(num = comic.num, title = %comic.title, "fetched comic metadata");
        Ok(comic)
    }
}
