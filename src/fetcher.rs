use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::utils::error::{AppError, Result};

/// Shared HTTP client for all site checkers.
///
/// One client per process: connection pooling across the per-product
/// detail-page probes matters more than isolation here.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch a page with a cache-busting timestamp parameter appended,
    /// so storefront CDNs cannot serve a stale listing grid.
    pub async fn get_html(&self, url: &str) -> Result<String> {
        self.get_text(&with_cache_buster(url)).await
    }

    /// Fetch a page as-is (used for product detail probes where the URL
    /// already carries its own parameters or none are wanted).
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("status {} for {}", status.as_u16(), url)));
        }
        Ok(response.text().await?)
    }

    /// Fetch and deserialize a JSON endpoint, cache-busted like get_html.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(&with_cache_buster(url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("status {} for {}", status.as_u16(), url)));
        }
        Ok(response.json::<T>().await?)
    }
}

fn with_cache_buster(url: &str) -> String {
    let ts = Utc::now().timestamp();
    if url.contains('?') {
        format!("{url}&t={ts}")
    } else {
        format!("{url}?t={ts}")
    }
}
