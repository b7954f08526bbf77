///! NASA NeoWs feed client
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use neo_common::DateRange;
use reqwest::Client;

use super::error::FeedFailure;
use super::types::RawFeedResponse;
use crate::config::FeedConfig;

/// Anything that can answer a feed query for a date range.
#[async_trait]
pub trait NeoFeed: Send + Sync {
    async fn fetch_feed(&self, range: &DateRange) -> Result<RawFeedResponse, FeedFailure>;
}

/// HTTP client for `GET {base_url}?start_date=..&end_date=..&api_key=..`
pub struct FeedClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FeedClient {
    pub fn new(config: &FeedConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build().context("Failed to build HTTP client")?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn feed_url(&self, range: &DateRange) -> String {
        format!(
            "{}?start_date={}&end_date={}&api_key={}",
            self.base_url,
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d"),
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl NeoFeed for FeedClient {
    /// One attempt, no retry. Status is checked before the body is read.
    async fn fetch_feed(&self, range: &DateRange) -> Result<RawFeedResponse, FeedFailure> {
        tracing::debug!("Requesting NeoWs feed for {}", range);

        let response = self
            .client
            .get(self.feed_url(range))
            .send()
            .await
            .map_err(FeedFailure::from_transport)?;

        let status = response.status();
        tracing::debug!("NeoWs feed answered {}", status);

        if let Some(failure) = FeedFailure::from_status(status) {
            return Err(failure);
        }

        let body = response.text().await.map_err(FeedFailure::from_transport)?;
        RawFeedResponse::from_body(&body)
    }
}
