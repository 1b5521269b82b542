// src/scraping/fetcher.rs
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::{error, warn};

use crate::config::AppConfig;

/// Blocking-style page retrieval: one request at a time, a fixed number of
/// attempts with a fixed pause in between.
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .default_headers(header_map(config)?)
            .timeout(Duration::from_secs(config.request_timeout_secs));

        if let Some(proxies) = &config.proxies {
            for (scheme, url) in proxies {
                let proxy = match scheme.to_lowercase().as_str() {
                    "http" => Proxy::http(url),
                    "https" => Proxy::https(url),
                    "all" => Proxy::all(url),
                    other => {
                        warn!("Ignoring proxy for unsupported scheme: {}", other);
                        continue;
                    }
                }
                .with_context(|| format!("Invalid proxy URL for {}: {}", scheme, url))?;
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        })
    }

    /// Page body, or `None` once every attempt has failed
    pub async fn fetch(&self, url: &str) -> Option<String> {
        for attempt in 1..=self.max_retries {
            match self.try_fetch(url).await {
                Ok(body) => return Some(body),
                Err(e) => {
                    warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt, self.max_retries, url, e
                    );
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        error!(
            "Failed to retrieve {} after {} attempts.",
            url, self.max_retries
        );
        None
    }

    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

fn header_map(config: &AppConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name: {}", name))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", name))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
