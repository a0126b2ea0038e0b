use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.149 Safari/537.36";

/// One client per process, shared by every poller.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Send a prepared GET and return the body, failing on non-2xx status.
pub async fn text(request: RequestBuilder) -> Result<String> {
    let start = Instant::now();
    let response = request.send().await?.error_for_status()?;
    let url = response.url().to_string();
    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read body from {}", url))?;
    debug!(
        "GET {} -> {} bytes in {}ms",
        url,
        body.len(),
        start.elapsed().as_millis()
    );
    Ok(body)
}

pub async fn json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let body = text(request).await?;
    serde_json::from_str(&body).context("Unexpected JSON in response")
}
