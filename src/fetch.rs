// src/fetch.rs
//! Low-level fetchers: one GET seam shared by every source, plus the
//! JSON/text helpers that turn non-2xx answers into errors.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Raw upstream answer. Status is kept so callers can tell `202 Accepted`
/// apart from real failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anonymous GET. Implementations must not retry on their own.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}

/// Production fetcher backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                "home-trackers/",
                env!("CARGO_PKG_VERSION"),
                " (+static home page widgets)"
            ))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building reqwest client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "*/*")
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        Ok(FetchResponse { status, body })
    }
}

/// GET and decode JSON; non-2xx is an error.
pub async fn fetch_json<T: DeserializeOwned>(fetcher: &dyn HttpFetch, url: &str) -> Result<T> {
    let body = fetch_text(fetcher, url).await?;
    serde_json::from_str(&body).with_context(|| format!("decoding JSON from {url}"))
}

/// GET the raw body; non-2xx is an error.
pub async fn fetch_text(fetcher: &dyn HttpFetch, url: &str) -> Result<String> {
    let resp = fetcher.get(url).await?;
    if !resp.is_success() {
        return Err(anyhow!("{url} -> {}", resp.status));
    }
    Ok(resp.body)
}

/// Percent-encode one path/query component (RFC 3986 unreserved set kept).
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "%{:02X}", b);
        }
    }
    out
}
