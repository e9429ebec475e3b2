// src/facts/sources/badge.rs
//! Tier 2: rendered SVG badges. The only payload is the label text, so each
//! badge fills exactly one field.

use std::sync::Arc;

use async_trait::async_trait;

use super::SourceUrl;
use crate::facts::extract::{badge_count, badge_version};
use crate::facts::{Enrichment, FactRecord, FactSource};
use crate::fetch::{fetch_text, HttpFetch};

async fn fetch_badge(
    fetcher: &dyn HttpFetch,
    url: &SourceUrl,
    package: &str,
    source: &'static str,
) -> Option<String> {
    match fetch_text(fetcher, &url.for_package(package)).await {
        Ok(svg) => Some(svg),
        Err(e) => {
            tracing::warn!(target: "facts", error = ?e, package, source, "badge fetch failed");
            None
        }
    }
}

/// Download count from `downloads.svg`; skipped once a count is known.
pub struct BadgeDownloadsSource {
    fetcher: Arc<dyn HttpFetch>,
    url: SourceUrl,
}

impl BadgeDownloadsSource {
    pub fn new(fetcher: Arc<dyn HttpFetch>, url: SourceUrl) -> Self {
        Self { fetcher, url }
    }
}

#[async_trait]
impl FactSource for BadgeDownloadsSource {
    async fn attempt(&self, package: &str, known: &FactRecord) -> Enrichment {
        if known.download_count.is_some() {
            return Enrichment::Empty;
        }
        let Some(svg) = fetch_badge(self.fetcher.as_ref(), &self.url, package, self.name()).await
        else {
            return Enrichment::Empty;
        };
        let count = badge_count(&svg);
        if count.is_none() {
            tracing::debug!(target: "facts", package, "no count in downloads badge");
        }
        Enrichment::from(FactRecord {
            download_count: count,
            ..FactRecord::default()
        })
    }

    fn name(&self) -> &'static str {
        "badge_downloads"
    }
}

/// Latest version from `version.svg`; skipped once a version is known.
pub struct BadgeVersionSource {
    fetcher: Arc<dyn HttpFetch>,
    url: SourceUrl,
}

impl BadgeVersionSource {
    pub fn new(fetcher: Arc<dyn HttpFetch>, url: SourceUrl) -> Self {
        Self { fetcher, url }
    }
}

#[async_trait]
impl FactSource for BadgeVersionSource {
    async fn attempt(&self, package: &str, known: &FactRecord) -> Enrichment {
        if known.latest_version.is_some() {
            return Enrichment::Empty;
        }
        let Some(svg) = fetch_badge(self.fetcher.as_ref(), &self.url, package, self.name()).await
        else {
            return Enrichment::Empty;
        };
        Enrichment::from(FactRecord {
            latest_version: badge_version(&svg),
            ..FactRecord::default()
        })
    }

    fn name(&self) -> &'static str {
        "badge_version"
    }
}
