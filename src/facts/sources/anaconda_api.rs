// src/facts/sources/anaconda_api.rs
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::SourceUrl;
use crate::facts::{Enrichment, FactRecord, FactSource};
use crate::fetch::{fetch_json, HttpFetch};

#[derive(Debug, Deserialize)]
struct PackageInfo {
    #[serde(default)]
    latest_version: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    ndownloads: Option<Value>,
    #[serde(default)]
    files: Option<Vec<FileInfo>>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    #[serde(default)]
    ndownloads: Option<Value>,
}

fn as_count(v: &Value) -> Option<u64> {
    v.as_u64().or_else(|| {
        v.as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f.round() as u64)
    })
}

impl PackageInfo {
    /// Aggregate count if present, otherwise the per-file sum.
    fn download_count(&self) -> Option<u64> {
        if let Some(n) = self.ndownloads.as_ref().and_then(as_count) {
            return Some(n);
        }
        self.files.as_ref().map(|files| {
            files
                .iter()
                .filter_map(|f| f.ndownloads.as_ref().and_then(as_count))
                .sum()
        })
    }
}

/// Tier 1: the Anaconda package JSON API.
pub struct AnacondaApiSource {
    fetcher: Arc<dyn HttpFetch>,
    url: SourceUrl,
}

impl AnacondaApiSource {
    pub fn new(fetcher: Arc<dyn HttpFetch>, url: SourceUrl) -> Self {
        Self { fetcher, url }
    }

    async fn fetch(&self, package: &str) -> Result<FactRecord> {
        let info: PackageInfo =
            fetch_json(self.fetcher.as_ref(), &self.url.for_package(package)).await?;
        Ok(FactRecord {
            download_count: info.download_count(),
            latest_version: info.latest_version,
            summary: info.summary,
        })
    }
}

#[async_trait]
impl FactSource for AnacondaApiSource {
    async fn attempt(&self, package: &str, _known: &FactRecord) -> Enrichment {
        match self.fetch(package).await {
            Ok(rec) => Enrichment::from(rec),
            Err(e) => {
                tracing::warn!(target: "facts", error = ?e, package, source = self.name(), "source failed");
                Enrichment::Empty
            }
        }
    }

    fn name(&self) -> &'static str {
        "anaconda_api"
    }
}
