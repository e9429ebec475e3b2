// src/facts/sources/recipe_docs.rs
use std::sync::Arc;

use async_trait::async_trait;

use super::SourceUrl;
use crate::facts::extract::{docs_summary, docs_version};
use crate::facts::{Enrichment, FactRecord, FactSource};
use crate::fetch::{fetch_text, HttpFetch};

/// Tier 3: the recipe README page. Version from the first version-only
/// `<code>` span, summary from the first paragraph of the main region.
pub struct RecipeDocsSource {
    fetcher: Arc<dyn HttpFetch>,
    url: SourceUrl,
}

impl RecipeDocsSource {
    pub fn new(fetcher: Arc<dyn HttpFetch>, url: SourceUrl) -> Self {
        Self { fetcher, url }
    }
}

#[async_trait]
impl FactSource for RecipeDocsSource {
    async fn attempt(&self, package: &str, known: &FactRecord) -> Enrichment {
        if known.latest_version.is_some() && known.summary.is_some() {
            return Enrichment::Empty;
        }
        let html = match fetch_text(self.fetcher.as_ref(), &self.url.for_package(package)).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(target: "facts", error = ?e, package, source = self.name(), "source failed");
                return Enrichment::Empty;
            }
        };
        Enrichment::from(FactRecord {
            latest_version: known
                .latest_version
                .is_none()
                .then(|| docs_version(&html))
                .flatten(),
            summary: known.summary.is_none().then(|| docs_summary(&html)).flatten(),
            download_count: None,
        })
    }

    fn name(&self) -> &'static str {
        "recipe_docs"
    }
}
