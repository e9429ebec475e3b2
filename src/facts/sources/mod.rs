// src/facts/sources/mod.rs
pub mod anaconda_api;
pub mod badge;
pub mod recipe_docs;

use std::sync::Arc;

use crate::config::{BiocondaConfig, SourceSpec};
use crate::facts::FactSource;
use crate::fetch::{encode_component, HttpFetch};

pub use anaconda_api::AnacondaApiSource;
pub use badge::{BadgeDownloadsSource, BadgeVersionSource};
pub use recipe_docs::RecipeDocsSource;

/// The fact tiers a configuration may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactSourceKind {
    AnacondaApi,
    BadgeDownloads,
    BadgeVersion,
    RecipeDocs,
}

impl FactSourceKind {
    /// Default priority: most structured first, easiest to misparse last.
    pub const DEFAULT_ORDER: [FactSourceKind; 4] = [
        FactSourceKind::AnacondaApi,
        FactSourceKind::BadgeDownloads,
        FactSourceKind::BadgeVersion,
        FactSourceKind::RecipeDocs,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "api" | "anaconda_api" => Some(Self::AnacondaApi),
            "badge_downloads" | "downloads_badge" => Some(Self::BadgeDownloads),
            "badge_version" | "version_badge" => Some(Self::BadgeVersion),
            "docs" | "recipe_docs" | "readme" => Some(Self::RecipeDocs),
            _ => None,
        }
    }

    pub fn default_template(self) -> &'static str {
        match self {
            Self::AnacondaApi => "https://api.anaconda.org/package/{channel}/{package}",
            Self::BadgeDownloads => "https://anaconda.org/{channel}/{package}/badges/downloads.svg",
            Self::BadgeVersion => "https://anaconda.org/{channel}/{package}/badges/version.svg",
            Self::RecipeDocs => "https://bioconda.github.io/recipes/{package}/README.html",
        }
    }
}

/// Where one source fetches from: a template with `{channel}` and
/// `{package}` placeholders.
#[derive(Debug, Clone)]
pub struct SourceUrl {
    template: String,
    channel: String,
}

impl SourceUrl {
    pub fn new(template: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            channel: channel.into(),
        }
    }

    pub fn for_package(&self, package: &str) -> String {
        self.template
            .replace("{channel}", &encode_component(&self.channel))
            .replace("{package}", &encode_component(package))
    }
}

/// Build the ordered source chain for the Bioconda family. Overrides
/// replace the default order; unknown names are skipped.
pub fn build_sources(fetcher: Arc<dyn HttpFetch>, cfg: &BiocondaConfig) -> Vec<Box<dyn FactSource>> {
    let specs: Vec<(FactSourceKind, Option<String>)> = match &cfg.source_list_overrides {
        Some(list) => list
            .iter()
            .filter_map(|SourceSpec { source, url_template }| {
                match FactSourceKind::from_name(source) {
                    Some(kind) => Some((kind, url_template.clone())),
                    None => {
                        tracing::warn!(target: "config", source = %source, "unknown fact source skipped");
                        None
                    }
                }
            })
            .collect(),
        None => FactSourceKind::DEFAULT_ORDER
            .iter()
            .map(|k| (*k, None))
            .collect(),
    };

    specs
        .into_iter()
        .map(|(kind, template)| {
            let url = SourceUrl::new(
                template.unwrap_or_else(|| kind.default_template().to_string()),
                cfg.channel.clone(),
            );
            let fetcher = fetcher.clone();
            let source: Box<dyn FactSource> = match kind {
                FactSourceKind::AnacondaApi => Box::new(AnacondaApiSource::new(fetcher, url)),
                FactSourceKind::BadgeDownloads => Box::new(BadgeDownloadsSource::new(fetcher, url)),
                FactSourceKind::BadgeVersion => Box::new(BadgeVersionSource::new(fetcher, url)),
                FactSourceKind::RecipeDocs => Box::new(RecipeDocsSource::new(fetcher, url)),
            };
            source
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_url_expands_and_encodes() {
        let u = SourceUrl::new(FactSourceKind::AnacondaApi.default_template(), "bioconda");
        assert_eq!(
            u.for_package("r base"),
            "https://api.anaconda.org/package/bioconda/r%20base"
        );
    }

    #[test]
    fn names_map_to_kinds() {
        assert_eq!(FactSourceKind::from_name(" API "), Some(FactSourceKind::AnacondaApi));
        assert_eq!(FactSourceKind::from_name("readme"), Some(FactSourceKind::RecipeDocs));
        assert_eq!(FactSourceKind::from_name("pypi"), None);
    }
}
