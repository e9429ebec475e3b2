// src/dashboard.rs
//! Per-family orchestration: resolve every configured entity concurrently,
//! then build the rows the page renders. Cross-entity normalization runs
//! only once the whole batch has finished.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::activity::repos::{repos_url, DEFAULT_REPOS_TEMPLATE};
use crate::activity::{
    commit_activity_url, list_repos, poll_activity, ActivityOutcome, BackoffPolicy, RepoSummary,
    Sparkline, DEFAULT_COMMIT_ACTIVITY_TEMPLATE,
};
use crate::config::{BiocondaConfig, GitHubConfig, TrackersConfig};
use crate::facts::sources::build_sources;
use crate::facts::{resolve_facts, Facts};
use crate::fetch::{encode_component, HttpFetch};
use crate::format::{compact_count, short_date};

/// Narrowest download bar, so zero-download packages still show one.
pub const MIN_BAR_WIDTH_PCT: u32 = 4;

pub const MSG_NO_REPOS: &str = "No repositories found.";
pub const MSG_REPOS_FAILED: &str = "Failed to load GitHub repos.";
pub const MSG_NO_PACKAGES: &str = "No Bioconda packages configured.";
pub const MSG_ACTIVITY_UNAVAILABLE: &str = "Commit activity unavailable (try later).";

/// What one widget region shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FamilyView<T> {
    Rows { rows: Vec<T> },
    Empty { message: String },
    Failed { message: String },
}

impl<T> FamilyView<T> {
    pub fn rows(&self) -> &[T] {
        match self {
            FamilyView::Rows { rows } => rows,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRow {
    pub package: String,
    pub link: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub downloads: u64,
    pub downloads_display: String,
    pub bar_width_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActivityView {
    Sparkline { sparkline: Sparkline },
    Unavailable { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRow {
    pub name: String,
    pub html_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    pub activity: ActivityView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackersPage {
    pub repos: FamilyView<RepoRow>,
    pub packages: FamilyView<PackageRow>,
}

/// Bar widths in percent of the batch maximum; the maximum is floored at 1.
pub fn bar_widths(counts: &[u64]) -> (u64, Vec<u32>) {
    let max = counts.iter().copied().max().unwrap_or(0).max(1);
    let widths = counts
        .iter()
        .map(|&c| {
            let pct = (c as f64 / max as f64 * 100.0).round() as u32;
            pct.max(MIN_BAR_WIDTH_PCT)
        })
        .collect();
    (max, widths)
}

/// Resolve facts for every configured package, in configuration order.
/// No sources are built and nothing is fetched for an empty list.
pub async fn resolve_packages(
    fetcher: Arc<dyn HttpFetch>,
    cfg: &BiocondaConfig,
) -> Vec<(String, Facts)> {
    if cfg.packages.is_empty() {
        return Vec::new();
    }
    let sources = build_sources(fetcher, cfg);
    let sources = &sources;
    join_all(cfg.packages.iter().map(|pkg| async move {
        let facts = resolve_facts(pkg, sources).await.finalize();
        (pkg.clone(), facts)
    }))
    .await
}

/// Rows for a finished batch.
pub fn package_rows(channel: &str, resolved: Vec<(String, Facts)>) -> Vec<PackageRow> {
    let counts: Vec<u64> = resolved.iter().map(|(_, f)| f.download_count).collect();
    let (_, widths) = bar_widths(&counts);
    resolved
        .into_iter()
        .zip(widths)
        .map(|((package, facts), bar_width_pct)| PackageRow {
            link: format!(
                "https://anaconda.org/{}/{}",
                encode_component(channel),
                encode_component(&package)
            ),
            package,
            version: facts.latest_version,
            summary: (!facts.summary.is_empty()).then_some(facts.summary),
            downloads: facts.download_count,
            downloads_display: compact_count(facts.download_count),
            bar_width_pct,
        })
        .collect()
}

pub async fn package_view(
    fetcher: Arc<dyn HttpFetch>,
    cfg: &BiocondaConfig,
) -> FamilyView<PackageRow> {
    if cfg.packages.is_empty() {
        return FamilyView::Empty {
            message: MSG_NO_PACKAGES.to_string(),
        };
    }
    let resolved = resolve_packages(fetcher, cfg).await;
    tracing::info!(target: "dashboard", packages = resolved.len(), "bioconda batch resolved");
    FamilyView::Rows {
        rows: package_rows(&cfg.channel, resolved),
    }
}

async fn repo_entities(
    fetcher: &dyn HttpFetch,
    cfg: &GitHubConfig,
) -> Result<Vec<RepoSummary>, String> {
    if !cfg.repos.is_empty() {
        return Ok(cfg
            .repos
            .iter()
            .map(|name| RepoSummary {
                name: name.clone(),
                html_url: format!(
                    "https://github.com/{}/{}",
                    encode_component(&cfg.username),
                    encode_component(name)
                ),
                stargazers_count: 0,
                updated_at: None,
            })
            .collect());
    }
    if cfg.username.trim().is_empty() {
        return Ok(Vec::new());
    }
    let template = cfg.template_for("repos").unwrap_or(DEFAULT_REPOS_TEMPLATE);
    let url = repos_url(template, &cfg.username, cfg.repos_per_page);
    list_repos(fetcher, &url).await.map_err(|e| {
        tracing::error!(target: "dashboard", error = ?e, user = %cfg.username, "GitHub repo listing failed");
        MSG_REPOS_FAILED.to_string()
    })
}

pub async fn repo_view(
    fetcher: Arc<dyn HttpFetch>,
    cfg: &GitHubConfig,
    policy: &BackoffPolicy,
) -> FamilyView<RepoRow> {
    let explicit = !cfg.repos.is_empty();
    let repos = match repo_entities(fetcher.as_ref(), cfg).await {
        Ok(repos) if repos.is_empty() => {
            return FamilyView::Empty {
                message: MSG_NO_REPOS.to_string(),
            }
        }
        Ok(repos) => repos,
        Err(message) => return FamilyView::Failed { message },
    };

    let template = cfg
        .template_for("commit_activity")
        .unwrap_or(DEFAULT_COMMIT_ACTIVITY_TEMPLATE);
    let fetcher = fetcher.as_ref();
    let rows = join_all(repos.into_iter().map(|repo| async move {
        let url = commit_activity_url(template, &cfg.username, &repo.name);
        let activity = match poll_activity(fetcher, &url, policy).await {
            ActivityOutcome::Ready(series) => ActivityView::Sparkline {
                sparkline: Sparkline::from_series(&series),
            },
            ActivityOutcome::Unavailable(_) => ActivityView::Unavailable {
                message: MSG_ACTIVITY_UNAVAILABLE.to_string(),
            },
        };
        RepoRow {
            stars: (!explicit).then_some(repo.stargazers_count),
            updated: repo.updated_at.as_deref().map(short_date),
            name: repo.name,
            html_url: repo.html_url,
            activity,
        }
    }))
    .await;

    FamilyView::Rows { rows }
}

/// One page-load trigger: both families, concurrently.
pub async fn build_page(
    fetcher: Arc<dyn HttpFetch>,
    cfg: &TrackersConfig,
    policy: &BackoffPolicy,
) -> TrackersPage {
    let (repos, packages) = tokio::join!(
        repo_view(fetcher.clone(), &cfg.github, policy),
        package_view(fetcher.clone(), &cfg.bioconda),
    );
    TrackersPage { repos, packages }
}
