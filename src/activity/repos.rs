// src/activity/repos.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::fetch::{encode_component, fetch_json, HttpFetch};

pub const DEFAULT_REPOS_TEMPLATE: &str =
    "https://api.github.com/users/{user}/repos?sort=updated&per_page={per_page}";

/// The fields of a GitHub repository listing the page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub updated_at: Option<String>,
}

pub fn repos_url(template: &str, user: &str, per_page: u32) -> String {
    template
        .replace("{user}", &encode_component(user))
        .replace("{per_page}", &per_page.to_string())
}

/// Most recently updated repositories of `user`.
pub async fn list_repos(fetcher: &dyn HttpFetch, url: &str) -> Result<Vec<RepoSummary>> {
    fetch_json(fetcher, url).await
}
