// src/config/trackers.rs
use serde::{Deserialize, Serialize};

fn default_username() -> String {
    "Syrinx55".to_string()
}
fn default_repos_per_page() -> u32 {
    8
}
fn default_channel() -> String {
    "bioconda".to_string()
}

/// One entry of a family's source list: a source name plus an optional URL
/// template replacing the built-in one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub source: String,
    #[serde(default, alias = "urlTemplate", alias = "url")]
    pub url_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_repos_per_page", alias = "reposPerPage")]
    pub repos_per_page: u32,
    /// Explicit repository names; when empty the user's most recently
    /// updated repositories are listed instead.
    #[serde(default, alias = "entities")]
    pub repos: Vec<String>,
    /// Recognised names: `repos`, `commit_activity`.
    #[serde(default, alias = "sourceListOverrides")]
    pub source_list_overrides: Option<Vec<SourceSpec>>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            repos_per_page: default_repos_per_page(),
            repos: Vec::new(),
            source_list_overrides: None,
        }
    }
}

impl GitHubConfig {
    /// URL template override for a named GitHub source, if configured.
    pub fn template_for(&self, source: &str) -> Option<&str> {
        self.source_list_overrides
            .as_deref()?
            .iter()
            .find(|s| s.source.eq_ignore_ascii_case(source))
            .and_then(|s| s.url_template.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiocondaConfig {
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default, alias = "entities")]
    pub packages: Vec<String>,
    /// Replaces the default source order when present.
    #[serde(default, alias = "sourceListOverrides")]
    pub source_list_overrides: Option<Vec<SourceSpec>>,
}

impl Default for BiocondaConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            packages: Vec::new(),
            source_list_overrides: None,
        }
    }
}

/// Everything the page hands over at trigger time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackersConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub bioconda: BiocondaConfig,
}

impl TrackersConfig {
    /// Trim, drop blanks and duplicates from the entity lists, keeping order.
    pub fn sanitized(mut self) -> Self {
        self.github.repos = clean_list(self.github.repos);
        self.bioconda.packages = clean_list(self.bioconda.packages);
        if self.github.repos_per_page == 0 {
            self.github.repos_per_page = default_repos_per_page();
        }
        self
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .map(|it| it.trim().to_string())
        .filter(|it| !it.is_empty() && seen.insert(it.clone()))
        .collect()
}
