// src/api.rs
//! HTTP surface for the static page. Every request is one independent
//! resolution run; nothing is cached between requests.

use std::sync::Arc;

use shuttle_axum::axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::activity::BackoffPolicy;
use crate::config::{parse_page_blob, TrackersConfig};
use crate::dashboard::{self, FamilyView, PackageRow, RepoRow, TrackersPage};
use crate::fetch::HttpFetch;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn HttpFetch>,
    pub config: Arc<TrackersConfig>,
    pub policy: BackoffPolicy,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn HttpFetch>, config: TrackersConfig) -> Self {
        Self {
            fetcher,
            config: Arc::new(config),
            policy: BackoffPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/trackers", get(trackers).post(trackers_with_config))
        .route("/api/trackers/repos", get(repos))
        .route("/api/trackers/packages", get(packages))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn trackers(State(state): State<AppState>) -> Json<TrackersPage> {
    Json(dashboard::build_page(state.fetcher.clone(), &state.config, &state.policy).await)
}

/// The page posts its embedded config blob verbatim (possibly double-encoded).
async fn trackers_with_config(State(state): State<AppState>, body: String) -> Json<TrackersPage> {
    let cfg = parse_page_blob(&body);
    tracing::info!(
        target: "api",
        repos = cfg.github.repos.len(),
        packages = cfg.bioconda.packages.len(),
        "page-supplied config"
    );
    Json(dashboard::build_page(state.fetcher.clone(), &cfg, &state.policy).await)
}

async fn repos(State(state): State<AppState>) -> Json<FamilyView<RepoRow>> {
    Json(dashboard::repo_view(state.fetcher.clone(), &state.config.github, &state.policy).await)
}

async fn packages(State(state): State<AppState>) -> Json<FamilyView<PackageRow>> {
    Json(dashboard::package_view(state.fetcher.clone(), &state.config.bioconda).await)
}
