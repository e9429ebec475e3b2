//! home-trackers — binary entrypoint.
//! Boots the Axum service the static page calls for repository activity and
//! package facts.

use std::sync::Arc;

use home_trackers::api::{self, AppState};
use home_trackers::config;
use home_trackers::fetch::ReqwestFetcher;
use home_trackers::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ENV_LOG: &str = "TRACKERS_LOG";

/// Compact logs filtered by `TRACKERS_LOG`, then `RUST_LOG`. A subscriber
/// installed by the runtime takes precedence.
fn init_tracing() {
    let filter = std::env::var(ENV_LOG)
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("home_trackers=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // .env is optional; production sets real env vars.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default()?;
    tracing::info!(
        user = %cfg.github.username,
        repos = cfg.github.repos.len(),
        packages = cfg.bioconda.packages.len(),
        "trackers config loaded"
    );

    let fetcher = ReqwestFetcher::new()?;
    let state = AppState::new(Arc::new(fetcher), cfg);
    let mut router = api::router(state);

    match Metrics::install() {
        Ok(metrics) => router = router.merge(metrics.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics exporter disabled"),
    }

    Ok(router.into())
}
