// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod activity;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod facts;
pub mod fetch;
pub mod format;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::activity::{poll_activity, ActivityOutcome, ActivitySeries, BackoffPolicy};
pub use crate::api::router;
pub use crate::config::TrackersConfig;
pub use crate::dashboard::{build_page, TrackersPage};
pub use crate::facts::{resolve_facts, FactRecord, FactSource, Facts};
pub use crate::fetch::{FetchResponse, HttpFetch, ReqwestFetcher};
