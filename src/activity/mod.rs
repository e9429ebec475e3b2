// src/activity/mod.rs
//! # Activity Poller
//! Weekly commit activity from an eventually-consistent statistics
//! endpoint. `202 Accepted` means "still computing": the poller waits and
//! retries on a multiplicative backoff until data arrives or attempts run
//! out. Every other failure is final for this run.

pub mod repos;
pub mod sparkline;

use anyhow::{bail, Result};
use chrono::{DateTime, TimeZone, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::fetch::{encode_component, HttpFetch};

pub use repos::{list_repos, RepoSummary};
pub use sparkline::{Bar, Sparkline};

/// Status the statistics endpoint answers while it computes.
pub const STILL_COMPUTING: u16 = 202;

/// GitHub reports a trailing year of weeks.
pub const EXPECTED_WEEKS: usize = 52;

pub const DEFAULT_COMMIT_ACTIVITY_TEMPLATE: &str =
    "https://api.github.com/repos/{owner}/{repo}/stats/commit_activity";

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "trackers_activity_requests_total",
            "Requests issued to the commit activity endpoint."
        );
        describe_counter!(
            "trackers_activity_unavailable_total",
            "Activity polls that ended without data."
        );
    });
}

/// Backoff parameters. `max_attempts` counts requests, not retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            initial_delay: Duration::from_millis(1_500),
            factor: 1.25,
        }
    }
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, factor: f64) -> Result<Self> {
        if max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if initial_delay.is_zero() {
            bail!("initial_delay must be positive");
        }
        if !(factor.is_finite() && factor > 1.0) {
            bail!("backoff factor must be greater than 1, got {factor}");
        }
        Ok(Self {
            max_attempts,
            initial_delay,
            factor,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn start(&self) -> RetryState {
        RetryState {
            attempts_remaining: self.max_attempts,
            next_delay: self.initial_delay,
            factor: self.factor,
        }
    }
}

/// Poller state between requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryState {
    attempts_remaining: u32,
    next_delay: Duration,
    factor: f64,
}

impl RetryState {
    /// Requests still allowed, including the one about to be issued.
    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn next_delay(&self) -> Duration {
        self.next_delay
    }

    /// Record a not-ready answer. Returns how long to wait before the next
    /// request, or `None` once attempts are exhausted.
    pub fn not_ready(&mut self) -> Option<Duration> {
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        if self.attempts_remaining == 0 {
            return None;
        }
        let delay = self.next_delay;
        self.next_delay = delay.mul_f64(self.factor);
        Some(delay)
    }
}

/// One week of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
    pub period_start: DateTime<Utc>,
    pub total: u64,
    pub days: [u64; 7],
}

/// Chronological weekly buckets. Never empty when produced by the poller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivitySeries {
    pub weeks: Vec<WeekBucket>,
}

impl ActivitySeries {
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Whether the full trailing window came back.
    pub fn is_complete(&self) -> bool {
        self.weeks.len() == EXPECTED_WEEKS
    }

    pub fn totals(&self) -> impl Iterator<Item = u64> + '_ {
        self.weeks.iter().map(|w| w.total)
    }
}

#[derive(Debug, Deserialize)]
struct RawWeek {
    week: i64,
    total: u64,
    days: [u64; 7],
}

/// Decode the upstream body. Empty bodies and series shorter than
/// [`EXPECTED_WEEKS`] are rejected.
pub fn parse_series(body: &str) -> Result<ActivitySeries> {
    if body.trim().is_empty() {
        bail!("empty body");
    }
    let raw: Vec<RawWeek> = serde_json::from_str(body)?;
    if raw.is_empty() {
        bail!("empty series");
    }
    if raw.len() < EXPECTED_WEEKS {
        bail!("short series: {} of {EXPECTED_WEEKS} weeks", raw.len());
    }
    let mut weeks = raw
        .into_iter()
        .map(|w| {
            let period_start = match Utc.timestamp_opt(w.week, 0).single() {
                Some(ts) => ts,
                None => bail!("week timestamp out of range: {}", w.week),
            };
            Ok(WeekBucket {
                period_start,
                total: w.total,
                days: w.days,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    weeks.sort_by_key(|w| w.period_start);
    Ok(ActivitySeries { weeks })
}

/// Why a poll produced no series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    StillComputing { attempts: u32 },
    Status(u16),
    Network(String),
    Malformed(String),
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unavailable::StillComputing { attempts } => {
                write!(f, "still computing after {attempts} attempts")
            }
            Unavailable::Status(s) => write!(f, "upstream status {s}"),
            Unavailable::Network(e) => write!(f, "network error: {e}"),
            Unavailable::Malformed(e) => write!(f, "malformed body: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityOutcome {
    Ready(ActivitySeries),
    Unavailable(Unavailable),
}

impl ActivityOutcome {
    pub fn series(&self) -> Option<&ActivitySeries> {
        match self {
            ActivityOutcome::Ready(s) => Some(s),
            ActivityOutcome::Unavailable(_) => None,
        }
    }
}

/// Commit activity URL for `owner/repo`; `template` takes `{owner}` and `{repo}`.
pub fn commit_activity_url(template: &str, owner: &str, repo: &str) -> String {
    template
        .replace("{owner}", &encode_component(owner))
        .replace("{repo}", &encode_component(repo))
}

/// Poll `url` until it yields a series, fails hard, or attempts run out.
pub async fn poll_activity(
    fetcher: &dyn HttpFetch,
    url: &str,
    policy: &BackoffPolicy,
) -> ActivityOutcome {
    ensure_metrics_described();
    let mut state = policy.start();
    let outcome = loop {
        counter!("trackers_activity_requests_total").increment(1);
        let resp = match fetcher.get(url).await {
            Ok(resp) => resp,
            Err(e) => break ActivityOutcome::Unavailable(Unavailable::Network(format!("{e:#}"))),
        };

        if resp.status == STILL_COMPUTING {
            match state.not_ready() {
                Some(delay) => {
                    tracing::debug!(
                        target: "activity",
                        url,
                        delay_ms = delay.as_millis() as u64,
                        remaining = state.attempts_remaining(),
                        "stats still computing; backing off"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                None => {
                    break ActivityOutcome::Unavailable(Unavailable::StillComputing {
                        attempts: policy.max_attempts(),
                    })
                }
            }
        }

        if !resp.is_success() {
            break ActivityOutcome::Unavailable(Unavailable::Status(resp.status));
        }

        break match parse_series(&resp.body) {
            Ok(series) => ActivityOutcome::Ready(series),
            Err(e) => ActivityOutcome::Unavailable(Unavailable::Malformed(e.to_string())),
        };
    };

    if let ActivityOutcome::Unavailable(reason) = &outcome {
        counter!("trackers_activity_unavailable_total").increment(1);
        tracing::warn!(target: "activity", url, reason = %reason, "commit activity unavailable");
    }
    outcome
}
