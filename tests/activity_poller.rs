// tests/activity_poller.rs
// Backoff behaviour against a scripted statistics endpoint. The tokio clock
// is paused, so sleeps auto-advance and elapsed time is exact.

mod common;

use std::time::Duration;

use common::{activity_url, commit_activity_json, Reply, ScriptedFetcher};
use home_trackers::activity::{poll_activity, ActivityOutcome, BackoffPolicy, Unavailable};

fn url() -> String {
    activity_url("octo", "hello")
}

#[tokio::test(start_paused = true)]
async fn retries_through_not_ready_then_succeeds() {
    let fetcher = ScriptedFetcher::new()
        .route(url(), Reply::computing())
        .route(url(), Reply::computing())
        .route(url(), Reply::ok(commit_activity_json(52, &[0, 3, 5])));
    let policy = BackoffPolicy::new(6, Duration::from_millis(1_500), 1.25).unwrap();

    let t0 = tokio::time::Instant::now();
    let outcome = poll_activity(&fetcher, &url(), &policy).await;
    let waited = t0.elapsed();

    assert_eq!(fetcher.count(&url()), 3, "exactly three requests");
    let series = outcome.series().expect("series after retries");
    assert_eq!(series.len(), 52);
    assert!(series.is_complete());
    // 1500ms + 1875ms
    assert!(
        waited >= Duration::from_millis(3_375) && waited < Duration::from_millis(3_400),
        "waited {waited:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let fetcher = ScriptedFetcher::new().route(url(), Reply::computing());
    let policy = BackoffPolicy::new(3, Duration::from_millis(1_500), 1.25).unwrap();

    let outcome = poll_activity(&fetcher, &url(), &policy).await;

    assert_eq!(fetcher.count(&url()), 3);
    assert_eq!(
        outcome,
        ActivityOutcome::Unavailable(Unavailable::StillComputing { attempts: 3 })
    );
}

#[tokio::test(start_paused = true)]
async fn hard_failures_are_not_retried() {
    let cases = [
        (Reply::status(500), "status"),
        (Reply::status(404), "status"),
        (Reply::NetworkError, "network"),
        (Reply::ok(""), "malformed"),
        (Reply::ok("[]"), "malformed"),
        (Reply::ok(commit_activity_json(3, &[2, 0, 7])), "malformed"),
        (Reply::ok("{\"message\":\"rate limited\"}"), "malformed"),
    ];
    for (reply, kind) in cases {
        let fetcher = ScriptedFetcher::new().route(url(), reply);
        let t0 = tokio::time::Instant::now();
        let outcome = poll_activity(&fetcher, &url(), &BackoffPolicy::default()).await;

        assert_eq!(fetcher.count(&url()), 1, "{kind}: single request");
        assert_eq!(t0.elapsed(), Duration::ZERO, "{kind}: no backoff sleep");
        let reason = match outcome {
            ActivityOutcome::Unavailable(r) => r,
            ActivityOutcome::Ready(_) => panic!("{kind}: expected unavailable"),
        };
        let matches = match kind {
            "status" => matches!(reason, Unavailable::Status(_)),
            "network" => matches!(reason, Unavailable::Network(_)),
            _ => matches!(reason, Unavailable::Malformed(_)),
        };
        assert!(matches, "{kind}: got {reason:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn not_ready_then_hard_failure_stops_immediately() {
    let fetcher = ScriptedFetcher::new()
        .route(url(), Reply::computing())
        .route(url(), Reply::status(403));
    let outcome = poll_activity(&fetcher, &url(), &BackoffPolicy::default()).await;
    assert_eq!(fetcher.count(&url()), 2);
    assert_eq!(outcome, ActivityOutcome::Unavailable(Unavailable::Status(403)));
}
