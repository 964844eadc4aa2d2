//! Progress tracker lifecycle tests
//!
//! Run on a paused clock; `sleep` auto-advances time so the one-shot
//! cleanup timers and the sweeper fire deterministically.

use leasescout_ai::services::progress_tracker::{COMPLETION_GRACE, MAX_SESSION_AGE, SWEEP_INTERVAL};
use leasescout_ai::services::ProgressTracker;
use leasescout_common::events::{EventBus, ProgressEvent, RemovalReason};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

fn tracker() -> ProgressTracker {
    ProgressTracker::new(EventBus::new(100))
}

async fn advance(duration: Duration) {
    sleep(duration).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn test_completed_session_expires_after_grace() {
    let tracker = tracker();
    tracker.create_session("abc", false).await;
    assert!(tracker.complete_session("abc", Some(json!({ "ok": true }))).await);

    advance(COMPLETION_GRACE - Duration::from_secs(1)).await;
    let progress = tracker.get_progress("abc").await.expect("still readable during grace");
    assert!(progress.completed);
    assert_eq!(progress.step, 3);
    assert_eq!(progress.result, Some(json!({ "ok": true })));

    advance(Duration::from_secs(2)).await;
    assert!(tracker.get_progress("abc").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_errored_session_expires_after_grace() {
    let tracker = tracker();
    tracker.create_session("err", true).await;
    tracker.update_progress("err", 2, "Market", "").await;
    assert!(tracker.error_session("err", "boom").await);

    let progress = tracker.get_progress("err").await.unwrap();
    assert!(progress.completed);
    assert_eq!(progress.error.as_deref(), Some("boom"));
    assert_eq!(progress.current_task, "Analysis error");
    assert_eq!(progress.step, 2);

    advance(COMPLETION_GRACE + Duration::from_secs(1)).await;
    assert!(tracker.get_progress("err").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_expiry_event_emitted() {
    let tracker = tracker();
    let mut events = tracker.event_bus().subscribe();
    tracker.create_session("abc", false).await;
    tracker.complete_session("abc", None).await;

    advance(COMPLETION_GRACE + Duration::from_secs(1)).await;

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    match last {
        Some(ProgressEvent::SessionRemoved { session_id, reason, .. }) => {
            assert_eq!(session_id, "abc");
            assert_eq!(reason, RemovalReason::Expired);
        }
        other => panic!("expected SessionRemoved, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_step_is_monotonic_and_completion_terminal() {
    let tracker = tracker();
    tracker.create_session("abc", true).await;

    assert!(tracker.update_progress("abc", 2, "Market trends", "").await);
    assert!(!tracker.update_progress("abc", 1, "Building", "").await);
    assert!(tracker.update_progress("abc", 2, "Market trends", "again").await);
    assert_eq!(tracker.get_progress("abc").await.unwrap().step, 2);

    assert!(tracker.complete_session("abc", None).await);
    assert!(!tracker.update_progress("abc", 4, "late", "").await);
    assert!(!tracker.complete_session("abc", None).await);
    assert!(!tracker.error_session("abc", "late failure").await);

    let progress = tracker.get_progress("abc").await.unwrap();
    assert_eq!(progress.step, 4);
    assert!(progress.error.is_none());
    assert_eq!(progress.current_task, "Analysis complete");
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_removes_sessions_older_than_max_age() {
    let tracker = tracker();
    tracker.create_session("old-active", true).await;
    tracker.update_progress("old-active", 1, "Building", "").await;

    advance(MAX_SESSION_AGE - Duration::from_secs(60)).await;
    tracker.create_session("young", false).await;
    assert_eq!(tracker.cleanup().await, 0);

    advance(Duration::from_secs(120)).await;
    assert_eq!(tracker.cleanup().await, 1);

    assert!(tracker.get_progress("old-active").await.is_none());
    assert!(tracker.get_progress("young").await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_recreated_session_survives_previous_timer() {
    let tracker = tracker();
    tracker.create_session("s", false).await;
    tracker.complete_session("s", None).await;

    advance(Duration::from_secs(60)).await;
    tracker.create_session("s", true).await;

    // Past the first session's deletion time
    advance(COMPLETION_GRACE).await;
    let progress = tracker.get_progress("s").await.expect("new session must survive");
    assert!(!progress.completed);
    assert_eq!(progress.total_steps, 4);
}

#[tokio::test(start_paused = true)]
async fn test_removed_session_timer_is_harmless() {
    let tracker = tracker();
    tracker.create_session("s", false).await;
    tracker.error_session("s", "boom").await;
    assert!(tracker.remove_session("s").await);

    tracker.create_session("s", false).await;
    advance(COMPLETION_GRACE + Duration::from_secs(5)).await;
    assert!(tracker.get_progress("s").await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_runs_periodically() {
    let tracker = tracker();
    let sweeper = tracker.spawn_sweeper(SWEEP_INTERVAL);
    tracker.create_session("orphan", true).await;

    // First sweep at exactly 30 minutes: not yet strictly older
    advance(SWEEP_INTERVAL + Duration::from_secs(1)).await;
    assert!(tracker.get_progress("orphan").await.is_some());

    advance(SWEEP_INTERVAL).await;
    assert!(tracker.get_progress("orphan").await.is_none());

    sweeper.abort();
}

#[tokio::test(start_paused = true)]
async fn test_custom_timings() {
    let tracker = ProgressTracker::with_timings(
        EventBus::new(16),
        Duration::from_secs(5),
        Duration::from_secs(60),
    );
    tracker.create_session("quick", false).await;
    tracker.complete_session("quick", None).await;

    advance(Duration::from_secs(6)).await;
    assert!(tracker.get_progress("quick").await.is_none());
}
