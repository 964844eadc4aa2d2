//! In-memory registry of analysis sessions
//!
//! Sessions are created when a caller asks for progress, updated at every
//! pipeline stage boundary and marked complete (or errored) at the end.
//! A finished session stays readable for a grace period so late pollers can
//! fetch the final state, then a one-shot timer removes it. A periodic sweep
//! removes anything older than the maximum age regardless of state.
//!
//! Every state change is published on the [`EventBus`].

use chrono::Utc;
use leasescout_common::events::{EventBus, ProgressEvent, RemovalReason};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::models::analysis::total_steps;
use crate::models::{ProgressSnapshot, TrackerStats};

/// Time a finished session stays readable
pub const COMPLETION_GRACE: Duration = Duration::from_secs(2 * 60);

/// Sessions older than this (by creation time) are swept
pub const MAX_SESSION_AGE: Duration = Duration::from_secs(30 * 60);

/// Interval of the safety-net sweep
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

struct SessionEntry {
    created_at: Instant,
    /// Distinguishes this entry from later entries under the same id
    generation: u64,
    progress: ProgressSnapshot,
    /// Pending deletion timer, armed on completion or error
    cleanup: Option<CancellationToken>,
}

impl SessionEntry {
    fn cancel_cleanup(&mut self) {
        if let Some(token) = self.cleanup.take() {
            token.cancel();
        }
    }
}

struct TrackerInner {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    next_generation: AtomicU64,
    event_bus: EventBus,
    grace: Duration,
    max_age: Duration,
}

/// Process-wide session registry (cheap to clone)
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<TrackerInner>,
}

impl ProgressTracker {
    pub fn new(event_bus: EventBus) -> Self {
        Self::with_timings(event_bus, COMPLETION_GRACE, MAX_SESSION_AGE)
    }

    /// Tracker with non-default grace period and maximum age
    pub fn with_timings(event_bus: EventBus, grace: Duration, max_age: Duration) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                sessions: RwLock::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
                event_bus,
                grace,
                max_age,
            }),
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }

    /// Register a session with 4 steps when AI scoring is on, 3 otherwise
    ///
    /// An existing session under the same id is replaced and its timer cancelled.
    pub async fn create_session(&self, session_id: &str, use_ai_scoring: bool) {
        let steps = total_steps(use_ai_scoring);
        let entry = SessionEntry {
            created_at: Instant::now(),
            generation: self.inner.next_generation.fetch_add(1, Ordering::Relaxed),
            progress: ProgressSnapshot {
                step: 0,
                total_steps: steps,
                current_task: "Initializing...".to_string(),
                details: String::new(),
                completed: false,
                error: None,
                result: None,
            },
            cleanup: None,
        };

        let replaced = {
            let mut sessions = self.inner.sessions.write().await;
            sessions.insert(session_id.to_string(), entry).map(|mut old| {
                old.cancel_cleanup();
            })
        };

        if replaced.is_some() {
            warn!(session_id = %session_id, "Replacing existing progress session");
            self.emit(ProgressEvent::SessionRemoved {
                session_id: session_id.to_string(),
                reason: RemovalReason::Explicit,
                timestamp: Utc::now(),
            });
        }

        info!(session_id = %session_id, total_steps = steps, "Progress session created");
        self.emit(ProgressEvent::SessionCreated {
            session_id: session_id.to_string(),
            total_steps: steps,
            timestamp: Utc::now(),
        });
    }

    /// Record the stage a session is in
    ///
    /// Returns `false` (and logs a warning) for unknown or completed sessions
    /// and for a step lower than the current one.
    pub async fn update_progress(
        &self,
        session_id: &str,
        step: u32,
        current_task: impl Into<String>,
        details: impl Into<String>,
    ) -> bool {
        let current_task = current_task.into();
        let details = details.into();

        let total_steps = {
            let mut sessions = self.inner.sessions.write().await;
            let Some(entry) = sessions.get_mut(session_id) else {
                warn!(session_id = %session_id, "Session not found for progress update");
                return false;
            };

            if entry.progress.completed {
                warn!(session_id = %session_id, step, "Ignoring progress update on finished session");
                return false;
            }
            if step < entry.progress.step {
                warn!(
                    session_id = %session_id,
                    step,
                    current_step = entry.progress.step,
                    "Ignoring progress update that would move backwards"
                );
                return false;
            }

            entry.progress.step = step;
            entry.progress.current_task = current_task.clone();
            entry.progress.details = details.clone();
            entry.progress.total_steps
        };

        info!(
            session_id = %session_id,
            step,
            total_steps,
            task = %current_task,
            "Progress updated"
        );
        self.emit(ProgressEvent::ProgressUpdated {
            session_id: session_id.to_string(),
            step,
            total_steps,
            current_task,
            details,
            timestamp: Utc::now(),
        });
        true
    }

    pub async fn get_progress(&self, session_id: &str) -> Option<ProgressSnapshot> {
        self.inner
            .sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.progress.clone())
    }

    /// Mark a session successful, attach its result and arm deletion
    pub async fn complete_session(&self, session_id: &str, result: Option<Value>) -> bool {
        {
            let mut sessions = self.inner.sessions.write().await;
            let Some(entry) = sessions.get_mut(session_id) else {
                warn!(session_id = %session_id, "Session not found for completion");
                return false;
            };
            if entry.progress.completed {
                warn!(session_id = %session_id, "Session already finished, ignoring completion");
                return false;
            }

            entry.progress.completed = true;
            entry.progress.step = entry.progress.total_steps;
            entry.progress.current_task = "Analysis complete".to_string();
            entry.progress.details = "All AI calls processed successfully".to_string();
            entry.progress.result = result;
            self.arm_cleanup(session_id, entry);
        }

        info!(session_id = %session_id, "Progress session completed");
        self.emit(ProgressEvent::SessionCompleted {
            session_id: session_id.to_string(),
            timestamp: Utc::now(),
        });
        true
    }

    /// Mark a session failed and arm deletion
    pub async fn error_session(&self, session_id: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        {
            let mut sessions = self.inner.sessions.write().await;
            let Some(entry) = sessions.get_mut(session_id) else {
                warn!(session_id = %session_id, "Session not found for error report");
                return false;
            };
            if entry.progress.completed {
                warn!(session_id = %session_id, "Session already finished, ignoring error report");
                return false;
            }

            entry.progress.completed = true;
            entry.progress.error = Some(message.clone());
            entry.progress.current_task = "Analysis error".to_string();
            self.arm_cleanup(session_id, entry);
        }

        error!(session_id = %session_id, error = %message, "Progress session failed");
        self.emit(ProgressEvent::SessionFailed {
            session_id: session_id.to_string(),
            error: message,
            timestamp: Utc::now(),
        });
        true
    }

    /// Delete a session and cancel its timer; no-op for unknown ids
    pub async fn remove_session(&self, session_id: &str) -> bool {
        let removed = self.inner.sessions.write().await.remove(session_id);
        match removed {
            Some(mut entry) => {
                entry.cancel_cleanup();
                info!(session_id = %session_id, "Progress session removed");
                self.emit(ProgressEvent::SessionRemoved {
                    session_id: session_id.to_string(),
                    reason: RemovalReason::Explicit,
                    timestamp: Utc::now(),
                });
                true
            }
            None => false,
        }
    }

    /// Remove every session older than the maximum age; returns the count
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let max_age = self.inner.max_age;

        let (expired, remaining) = {
            let mut sessions = self.inner.sessions.write().await;
            let stale: Vec<String> = sessions
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.created_at) > max_age)
                .map(|(id, _)| id.clone())
                .collect();

            let mut expired = Vec::with_capacity(stale.len());
            for id in stale {
                if let Some(mut entry) = sessions.remove(&id) {
                    entry.cancel_cleanup();
                    expired.push((id, now.duration_since(entry.created_at)));
                }
            }
            (expired, sessions.len())
        };

        for (session_id, age) in &expired {
            warn!(
                session_id = %session_id,
                age_minutes = age.as_secs() / 60,
                "Sweeping expired progress session"
            );
            self.emit(ProgressEvent::SessionRemoved {
                session_id: session_id.clone(),
                reason: RemovalReason::Swept,
                timestamp: Utc::now(),
            });
        }

        if expired.is_empty() {
            debug!(active_sessions = remaining, "Session sweep: all sessions within age limit");
        } else {
            warn!(
                removed = expired.len(),
                "Session sweep removed orphaned sessions"
            );
        }
        expired.len()
    }

    /// Run `cleanup()` every `interval` for the life of the process
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                tracker.cleanup().await;
            }
        })
    }

    pub async fn stats(&self) -> TrackerStats {
        let sessions = self.inner.sessions.read().await;
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        TrackerStats {
            active_sessions: ids.len(),
            sessions: ids,
        }
    }

    /// Spawn the one-shot deletion for `entry`, replacing any earlier timer
    fn arm_cleanup(&self, session_id: &str, entry: &mut SessionEntry) {
        entry.cancel_cleanup();

        let token = CancellationToken::new();
        entry.cleanup = Some(token.clone());

        let tracker = self.clone();
        let session_id = session_id.to_string();
        let generation = entry.generation;
        let grace = self.inner.grace;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(grace) => {
                    tracker.expire(&session_id, generation).await;
                }
            }
        });
    }

    /// Timer callback: delete only the entry the timer was armed for
    async fn expire(&self, session_id: &str, generation: u64) {
        let removed = {
            let mut sessions = self.inner.sessions.write().await;
            match sessions.get(session_id) {
                Some(entry) if entry.generation == generation => sessions.remove(session_id).is_some(),
                _ => false,
            }
        };

        if removed {
            debug!(session_id = %session_id, "Finished progress session expired");
            self.emit(ProgressEvent::SessionRemoved {
                session_id: session_id.to_string(),
                reason: RemovalReason::Expired,
                timestamp: Utc::now(),
            });
        }
    }

    fn emit(&self, event: ProgressEvent) {
        self.inner.event_bus.emit_lossy(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(EventBus::new(100))
    }

    #[tokio::test]
    async fn test_total_steps_follow_ai_flag() {
        let tracker = tracker();
        tracker.create_session("abc", true).await;
        tracker.create_session("def", false).await;

        assert_eq!(tracker.get_progress("abc").await.unwrap().total_steps, 4);
        let progress = tracker.get_progress("def").await.unwrap();
        assert_eq!(progress.total_steps, 3);
        assert_eq!(progress.step, 0);
        assert_eq!(progress.current_task, "Initializing...");
    }

    #[tokio::test]
    async fn test_update_unknown_session_is_noop() {
        let tracker = tracker();
        assert!(!tracker.update_progress("missing", 1, "task", "").await);
        assert!(tracker.get_progress("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let tracker = tracker();
        tracker.create_session("abc", false).await;
        assert!(tracker.remove_session("abc").await);
        assert!(!tracker.remove_session("abc").await);
    }

    #[tokio::test]
    async fn test_stats_lists_sessions() {
        let tracker = tracker();
        tracker.create_session("b", false).await;
        tracker.create_session("a", true).await;

        let stats = tracker.stats().await;
        assert_eq!(stats.active_sessions, 2);
        assert_eq!(stats.sessions, vec!["a".to_string(), "b".to_string()]);
    }
}
