//! Idle-timeout watchdog for live sessions.
//!
//! Tracks the last moment the backend reported voice activity and decides
//! when a live session has been silent long enough to stop. Checked at two
//! points on purpose: on every queue pop (including the 1-second timeout, so
//! a silent-but-flowing stream still expires) and on every recognition
//! result (so activity renews the clock as soon as it is observed). Either
//! check alone misses an edge case.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Watchdog state. `Expired` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogState {
    /// Voice activity seen within the timeout window.
    Active,
    /// Timeout elapsed with no activity; the session must stop.
    Expired,
}

/// Tracks silence duration against a configured threshold.
///
/// Shared by reference through the session object between the frame feeder
/// and the result loop; interior mutability keeps both check points cheap.
pub struct IdleWatchdog {
    threshold: Duration,
    inner: Mutex<Inner>,
}

struct Inner {
    last_activity: Instant,
    expired: bool,
}

impl IdleWatchdog {
    /// Creates a watchdog whose clock starts now.
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            inner: Mutex::new(Inner {
                last_activity: Instant::now(),
                expired: false,
            }),
        }
    }

    /// Renews the activity clock. The timestamp never moves backwards.
    pub fn record_activity(&self) {
        self.record_activity_at(Instant::now());
    }

    /// Renews the activity clock with an explicit timestamp.
    pub fn record_activity_at(&self, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !inner.expired && now > inner.last_activity {
            inner.last_activity = now;
        }
    }

    /// Compares elapsed silence against the threshold, transitioning to
    /// `Expired` when exceeded. Once expired, stays expired.
    pub fn check(&self) -> WatchdogState {
        self.check_at(Instant::now())
    }

    /// Checks against an explicit timestamp.
    pub fn check_at(&self, now: Instant) -> WatchdogState {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.expired {
            return WatchdogState::Expired;
        }
        if now.duration_since(inner.last_activity) > self.threshold {
            inner.expired = true;
            WatchdogState::Expired
        } else {
            WatchdogState::Active
        }
    }

    /// Returns true once the watchdog has expired.
    pub fn is_expired(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).expired
    }

    /// How long the session has been without voice activity.
    pub fn idle_for(&self) -> Duration {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.last_activity.elapsed()
    }

    /// The configured threshold.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}
