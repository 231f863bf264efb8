//! Per-identity sliding-window rate limiting.
//!
//! Admission control applied to inbound events before they reach business
//! logic. State is a log of admitted-event instants per `(identity, event
//! class)`, purged lazily on each check; memory stays bounded by the number
//! of events admitted within the trailing window per identity. Each key owns
//! its log behind its own lock; the outer map lock is held only to look the
//! key up, never across a window scan. Nothing is persisted; losing the state
//! on restart is acceptable because rate limiting is a liveness safeguard,
//! not a security boundary.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::domain::UserId;

/// Class of an inbound event, determining which admission policy applies.
/// High-frequency cursor traffic gets more headroom than structural task
/// mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    /// Task mutations, board joins/leaves, stats queries.
    Mutation,
    /// Typing and focus/blur signals.
    Presence,
    /// Cursor movement.
    Cursor,
    /// Connection health pings.
    Ping,
}

/// One sliding-window policy: at most `ceiling` admitted events per trailing
/// `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub window: Duration,
    pub ceiling: usize,
}

impl RatePolicy {
    pub const fn new(window: Duration, ceiling: usize) -> Self {
        Self { window, ceiling }
    }
}

/// Per-class admission policies.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiterConfig {
    pub mutation: RatePolicy,
    pub presence: RatePolicy,
    pub cursor: RatePolicy,
    pub ping: RatePolicy,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        let window = Duration::from_secs(60);
        Self {
            mutation: RatePolicy::new(window, 100),
            presence: RatePolicy::new(window, 60),
            cursor: RatePolicy::new(window, 120),
            ping: RatePolicy::new(window, 30),
        }
    }
}

impl RateLimiterConfig {
    fn policy(&self, class: EventClass) -> RatePolicy {
        match class {
            EventClass::Mutation => self.mutation,
            EventClass::Presence => self.presence,
            EventClass::Cursor => self.cursor,
            EventClass::Ping => self.ping,
        }
    }
}

type WindowLog = Arc<Mutex<VecDeque<Instant>>>;

/// Sliding-window admission gate shared by all of an identity's connections.
///
/// Every `(identity, class)` window is locked independently, so a burst from
/// one identity never serializes admission checks for the others.
pub struct SlidingWindowLimiter {
    config: RateLimiterConfig,
    windows: Mutex<HashMap<(UserId, EventClass), WindowLog>>,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject one event attempt. On admission the attempt is
    /// recorded; on rejection nothing is recorded, so a throttled client
    /// does not push its own window further out.
    pub async fn admit(&self, user_id: &UserId, class: EventClass) -> bool {
        self.admit_at(user_id, class, Instant::now()).await
    }

    async fn admit_at(&self, user_id: &UserId, class: EventClass, now: Instant) -> bool {
        let policy = self.config.policy(class);
        let window = {
            let mut windows = self.windows.lock().await;
            Arc::clone(windows.entry((*user_id, class)).or_default())
        };
        let mut log = window.lock().await;

        // Lazy purge: drop entries that slid out of the window.
        while let Some(oldest) = log.front() {
            if now.duration_since(*oldest) >= policy.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() >= policy.ceiling {
            return false;
        }

        log.push_back(now);
        true
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_secs: u64, ceiling: usize) -> SlidingWindowLimiter {
        let policy = RatePolicy::new(Duration::from_secs(window_secs), ceiling);
        SlidingWindowLimiter::new(RateLimiterConfig {
            mutation: policy,
            presence: policy,
            cursor: policy,
            ping: policy,
        })
    }

    #[tokio::test]
    async fn test_window_slides() {
        // given: W=60s, C=5
        let limiter = limiter(60, 5);
        let user = UserId::generate();
        let start = Instant::now();

        // when/then: 5 calls within the window succeed
        for i in 0..5 {
            let at = start + Duration::from_secs(i);
            assert!(limiter.admit_at(&user, EventClass::Mutation, at).await);
        }

        // the 6th within the same window fails
        let sixth = start + Duration::from_secs(30);
        assert!(!limiter.admit_at(&user, EventClass::Mutation, sixth).await);

        // a 7th issued after W has elapsed since the 1st succeeds
        let seventh = start + Duration::from_secs(61);
        assert!(limiter.admit_at(&user, EventClass::Mutation, seventh).await);
    }

    #[tokio::test]
    async fn test_rejection_records_nothing() {
        // given: a full window
        let limiter = limiter(60, 2);
        let user = UserId::generate();
        let start = Instant::now();
        assert!(limiter.admit_at(&user, EventClass::Mutation, start).await);
        assert!(
            limiter
                .admit_at(&user, EventClass::Mutation, start + Duration::from_secs(1))
                .await
        );

        // when: repeated rejected attempts
        for i in 2..10 {
            let at = start + Duration::from_secs(i);
            assert!(!limiter.admit_at(&user, EventClass::Mutation, at).await);
        }

        // then: once the original two slide out, admission resumes; the
        // rejected attempts did not extend the window
        let later = start + Duration::from_secs(62);
        assert!(limiter.admit_at(&user, EventClass::Mutation, later).await);
    }

    #[tokio::test]
    async fn test_classes_are_independent() {
        // given: mutation ceiling exhausted
        let limiter = limiter(60, 1);
        let user = UserId::generate();
        let now = Instant::now();
        assert!(limiter.admit_at(&user, EventClass::Mutation, now).await);
        assert!(!limiter.admit_at(&user, EventClass::Mutation, now).await);

        // then: cursor traffic for the same identity is unaffected
        assert!(limiter.admit_at(&user, EventClass::Cursor, now).await);
    }

    #[tokio::test]
    async fn test_identities_are_independent() {
        let limiter = limiter(60, 1);
        let alice = UserId::generate();
        let bob = UserId::generate();
        let now = Instant::now();

        assert!(limiter.admit_at(&alice, EventClass::Mutation, now).await);
        assert!(!limiter.admit_at(&alice, EventClass::Mutation, now).await);
        assert!(limiter.admit_at(&bob, EventClass::Mutation, now).await);
    }

    #[tokio::test]
    async fn test_ceilings_hold_per_identity_under_concurrent_load() {
        // given: several identities hammering the limiter at the same time
        let limiter = Arc::new(limiter(60, 5));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                let user = UserId::generate();
                let mut admitted = 0;
                for _ in 0..20 {
                    if limiter.admit(&user, EventClass::Cursor).await {
                        admitted += 1;
                    }
                }
                admitted
            }));
        }

        // then: each identity was admitted exactly its ceiling, unaffected
        // by the others saturating their own windows concurrently
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 5);
        }
    }

    #[tokio::test]
    async fn test_default_policies_match_event_weights() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.mutation.ceiling, 100);
        assert_eq!(config.presence.ceiling, 60);
        assert_eq!(config.cursor.ceiling, 120);
        assert_eq!(config.ping.ceiling, 30);
    }
}
