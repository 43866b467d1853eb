//! Rate limiting ports and application service.
//!
//! Every mutating operation in the permission core consults this limiter
//! before touching durable state. A window is identified by
//! `(category, subject)`; the counter increments on every attempt, so denied
//! calls still consume the window.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shopwright_core::{AppError, AppResult, UserId};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Repository port for rate limit persistence.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Records an attempt for the given key.
    ///
    /// Must be atomic per key: if the current window has expired, resets the
    /// counter to one, otherwise increments it. Returns the post-increment
    /// count within the active window.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo>;

    /// Removes expired entries older than the given cutoff.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Information about the current rate limit window for a key.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Number of attempts in the current window (including this one).
    pub attempt_count: i32,
    /// When the current window started.
    pub window_started_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a rate limit rule.
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    /// Action category name (e.g., "shop_switch").
    pub category: String,
    /// Maximum number of attempts allowed in the window.
    pub max_attempts: i32,
    /// Window duration in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window_seconds,
        }
    }

    /// Rule for multi-shop admin shop switches.
    #[must_use]
    pub fn shop_switch() -> Self {
        Self::new("shop_switch", 15, 300)
    }

    /// Rule for multi-shop admin access requests.
    #[must_use]
    pub fn permission_request() -> Self {
        Self::new("permission_request", 10, 300)
    }

    /// Rule for shop owner approve/deny/revoke decisions.
    #[must_use]
    pub fn approve_permission() -> Self {
        Self::new("approve_permission", 10, 300)
    }

    /// Coarse per-shop rule for superadmin assignment seeding.
    #[must_use]
    pub fn superadmin_assignment() -> Self {
        Self::new("superadmin_assignment", 20, 900)
    }

    /// Strict per-call rule for superadmin bulk operations.
    #[must_use]
    pub fn superadmin_bulk() -> Self {
        Self::new("superadmin_bulk", 5, 1800)
    }
}

/// Tagged outcome of one rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the attempt is allowed.
    pub allowed: bool,
    /// Attempts left in the window after this one, zero when denied.
    pub remaining: Option<i32>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Records an attempt and returns the resulting decision.
    ///
    /// The counter increments even when the decision denies, matching
    /// "attempts" rather than "allowed actions" semantics.
    pub async fn check_and_consume(
        &self,
        rule: &RateLimitRule,
        subject: UserId,
    ) -> AppResult<RateLimitDecision> {
        let composite_key = format!("{}:{subject}", rule.category);
        let info = self
            .repository
            .record_attempt(&composite_key, rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            return Ok(RateLimitDecision {
                allowed: false,
                remaining: Some(0),
            });
        }

        Ok(RateLimitDecision {
            allowed: true,
            remaining: Some(rule.max_attempts - info.attempt_count),
        })
    }

    /// Records an attempt and fails with `AppError::RateLimited` when the
    /// window is exhausted.
    pub async fn enforce(&self, rule: &RateLimitRule, subject: UserId) -> AppResult<()> {
        let decision = self.check_and_consume(rule, subject).await?;
        if !decision.allowed {
            return Err(AppError::RateLimited(
                "too many requests, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Removes expired rate limit entries. Intended for periodic cleanup.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(24);
        self.repository.cleanup_expired(cutoff).await
    }
}
