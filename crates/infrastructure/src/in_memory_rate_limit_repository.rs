//! In-memory rate limit counters.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shopwright_application::{AttemptInfo, RateLimitRepository};
use shopwright_core::{AppError, AppResult};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct Window {
    attempt_count: i32,
    window_started_at: DateTime<Utc>,
}

/// In-memory implementation of the rate limit port.
///
/// One mutex guards the whole map, so the read-reset-increment sequence is
/// atomic per call; a concurrent burst can never exceed the window by racing
/// the counter. Expired windows are evicted lazily on next access and by
/// `cleanup_expired`.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitRepository {
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimitRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        if window_duration_seconds <= 0 {
            return Err(AppError::Validation(
                "window_duration_seconds must be greater than zero".to_owned(),
            ));
        }

        let now = Utc::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry(key.to_owned())
            .and_modify(|window| {
                if now - window.window_started_at > Duration::seconds(window_duration_seconds) {
                    window.attempt_count = 1;
                    window.window_started_at = now;
                } else {
                    window.attempt_count += 1;
                }
            })
            .or_insert(Window {
                attempt_count: 1,
                window_started_at: now,
            });

        Ok(AttemptInfo {
            attempt_count: window.attempt_count,
            window_started_at: window.window_started_at,
        })
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut windows = self.windows.lock().await;
        let initial = windows.len();
        windows.retain(|_, window| window.window_started_at >= before);
        Ok((initial - windows.len()) as u64)
    }
}
