//! In-memory append-only audit log.

use async_trait::async_trait;
use chrono::Utc;
use shopwright_application::{AuditEvent, AuditLogRepository};
use shopwright_core::{AppResult, ShopId, UserId};
use shopwright_domain::AuditLogEntry;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory implementation of the audit log port.
///
/// Entries only ever accumulate; the type exposes no mutation beyond append.
#[derive(Debug, Default)]
pub struct InMemoryAuditLogRepository {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl InMemoryAuditLogRepository {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn append(&self, event: AuditEvent) -> AppResult<()> {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            user_id: event.user_id,
            shop_id: event.shop_id,
            action: event.action,
            target_user_id: event.target_user_id,
            target_shop_id: event.target_shop_id,
            status: event.status,
            reason: event.reason,
            ip_address: event.meta.ip_address,
            user_agent: event.meta.user_agent,
            session_id: event.meta.session_id,
            created_at: Utc::now(),
        };
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list_by_shop(&self, shop_id: ShopId, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|entry| entry.shop_id == Some(shop_id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_by_user(&self, user_id: UserId, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|entry| entry.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
