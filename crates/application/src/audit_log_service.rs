//! Append-only audit log port and application service.
//!
//! Audit writes must never break the operation being audited: the service
//! bounds every append with a short timeout and reports sink failures on the
//! operational log channel instead of propagating them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shopwright_core::{AppResult, RequestMeta, ShopId, UserId};
use shopwright_domain::{AuditAction, AuditLogEntry, AuditStatus};

/// Server-enforced maximum number of rows for audit queries.
pub const MAX_AUDIT_QUERY_LIMIT: usize = 100;

/// Upper bound on how long one audit append may stall its caller.
const APPEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Actor that performed the action.
    pub user_id: UserId,
    /// Shop scope of the action, if any.
    pub shop_id: Option<ShopId>,
    /// Stable action identifier.
    pub action: AuditAction,
    /// User the action targeted, if any.
    pub target_user_id: Option<UserId>,
    /// Shop the action targeted, if any.
    pub target_shop_id: Option<ShopId>,
    /// Outcome of the action.
    pub status: AuditStatus,
    /// Human-readable detail or denial reason.
    pub reason: Option<String>,
    /// Request metadata captured with the event.
    pub meta: RequestMeta,
}

impl AuditEvent {
    /// Creates an event with no shop scope, targets, or reason.
    #[must_use]
    pub fn new(user_id: UserId, action: AuditAction, status: AuditStatus) -> Self {
        Self {
            user_id,
            shop_id: None,
            action,
            target_user_id: None,
            target_shop_id: None,
            status,
            reason: None,
            meta: RequestMeta::default(),
        }
    }

    /// Sets the shop scope.
    #[must_use]
    pub fn with_shop(mut self, shop_id: ShopId) -> Self {
        self.shop_id = Some(shop_id);
        self
    }

    /// Sets the targeted user.
    #[must_use]
    pub fn with_target_user(mut self, user_id: UserId) -> Self {
        self.target_user_id = Some(user_id);
        self
    }

    /// Sets the targeted shop.
    #[must_use]
    pub fn with_target_shop(mut self, shop_id: ShopId) -> Self {
        self.target_shop_id = Some(shop_id);
        self
    }

    /// Sets the detail or denial reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches request metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: &RequestMeta) -> Self {
        self.meta = meta.clone();
        self
    }
}

/// Port for persisting and querying append-only audit entries.
///
/// The contract has no update or delete operations.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Persists one audit event durably.
    async fn append(&self, event: AuditEvent) -> AppResult<()>;

    /// Lists entries scoped to a shop, newest first.
    async fn list_by_shop(&self, shop_id: ShopId, limit: usize) -> AppResult<Vec<AuditLogEntry>>;

    /// Lists entries for an actor, newest first.
    async fn list_by_user(&self, user_id: UserId, limit: usize) -> AppResult<Vec<AuditLogEntry>>;
}

/// Application service for the append-only audit log.
#[derive(Clone)]
pub struct AuditLogService {
    repository: Arc<dyn AuditLogRepository>,
}

impl AuditLogService {
    /// Creates a new audit log service.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditLogRepository>) -> Self {
        Self { repository }
    }

    /// Appends one audit event, swallowing sink failures.
    ///
    /// A slow or broken sink must not abort the caller's primary operation,
    /// so append errors and timeouts are reported through `tracing::error!`
    /// and otherwise dropped.
    pub async fn record(&self, event: AuditEvent) {
        let action = event.action.as_str();
        match tokio::time::timeout(APPEND_TIMEOUT, self.repository.append(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                tracing::error!(action, %error, "audit append failed");
            }
            Err(_elapsed) => {
                tracing::error!(action, "audit append timed out");
            }
        }
    }

    /// Lists entries scoped to a shop, newest first, bounded by the server
    /// maximum.
    pub async fn list_by_shop(
        &self,
        shop_id: ShopId,
        limit: usize,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.repository
            .list_by_shop(shop_id, clamp_limit(limit))
            .await
    }

    /// Lists entries for an actor, newest first, bounded by the server
    /// maximum.
    pub async fn list_by_user(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.repository
            .list_by_user(user_id, clamp_limit(limit))
            .await
    }
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_AUDIT_QUERY_LIMIT)
}
