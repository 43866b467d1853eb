//! Shared in-memory fakes for service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use shopwright_core::{AppError, AppResult, Principal, ShopId, UserId};
use shopwright_domain::{
    AuditAction, AuditLogEntry, AuditStatus, PermissionGrant, PermissionId, Shop, ShopContext,
};
use tokio::sync::Mutex;

use crate::{
    AuditEvent, AuditLogRepository, AttemptInfo, PermissionRepository, PrincipalDirectory,
    RateLimitRepository, SessionContextStore, ShopDirectory,
};

/// Audit repository recording every appended event.
#[derive(Default)]
pub(crate) struct FakeAuditLogRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

impl FakeAuditLogRepository {
    pub(crate) async fn recorded_actions(&self) -> Vec<(AuditAction, AuditStatus)> {
        self.events
            .lock()
            .await
            .iter()
            .map(|event| (event.action, event.status))
            .collect()
    }
}

#[async_trait]
impl AuditLogRepository for FakeAuditLogRepository {
    async fn append(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }

    async fn list_by_shop(&self, _shop_id: ShopId, _limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        Ok(Vec::new())
    }

    async fn list_by_user(&self, _user_id: UserId, _limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        Ok(Vec::new())
    }
}

/// Permission repository with full in-memory lifecycle semantics.
#[derive(Default)]
pub(crate) struct FakePermissionRepository {
    pub(crate) records: Mutex<Vec<PermissionGrant>>,
}

impl FakePermissionRepository {
    pub(crate) async fn insert(&self, record: PermissionGrant) {
        self.records.lock().await.push(record);
    }
}

#[async_trait]
impl PermissionRepository for FakePermissionRepository {
    async fn create(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
        shop_owner_id: UserId,
    ) -> AppResult<PermissionGrant> {
        let mut records = self.records.lock().await;
        let duplicate = records.iter().any(|record| {
            record.multi_shop_admin_id == multi_shop_admin_id
                && record.shop_id == shop_id
                && record.is_pending()
        });
        if duplicate {
            return Err(AppError::Conflict(
                "a pending request already exists for this shop".to_owned(),
            ));
        }

        let record = PermissionGrant {
            id: PermissionId::new(),
            multi_shop_admin_id,
            shop_id,
            shop_owner_id,
            granted: false,
            granted_at: None,
            revoked_at: None,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn grant(&self, permission_id: PermissionId) -> AppResult<bool> {
        let mut records = self.records.lock().await;
        let Some(record) = records.iter_mut().find(|record| record.id == permission_id) else {
            return Ok(false);
        };
        if record.granted || record.revoked_at.is_some() {
            return Ok(false);
        }
        record.granted = true;
        record.granted_at = Some(Utc::now());
        Ok(true)
    }

    async fn revoke(&self, permission_id: PermissionId) -> AppResult<bool> {
        let mut records = self.records.lock().await;
        let Some(record) = records.iter_mut().find(|record| record.id == permission_id) else {
            return Ok(false);
        };
        if record.revoked_at.is_none() {
            record.revoked_at = Some(Utc::now());
        }
        Ok(true)
    }

    async fn find_by_id(&self, permission_id: PermissionId) -> AppResult<Option<PermissionGrant>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| record.id == permission_id)
            .cloned())
    }

    async fn find_current(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
    ) -> AppResult<Option<PermissionGrant>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| {
                record.multi_shop_admin_id == multi_shop_admin_id && record.shop_id == shop_id
            })
            .next_back()
            .cloned())
    }

    async fn list_by_multi_shop_admin(
        &self,
        multi_shop_admin_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        let mut matches: Vec<PermissionGrant> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| record.multi_shop_admin_id == multi_shop_admin_id)
            .cloned()
            .collect();
        matches.reverse();
        Ok(matches)
    }

    async fn list_pending_for_shop_owner(
        &self,
        shop_owner_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| record.shop_owner_id == shop_owner_id && record.is_pending())
            .cloned()
            .collect())
    }
}

/// Directory fake serving both principal and shop lookups.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    pub(crate) principals: HashMap<UserId, Principal>,
    pub(crate) shops: HashMap<ShopId, Shop>,
}

impl FakeDirectory {
    pub(crate) fn with_principal(mut self, principal: Principal) -> Self {
        self.principals.insert(principal.id(), principal);
        self
    }

    pub(crate) fn with_shop(mut self, shop: Shop) -> Self {
        self.shops.insert(shop.id, shop);
        self
    }
}

#[async_trait]
impl PrincipalDirectory for FakeDirectory {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self.principals.get(&user_id).cloned())
    }
}

#[async_trait]
impl ShopDirectory for FakeDirectory {
    async fn find_shop(&self, shop_id: ShopId) -> AppResult<Option<Shop>> {
        Ok(self.shops.get(&shop_id).cloned())
    }
}

/// Rate limit repository counting attempts without window expiry.
#[derive(Default)]
pub(crate) struct FakeRateLimitRepository {
    pub(crate) counters: Mutex<HashMap<String, i32>>,
}

#[async_trait]
impl RateLimitRepository for FakeRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        _window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let mut counters = self.counters.lock().await;
        let count = counters.entry(key.to_owned()).or_insert(0);
        *count += 1;
        Ok(AttemptInfo {
            attempt_count: *count,
            window_started_at: Utc::now(),
        })
    }

    async fn cleanup_expired(&self, _before: chrono::DateTime<Utc>) -> AppResult<u64> {
        Ok(0)
    }
}

/// Session context store over a plain map.
#[derive(Default)]
pub(crate) struct FakeSessionContextStore {
    pub(crate) contexts: Mutex<HashMap<String, ShopContext>>,
}

#[async_trait]
impl SessionContextStore for FakeSessionContextStore {
    async fn load(&self, session_id: &str) -> AppResult<Option<ShopContext>> {
        Ok(self.contexts.lock().await.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, context: ShopContext) -> AppResult<()> {
        self.contexts
            .lock()
            .await
            .insert(session_id.to_owned(), context);
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> AppResult<()> {
        self.contexts.lock().await.remove(session_id);
        Ok(())
    }
}

/// Builds an active multi-shop admin principal.
pub(crate) fn multi_shop_admin(id: UserId) -> Principal {
    Principal::new(id, "Avery Admin", None, false, true, true, None)
}

/// Builds an active shop owner principal for the given shop.
pub(crate) fn shop_owner(id: UserId, shop_id: ShopId) -> Principal {
    Principal::new(
        id,
        "Olive Owner",
        Some("olive@example.test".to_owned()),
        false,
        false,
        true,
        Some(shop_id),
    )
}

/// Builds an active platform superadmin principal.
pub(crate) fn superadmin(id: UserId) -> Principal {
    Principal::new(id, "Sasha Super", None, true, false, true, None)
}
