//! In-memory permission repository for tests and embedded deployments.

use async_trait::async_trait;
use chrono::Utc;
use shopwright_application::PermissionRepository;
use shopwright_core::{AppError, AppResult, ShopId, UserId};
use shopwright_domain::{PermissionGrant, PermissionId};
use tokio::sync::RwLock;

/// In-memory implementation of the permission repository port.
///
/// The pending-pair check and the insert happen under one write lock, so
/// concurrent duplicate requests cannot both create a record.
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    records: RwLock<Vec<PermissionGrant>>,
}

impl InMemoryPermissionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn create(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
        shop_owner_id: UserId,
    ) -> AppResult<PermissionGrant> {
        let mut records = self.records.write().await;

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
        let mut records = self.records.write().await;
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
        let mut records = self.records.write().await;
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
            .read()
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
            .read()
            .await
            .iter()
            .filter(|record| {
                record.multi_shop_admin_id == multi_shop_admin_id && record.shop_id == shop_id
            })
            .max_by_key(|record| record.created_at)
            .cloned())
    }

    async fn list_by_multi_shop_admin(
        &self,
        multi_shop_admin_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        let mut matches: Vec<PermissionGrant> = self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.multi_shop_admin_id == multi_shop_admin_id)
            .cloned()
            .collect();
        matches.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(matches)
    }

    async fn list_pending_for_shop_owner(
        &self,
        shop_owner_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        let mut matches: Vec<PermissionGrant> = self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.shop_owner_id == shop_owner_id && record.is_pending())
            .cloned()
            .collect();
        matches.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(matches)
    }
}
