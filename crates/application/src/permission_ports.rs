//! Durable permission store port.
//!
//! Only the workflow and validation services consume this port; resource
//! handlers go through [`crate::AccessValidationService`] instead of reading
//! grant rows directly.

use async_trait::async_trait;
use shopwright_core::{AppResult, ShopId, UserId};
use shopwright_domain::{PermissionGrant, PermissionId};

/// Repository port for permission grant records.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Creates a pending request for the given pair.
    ///
    /// Must enforce atomically that at most one pending record exists per
    /// `(multi_shop_admin_id, shop_id)` pair and fail with
    /// `AppError::Conflict` when a duplicate request races in.
    async fn create(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
        shop_owner_id: UserId,
    ) -> AppResult<PermissionGrant>;

    /// Marks the record granted with the current timestamp.
    ///
    /// Returns `false` without failing when the record is missing, already
    /// granted, or revoked; a retry never moves `granted_at` forward on a
    /// live grant.
    async fn grant(&self, permission_id: PermissionId) -> AppResult<bool>;

    /// Sets the revocation timestamp.
    ///
    /// Idempotent: revoking an already revoked record returns `true` without
    /// touching the stored timestamp.
    async fn revoke(&self, permission_id: PermissionId) -> AppResult<bool>;

    /// Finds a record by id.
    async fn find_by_id(&self, permission_id: PermissionId) -> AppResult<Option<PermissionGrant>>;

    /// Finds the most recent record for the pair, if any.
    async fn find_current(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
    ) -> AppResult<Option<PermissionGrant>>;

    /// Lists all records for a multi-shop admin, newest first.
    async fn list_by_multi_shop_admin(
        &self,
        multi_shop_admin_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>>;

    /// Lists pending records awaiting a decision by the given owner.
    async fn list_pending_for_shop_owner(
        &self,
        shop_owner_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>>;
}
