//! PostgreSQL-backed permission repository.
//!
//! The single-pending-pair invariant is enforced by the partial unique index
//! `permissions_single_pending_pair`, so concurrent duplicate requests are
//! decided by the database rather than application-level checks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shopwright_application::PermissionRepository;
use shopwright_core::{AppError, AppResult, ShopId, UserId};
use shopwright_domain::{PermissionGrant, PermissionId};

/// PostgreSQL implementation of the permission repository port.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: Uuid,
    multi_shop_admin_id: Uuid,
    shop_id: Uuid,
    shop_owner_id: Uuid,
    granted: bool,
    granted_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<PermissionRow> for PermissionGrant {
    fn from(row: PermissionRow) -> Self {
        Self {
            id: PermissionId::from_uuid(row.id),
            multi_shop_admin_id: UserId::from_uuid(row.multi_shop_admin_id),
            shop_id: ShopId::from_uuid(row.shop_id),
            shop_owner_id: UserId::from_uuid(row.shop_owner_id),
            granted: row.granted,
            granted_at: row.granted_at,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    id,
    multi_shop_admin_id,
    shop_id,
    shop_owner_id,
    granted,
    granted_at,
    revoked_at,
    created_at
"#;

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn create(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
        shop_owner_id: UserId,
    ) -> AppResult<PermissionGrant> {
        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            INSERT INTO permissions (multi_shop_admin_id, shop_id, shop_owner_id)
            VALUES ($1, $2, $3)
            RETURNING {SELECT_COLUMNS}
            "#,
        ))
        .bind(multi_shop_admin_id.as_uuid())
        .bind(shop_id.as_uuid())
        .bind(shop_owner_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            let is_duplicate = error
                .as_database_error()
                .map(|db_error| db_error.is_unique_violation())
                .unwrap_or(false);
            if is_duplicate {
                AppError::Conflict("a pending request already exists for this shop".to_owned())
            } else {
                AppError::Internal(format!("failed to create permission request: {error}"))
            }
        })?;

        Ok(row.into())
    }

    async fn grant(&self, permission_id: PermissionId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET granted = TRUE, granted_at = now()
            WHERE id = $1 AND granted = FALSE AND revoked_at IS NULL
            "#,
        )
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to grant permission: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke(&self, permission_id: PermissionId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET revoked_at = now()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke permission: {error}")))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Distinguish "already revoked" (idempotent success) from "missing".
        let exists = self.find_by_id(permission_id).await?.is_some();
        Ok(exists)
    }

    async fn find_by_id(&self, permission_id: PermissionId) -> AppResult<Option<PermissionGrant>> {
        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM permissions
            WHERE id = $1
            "#,
        ))
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permission: {error}")))?;

        Ok(row.map(PermissionGrant::from))
    }

    async fn find_current(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
    ) -> AppResult<Option<PermissionGrant>> {
        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM permissions
            WHERE multi_shop_admin_id = $1 AND shop_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        ))
        .bind(multi_shop_admin_id.as_uuid())
        .bind(shop_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load current permission: {error}"))
        })?;

        Ok(row.map(PermissionGrant::from))
    }

    async fn list_by_multi_shop_admin(
        &self,
        multi_shop_admin_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM permissions
            WHERE multi_shop_admin_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(multi_shop_admin_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        Ok(rows.into_iter().map(PermissionGrant::from).collect())
    }

    async fn list_pending_for_shop_owner(
        &self,
        shop_owner_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM permissions
            WHERE shop_owner_id = $1 AND granted = FALSE AND revoked_at IS NULL
            ORDER BY created_at DESC
            "#,
        ))
        .bind(shop_owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list pending permissions: {error}"))
        })?;

        Ok(rows.into_iter().map(PermissionGrant::from).collect())
    }
}
