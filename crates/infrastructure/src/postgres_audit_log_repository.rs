//! PostgreSQL-backed append-only audit log.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shopwright_application::{AuditEvent, AuditLogRepository, MAX_AUDIT_QUERY_LIMIT};
use shopwright_core::{AppError, AppResult, ShopId, UserId};
use shopwright_domain::{AuditAction, AuditLogEntry, AuditStatus};

/// PostgreSQL implementation of the audit log port.
#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    user_id: Uuid,
    shop_id: Option<Uuid>,
    action: String,
    target_user_id: Option<Uuid>,
    target_shop_id: Option<Uuid>,
    status: String,
    reason: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    session_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditLogEntry {
    type Error = AppError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action = AuditAction::from_str(row.action.as_str()).map_err(|_| {
            AppError::Internal(format!("unknown audit action '{}' in storage", row.action))
        })?;
        let status = AuditStatus::from_str(row.status.as_str()).map_err(|_| {
            AppError::Internal(format!("unknown audit status '{}' in storage", row.status))
        })?;

        Ok(Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            shop_id: row.shop_id.map(ShopId::from_uuid),
            action,
            target_user_id: row.target_user_id.map(UserId::from_uuid),
            target_shop_id: row.target_shop_id.map(ShopId::from_uuid),
            status,
            reason: row.reason,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            session_id: row.session_id,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    id,
    user_id,
    shop_id,
    action,
    target_user_id,
    target_shop_id,
    status,
    reason,
    ip_address,
    user_agent,
    session_id,
    created_at
"#;

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn append(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                user_id,
                shop_id,
                action,
                target_user_id,
                target_shop_id,
                status,
                reason,
                ip_address,
                user_agent,
                session_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(event.user_id.as_uuid())
        .bind(event.shop_id.map(|shop_id| shop_id.as_uuid()))
        .bind(event.action.as_str())
        .bind(event.target_user_id.map(|user_id| user_id.as_uuid()))
        .bind(event.target_shop_id.map(|shop_id| shop_id.as_uuid()))
        .bind(event.status.as_str())
        .bind(event.reason)
        .bind(event.meta.ip_address)
        .bind(event.meta.user_agent)
        .bind(event.meta.session_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit entry: {error}")))?;

        Ok(())
    }

    async fn list_by_shop(&self, shop_id: ShopId, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        let capped_limit = limit.clamp(1, MAX_AUDIT_QUERY_LIMIT) as i64;
        let rows = sqlx::query_as::<_, AuditRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM audit_log_entries
            WHERE shop_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        ))
        .bind(shop_id.as_uuid())
        .bind(capped_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list audit entries by shop: {error}"))
        })?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }

    async fn list_by_user(&self, user_id: UserId, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        let capped_limit = limit.clamp(1, MAX_AUDIT_QUERY_LIMIT) as i64;
        let rows = sqlx::query_as::<_, AuditRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM audit_log_entries
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        ))
        .bind(user_id.as_uuid())
        .bind(capped_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list audit entries by user: {error}"))
        })?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }
}
