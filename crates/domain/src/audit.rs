use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopwright_core::{AppError, ShopId, UserId};
use uuid::Uuid;

/// Stable audit actions emitted by the permission core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a multi-shop admin requests access to a shop.
    PermissionRequest,
    /// Emitted when a shop owner approves a pending request.
    PermissionGrant,
    /// Emitted when a shop owner denies a pending request.
    PermissionDeny,
    /// Emitted when a granted permission is revoked.
    PermissionRevoke,
    /// Emitted when a multi-shop admin enters a shop context.
    ShopSwitch,
    /// Emitted when an access validation is denied.
    AccessAttempt,
    /// Emitted when a shop owner lists pending requests.
    ViewPendingRequests,
    /// Emitted when a session's shop context is explicitly cleared.
    ShopContextReset,
    /// Emitted when a stale shop context is cleared during revalidation.
    InvalidShopContextReset,
    /// Emitted once per superadmin bulk assignment batch.
    SuperadminBulkAssign,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionRequest => "permission_request",
            Self::PermissionGrant => "permission_grant",
            Self::PermissionDeny => "permission_deny",
            Self::PermissionRevoke => "permission_revoke",
            Self::ShopSwitch => "shop_switch",
            Self::AccessAttempt => "access_attempt",
            Self::ViewPendingRequests => "view_pending_requests",
            Self::ShopContextReset => "shop_context_reset",
            Self::InvalidShopContextReset => "invalid_shop_context_reset",
            Self::SuperadminBulkAssign => "superadmin_bulk_assign",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "permission_request" => Ok(Self::PermissionRequest),
            "permission_grant" => Ok(Self::PermissionGrant),
            "permission_deny" => Ok(Self::PermissionDeny),
            "permission_revoke" => Ok(Self::PermissionRevoke),
            "shop_switch" => Ok(Self::ShopSwitch),
            "access_attempt" => Ok(Self::AccessAttempt),
            "view_pending_requests" => Ok(Self::ViewPendingRequests),
            "shop_context_reset" => Ok(Self::ShopContextReset),
            "invalid_shop_context_reset" => Ok(Self::InvalidShopContextReset),
            "superadmin_bulk_assign" => Ok(Self::SuperadminBulkAssign),
            _ => Err(AppError::Validation(format!(
                "unknown audit action value '{value}'"
            ))),
        }
    }
}

/// Outcome recorded with an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// The operation completed.
    Success,
    /// The operation was attempted but errored.
    Failed,
    /// The operation was refused by policy.
    Denied,
}

impl AuditStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Denied => "denied",
        }
    }
}

impl FromStr for AuditStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "denied" => Ok(Self::Denied),
            _ => Err(AppError::Validation(format!(
                "unknown audit status value '{value}'"
            ))),
        }
    }
}

/// Immutable security event persisted by the audit log.
///
/// Entries are never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Stable entry identifier.
    pub id: Uuid,
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
    /// Remote address of the caller, if known.
    pub ip_address: Option<String>,
    /// User agent of the caller, if known.
    pub user_agent: Option<String>,
    /// Session identifier of the caller, if known.
    pub session_id: Option<String>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}
