//! The single authorization decision point for multi-shop access.
//!
//! Every component that needs to know "may admin X see shop Y" calls this
//! service; nothing else reads the permission store for that question. Each
//! step of the check fails closed on its own, so a stale or partially
//! written grant record can never be read as an approval.

use std::sync::Arc;

use chrono::Utc;
use shopwright_core::{AppError, AppResult, RequestMeta, ShopId, UserId};
use shopwright_domain::{AuditAction, AuditStatus};

use crate::{AuditEvent, AuditLogService, PermissionRepository, PrincipalDirectory};

/// Tagged outcome of one access validation.
///
/// Modeled as an explicit enum rather than a bare boolean so that an
/// unmatched case can never be misread as an approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The admin currently holds a valid grant for the shop.
    Allowed,
    /// Access is refused; the reason is safe to show to the caller.
    Denied {
        /// Stable display reason without other tenants' identifiers.
        reason: String,
    },
}

impl AccessDecision {
    fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
        }
    }

    /// Returns whether access is allowed.
    #[must_use]
    pub fn has_access(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the denial reason, if denied.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied { reason } => Some(reason.as_str()),
        }
    }
}

/// Application service answering "is this access currently valid".
#[derive(Clone)]
pub struct AccessValidationService {
    principals: Arc<dyn PrincipalDirectory>,
    permissions: Arc<dyn PermissionRepository>,
    audit_log: AuditLogService,
}

impl AccessValidationService {
    /// Creates a new validation service.
    #[must_use]
    pub fn new(
        principals: Arc<dyn PrincipalDirectory>,
        permissions: Arc<dyn PermissionRepository>,
        audit_log: AuditLogService,
    ) -> Self {
        Self {
            principals,
            permissions,
            audit_log,
        }
    }

    /// Validates that the admin may access the target shop right now.
    ///
    /// Denials are audited as `access_attempt`; approvals write no audit
    /// entry of their own because the caller's subsequent success entry
    /// covers them.
    pub async fn validate_shop_access(
        &self,
        multi_shop_admin_id: UserId,
        target_shop_id: ShopId,
        meta: &RequestMeta,
    ) -> AppResult<AccessDecision> {
        let principal = self.principals.find_principal(multi_shop_admin_id).await?;
        let is_eligible = principal
            .map(|principal| principal.is_active() && principal.is_multi_shop_admin())
            .unwrap_or(false);
        if !is_eligible {
            return self
                .deny(
                    multi_shop_admin_id,
                    target_shop_id,
                    "not an active multi-shop admin",
                    meta,
                )
                .await;
        }

        let Some(record) = self
            .permissions
            .find_current(multi_shop_admin_id, target_shop_id)
            .await?
        else {
            return self
                .deny(
                    multi_shop_admin_id,
                    target_shop_id,
                    "no permission granted by shop owner",
                    meta,
                )
                .await;
        };

        // Re-validate the stored fields explicitly rather than trusting a
        // cached flag; any single stale field denies.
        if record.revoked_at.is_some() {
            return self
                .deny(
                    multi_shop_admin_id,
                    target_shop_id,
                    "permission revoked by shop owner",
                    meta,
                )
                .await;
        }
        if !record.granted {
            return self
                .deny(
                    multi_shop_admin_id,
                    target_shop_id,
                    "permission not granted by shop owner",
                    meta,
                )
                .await;
        }
        match record.granted_at {
            Some(granted_at) if granted_at <= Utc::now() => {}
            _ => {
                return self
                    .deny(
                        multi_shop_admin_id,
                        target_shop_id,
                        "permission grant is not active yet",
                        meta,
                    )
                    .await;
            }
        }

        Ok(AccessDecision::Allowed)
    }

    /// Validates access and maps a denial to `AppError::Forbidden`.
    pub async fn require_shop_access(
        &self,
        multi_shop_admin_id: UserId,
        target_shop_id: ShopId,
        meta: &RequestMeta,
    ) -> AppResult<()> {
        match self
            .validate_shop_access(multi_shop_admin_id, target_shop_id, meta)
            .await?
        {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied { reason } => Err(AppError::Forbidden(reason)),
        }
    }

    async fn deny(
        &self,
        multi_shop_admin_id: UserId,
        target_shop_id: ShopId,
        reason: &str,
        meta: &RequestMeta,
    ) -> AppResult<AccessDecision> {
        self.audit_log
            .record(
                AuditEvent::new(
                    multi_shop_admin_id,
                    AuditAction::AccessAttempt,
                    AuditStatus::Denied,
                )
                .with_shop(target_shop_id)
                .with_target_shop(target_shop_id)
                .with_reason(reason)
                .with_meta(meta),
            )
            .await;

        Ok(AccessDecision::denied(reason))
    }
}
