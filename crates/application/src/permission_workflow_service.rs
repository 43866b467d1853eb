//! Grant lifecycle workflow: request, approve, deny, revoke, list pending.
//!
//! All durable writes to the permission store happen here (the validation
//! service only reads). Owner decisions are authorized against the
//! `shop_owner_id` snapshot stored with the request, never re-derived.

use std::sync::Arc;

use shopwright_core::{AppError, AppResult, RequestMeta, ShopId, UserId};
use shopwright_domain::{AuditAction, AuditStatus, PermissionGrant, PermissionId};

use crate::{
    AuditEvent, AuditLogService, PermissionRepository, PrincipalDirectory, RateLimitRule,
    RateLimitService, ShopDirectory,
};

/// Pending request enriched for the shop owner's approval view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAccessRequest {
    /// The underlying pending record.
    pub permission: PermissionGrant,
    /// Display name of the requesting admin.
    pub admin_display_name: String,
    /// Email of the requesting admin, if known.
    pub admin_email: Option<String>,
    /// Display name of the shop the request targets.
    pub shop_display_name: String,
}

/// Application service orchestrating permission state transitions.
#[derive(Clone)]
pub struct PermissionWorkflowService {
    permissions: Arc<dyn PermissionRepository>,
    principals: Arc<dyn PrincipalDirectory>,
    shops: Arc<dyn ShopDirectory>,
    rate_limits: RateLimitService,
    audit_log: AuditLogService,
}

impl PermissionWorkflowService {
    /// Creates a new workflow service.
    #[must_use]
    pub fn new(
        permissions: Arc<dyn PermissionRepository>,
        principals: Arc<dyn PrincipalDirectory>,
        shops: Arc<dyn ShopDirectory>,
        rate_limits: RateLimitService,
        audit_log: AuditLogService,
    ) -> Self {
        Self {
            permissions,
            principals,
            shops,
            rate_limits,
            audit_log,
        }
    }

    /// Creates a pending access request for the admin and shop.
    ///
    /// A duplicate pending request for the same pair fails with `Conflict`
    /// without creating a second record.
    pub async fn request_access(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
        meta: &RequestMeta,
    ) -> AppResult<PermissionGrant> {
        if let Err(error) = self
            .rate_limits
            .enforce(&RateLimitRule::permission_request(), multi_shop_admin_id)
            .await
        {
            self.audit_request_outcome(
                multi_shop_admin_id,
                shop_id,
                None,
                AuditStatus::Denied,
                "request rate limit exceeded",
                meta,
            )
            .await;
            return Err(error);
        }

        self.create_request(multi_shop_admin_id, shop_id, meta).await
    }

    async fn create_request(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
        meta: &RequestMeta,
    ) -> AppResult<PermissionGrant> {
        let admin = self.principals.find_principal(multi_shop_admin_id).await?;
        let is_eligible = admin
            .map(|admin| admin.is_active() && admin.is_multi_shop_admin())
            .unwrap_or(false);
        if !is_eligible {
            self.audit_request_outcome(
                multi_shop_admin_id,
                shop_id,
                None,
                AuditStatus::Denied,
                "not an active multi-shop admin",
                meta,
            )
            .await;
            return Err(AppError::Forbidden(
                "not an active multi-shop admin".to_owned(),
            ));
        }

        let Some(shop) = self.shops.find_shop(shop_id).await? else {
            self.audit_request_outcome(
                multi_shop_admin_id,
                shop_id,
                None,
                AuditStatus::Failed,
                "shop not found",
                meta,
            )
            .await;
            return Err(AppError::NotFound("shop not found".to_owned()));
        };

        let record = match self
            .permissions
            .create(multi_shop_admin_id, shop_id, shop.owner_id)
            .await
        {
            Ok(record) => record,
            Err(AppError::Conflict(message)) => {
                self.audit_request_outcome(
                    multi_shop_admin_id,
                    shop_id,
                    Some(shop.owner_id),
                    AuditStatus::Failed,
                    "duplicate pending request",
                    meta,
                )
                .await;
                return Err(AppError::Conflict(message));
            }
            Err(error) => return Err(error),
        };

        self.audit_request_outcome(
            multi_shop_admin_id,
            shop_id,
            Some(shop.owner_id),
            AuditStatus::Success,
            "access requested",
            meta,
        )
        .await;

        Ok(record)
    }

    /// Creates a pending access request on behalf of a platform operator.
    ///
    /// The admin's own `permission_request` window is left untouched; the
    /// superadmin rules cover seeded batches, and the admin never initiated
    /// these requests.
    pub(crate) async fn seed_access(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
        meta: &RequestMeta,
    ) -> AppResult<PermissionGrant> {
        self.create_request(multi_shop_admin_id, shop_id, meta).await
    }

    /// Approves a pending request; only the shop's owner may do so.
    pub async fn approve(
        &self,
        permission_id: PermissionId,
        acting_owner_id: UserId,
        reason: Option<String>,
        meta: &RequestMeta,
    ) -> AppResult<PermissionGrant> {
        let record = self
            .load_for_decision(
                permission_id,
                acting_owner_id,
                AuditAction::PermissionGrant,
                meta,
            )
            .await?;

        let updated = self.permissions.grant(permission_id).await?;
        if !updated {
            // A concurrent decision won the race.
            return Err(AppError::Conflict(
                "permission request was already decided".to_owned(),
            ));
        }

        self.audit_log
            .record(
                AuditEvent::new(
                    acting_owner_id,
                    AuditAction::PermissionGrant,
                    AuditStatus::Success,
                )
                .with_shop(record.shop_id)
                .with_target_user(record.multi_shop_admin_id)
                .with_reason(reason.unwrap_or_else(|| "approved by shop owner".to_owned()))
                .with_meta(meta),
            )
            .await;

        self.reload(permission_id).await
    }

    /// Denies a pending request; only the shop's owner may do so.
    ///
    /// Denial closes the record through the same revocation mechanism used
    /// for granted permissions; the derived status keeps the two outcomes
    /// distinguishable.
    pub async fn deny(
        &self,
        permission_id: PermissionId,
        acting_owner_id: UserId,
        reason: Option<String>,
        meta: &RequestMeta,
    ) -> AppResult<PermissionGrant> {
        let record = self
            .load_for_decision(
                permission_id,
                acting_owner_id,
                AuditAction::PermissionDeny,
                meta,
            )
            .await?;

        let updated = self.permissions.revoke(permission_id).await?;
        if !updated {
            return Err(AppError::NotFound(
                "permission request not found".to_owned(),
            ));
        }

        self.audit_log
            .record(
                AuditEvent::new(
                    acting_owner_id,
                    AuditAction::PermissionDeny,
                    AuditStatus::Success,
                )
                .with_shop(record.shop_id)
                .with_target_user(record.multi_shop_admin_id)
                .with_reason(reason.unwrap_or_else(|| "denied by shop owner".to_owned()))
                .with_meta(meta),
            )
            .await;

        self.reload(permission_id).await
    }

    /// Revokes a permission at any point in its lifecycle.
    ///
    /// Allowed for the shop owner and for the named admin themself
    /// (self-revocation). Revoking an already revoked record is an
    /// idempotent success without a second audit entry.
    pub async fn revoke(
        &self,
        permission_id: PermissionId,
        acting_user_id: UserId,
        reason: Option<String>,
        meta: &RequestMeta,
    ) -> AppResult<()> {
        if let Err(error) = self
            .rate_limits
            .enforce(&RateLimitRule::approve_permission(), acting_user_id)
            .await
        {
            self.audit_log
                .record(
                    AuditEvent::new(
                        acting_user_id,
                        AuditAction::PermissionRevoke,
                        AuditStatus::Denied,
                    )
                    .with_reason("decision rate limit exceeded")
                    .with_meta(meta),
                )
                .await;
            return Err(error);
        }

        let Some(record) = self.permissions.find_by_id(permission_id).await? else {
            return Err(AppError::NotFound("permission not found".to_owned()));
        };

        let is_owner = record.shop_owner_id == acting_user_id;
        let is_self = record.multi_shop_admin_id == acting_user_id;
        if !is_owner && !is_self {
            self.audit_log
                .record(
                    AuditEvent::new(
                        acting_user_id,
                        AuditAction::PermissionRevoke,
                        AuditStatus::Failed,
                    )
                    .with_shop(record.shop_id)
                    .with_reason("acting user may not revoke this permission")
                    .with_meta(meta),
                )
                .await;
            return Err(AppError::Forbidden(
                "only the shop owner or the admin may revoke this permission".to_owned(),
            ));
        }

        if record.revoked_at.is_some() {
            return Ok(());
        }

        self.permissions.revoke(permission_id).await?;

        self.audit_log
            .record(
                AuditEvent::new(
                    acting_user_id,
                    AuditAction::PermissionRevoke,
                    AuditStatus::Success,
                )
                .with_shop(record.shop_id)
                .with_target_user(record.multi_shop_admin_id)
                .with_reason(reason.unwrap_or_else(|| "permission revoked".to_owned()))
                .with_meta(meta),
            )
            .await;

        Ok(())
    }

    /// Lists pending requests for an owner, enriched for display.
    ///
    /// Requests whose admin or shop can no longer be resolved render with a
    /// placeholder instead of failing the whole listing.
    pub async fn list_pending(
        &self,
        shop_owner_id: UserId,
        meta: &RequestMeta,
    ) -> AppResult<Vec<PendingAccessRequest>> {
        let pending = self
            .permissions
            .list_pending_for_shop_owner(shop_owner_id)
            .await?;

        let mut enriched = Vec::with_capacity(pending.len());
        for permission in pending {
            let admin = self
                .principals
                .find_principal(permission.multi_shop_admin_id)
                .await?;
            let shop = self.shops.find_shop(permission.shop_id).await?;

            enriched.push(PendingAccessRequest {
                admin_display_name: admin
                    .as_ref()
                    .map(|admin| admin.display_name().to_owned())
                    .unwrap_or_else(|| "unknown admin".to_owned()),
                admin_email: admin.as_ref().and_then(|admin| admin.email().map(str::to_owned)),
                shop_display_name: shop
                    .map(|shop| shop.display_name)
                    .unwrap_or_else(|| "unknown shop".to_owned()),
                permission,
            });
        }

        self.audit_log
            .record(
                AuditEvent::new(
                    shop_owner_id,
                    AuditAction::ViewPendingRequests,
                    AuditStatus::Success,
                )
                .with_reason(format!("{} pending request(s)", enriched.len()))
                .with_meta(meta),
            )
            .await;

        Ok(enriched)
    }

    /// Lists the full grant history for a multi-shop admin, newest first.
    pub async fn list_for_admin(
        &self,
        multi_shop_admin_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.permissions
            .list_by_multi_shop_admin(multi_shop_admin_id)
            .await
    }

    /// Shared guard for approve/deny: rate limit, existence, ownership,
    /// and pending-state checks.
    async fn load_for_decision(
        &self,
        permission_id: PermissionId,
        acting_owner_id: UserId,
        action: AuditAction,
        meta: &RequestMeta,
    ) -> AppResult<PermissionGrant> {
        if let Err(error) = self
            .rate_limits
            .enforce(&RateLimitRule::approve_permission(), acting_owner_id)
            .await
        {
            self.audit_log
                .record(
                    AuditEvent::new(acting_owner_id, action, AuditStatus::Denied)
                        .with_reason("decision rate limit exceeded")
                        .with_meta(meta),
                )
                .await;
            return Err(error);
        }

        let Some(record) = self.permissions.find_by_id(permission_id).await? else {
            return Err(AppError::NotFound(
                "permission request not found".to_owned(),
            ));
        };

        if record.shop_owner_id != acting_owner_id {
            self.audit_log
                .record(
                    AuditEvent::new(acting_owner_id, action, AuditStatus::Failed)
                        .with_shop(record.shop_id)
                        .with_reason("acting user is not the shop owner")
                        .with_meta(meta),
                )
                .await;
            return Err(AppError::Forbidden(
                "only the shop owner may decide this request".to_owned(),
            ));
        }

        if !record.is_pending() {
            self.audit_log
                .record(
                    AuditEvent::new(acting_owner_id, action, AuditStatus::Failed)
                        .with_shop(record.shop_id)
                        .with_target_user(record.multi_shop_admin_id)
                        .with_reason("request already decided")
                        .with_meta(meta),
                )
                .await;
            return Err(AppError::Conflict(
                "permission request was already decided".to_owned(),
            ));
        }

        Ok(record)
    }

    async fn reload(&self, permission_id: PermissionId) -> AppResult<PermissionGrant> {
        self.permissions
            .find_by_id(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal("permission disappeared after update".to_owned())
            })
    }

    async fn audit_request_outcome(
        &self,
        multi_shop_admin_id: UserId,
        shop_id: ShopId,
        shop_owner_id: Option<UserId>,
        status: AuditStatus,
        reason: &str,
        meta: &RequestMeta,
    ) {
        let mut event = AuditEvent::new(multi_shop_admin_id, AuditAction::PermissionRequest, status)
            .with_shop(shop_id)
            .with_target_shop(shop_id)
            .with_reason(reason)
            .with_meta(meta);
        if let Some(owner_id) = shop_owner_id {
            event = event.with_target_user(owner_id);
        }
        self.audit_log.record(event).await;
    }
}
