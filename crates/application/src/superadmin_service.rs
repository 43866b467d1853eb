//! Bulk seeding of access requests by a platform superadmin.
//!
//! Superadmins hold no authority over grants: every seeded request still
//! goes through the owner-approval workflow. This service only batches the
//! request step and reports per-shop outcomes.

use shopwright_core::{AppError, AppResult, Principal, RequestMeta, ShopId, UserId};
use shopwright_domain::{AuditAction, AuditStatus};

use crate::{
    AuditEvent, AuditLogService, PermissionWorkflowService, RateLimitRule, RateLimitService,
};

/// One shop that could not be seeded in a bulk assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopAssignmentFailure {
    /// The shop that failed.
    pub shop_id: ShopId,
    /// Stable display reason for the failure.
    pub reason: String,
}

/// Outcome of one bulk assignment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopAssignmentReport {
    /// Number of shops in the batch.
    pub requested: usize,
    /// Shops for which a pending request was created.
    pub seeded: Vec<ShopId>,
    /// Shops that failed, with reasons.
    pub failures: Vec<ShopAssignmentFailure>,
}

/// Application service for superadmin bulk assignment.
#[derive(Clone)]
pub struct SuperadminAssignmentService {
    workflow: PermissionWorkflowService,
    rate_limits: RateLimitService,
    audit_log: AuditLogService,
}

impl SuperadminAssignmentService {
    /// Creates a new assignment service.
    #[must_use]
    pub fn new(
        workflow: PermissionWorkflowService,
        rate_limits: RateLimitService,
        audit_log: AuditLogService,
    ) -> Self {
        Self {
            workflow,
            rate_limits,
            audit_log,
        }
    }

    /// Seeds access requests for the admin across the given shops.
    ///
    /// Per-shop failures (unknown shop, duplicate pending request) are
    /// collected in the report instead of aborting the batch. Two rate
    /// limits apply: a strict per-call bulk window and a coarser per-shop
    /// assignment window.
    pub async fn assign_shops(
        &self,
        superadmin: &Principal,
        multi_shop_admin_id: UserId,
        shop_ids: Vec<ShopId>,
        reason: Option<String>,
        meta: &RequestMeta,
    ) -> AppResult<ShopAssignmentReport> {
        if !superadmin.is_active() || !superadmin.is_superadmin() {
            self.audit_log
                .record(
                    AuditEvent::new(
                        superadmin.id(),
                        AuditAction::SuperadminBulkAssign,
                        AuditStatus::Denied,
                    )
                    .with_target_user(multi_shop_admin_id)
                    .with_reason("not an active superadmin")
                    .with_meta(meta),
                )
                .await;
            return Err(AppError::Forbidden("not an active superadmin".to_owned()));
        }

        if let Err(error) = self
            .rate_limits
            .enforce(&RateLimitRule::superadmin_bulk(), superadmin.id())
            .await
        {
            self.audit_log
                .record(
                    AuditEvent::new(
                        superadmin.id(),
                        AuditAction::SuperadminBulkAssign,
                        AuditStatus::Denied,
                    )
                    .with_target_user(multi_shop_admin_id)
                    .with_reason("bulk assignment rate limit exceeded")
                    .with_meta(meta),
                )
                .await;
            return Err(error);
        }

        let requested = shop_ids.len();
        let mut seeded = Vec::new();
        let mut failures = Vec::new();

        for shop_id in shop_ids {
            let assignment_window = self
                .rate_limits
                .check_and_consume(&RateLimitRule::superadmin_assignment(), superadmin.id())
                .await?;
            if !assignment_window.allowed {
                failures.push(ShopAssignmentFailure {
                    shop_id,
                    reason: "assignment rate limit exceeded".to_owned(),
                });
                continue;
            }

            // Seeding bypasses the admin's own request window: the two
            // superadmin rules above bound the batch, and the admin did not
            // initiate these requests.
            match self
                .workflow
                .seed_access(multi_shop_admin_id, shop_id, meta)
                .await
            {
                Ok(_) => seeded.push(shop_id),
                Err(AppError::Internal(message)) => {
                    // Storage trouble is not a per-shop condition; abort.
                    return Err(AppError::Internal(message));
                }
                Err(error) => failures.push(ShopAssignmentFailure {
                    shop_id,
                    reason: error.to_string(),
                }),
            }
        }

        self.audit_log
            .record(
                AuditEvent::new(
                    superadmin.id(),
                    AuditAction::SuperadminBulkAssign,
                    AuditStatus::Success,
                )
                .with_target_user(multi_shop_admin_id)
                .with_reason(format!(
                    "{} requested, {} seeded, {} failed{}",
                    requested,
                    seeded.len(),
                    failures.len(),
                    reason
                        .map(|reason| format!(": {reason}"))
                        .unwrap_or_default()
                ))
                .with_meta(meta),
            )
            .await;

        Ok(ShopAssignmentReport {
            requested,
            seeded,
            failures,
        })
    }
}
