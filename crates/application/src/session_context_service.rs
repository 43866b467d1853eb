//! Per-session shop context for multi-shop admins.
//!
//! The context lets an admin temporarily "enter" one authorized shop without
//! mutating durable grants. It is re-derived from the permission store on
//! every read, so a mid-session revoke takes effect on the very next context
//! read instead of waiting for the next login.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shopwright_core::{AppError, AppResult, Principal, RequestMeta, ShopId};
use shopwright_domain::{AuditAction, AuditStatus, ShopContext};

use crate::{
    AccessDecision, AccessValidationService, AuditEvent, AuditLogService, RateLimitRule,
    RateLimitService,
};

/// Port for the ephemeral per-session context store.
///
/// Keyed by the opaque session id issued at login; entries are dropped on
/// logout by the host session layer and must never be shared across sessions.
#[async_trait]
pub trait SessionContextStore: Send + Sync {
    /// Loads the context for a session, if one was stored.
    async fn load(&self, session_id: &str) -> AppResult<Option<ShopContext>>;

    /// Stores the context for a session.
    async fn save(&self, session_id: &str, context: ShopContext) -> AppResult<()>;

    /// Removes any stored context for a session.
    async fn clear(&self, session_id: &str) -> AppResult<()>;
}

/// Application service for switching and reading session shop context.
#[derive(Clone)]
pub struct SessionContextService {
    store: Arc<dyn SessionContextStore>,
    validation: AccessValidationService,
    rate_limits: RateLimitService,
    audit_log: AuditLogService,
}

impl SessionContextService {
    /// Creates a new session context service.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionContextStore>,
        validation: AccessValidationService,
        rate_limits: RateLimitService,
        audit_log: AuditLogService,
    ) -> Self {
        Self {
            store,
            validation,
            rate_limits,
            audit_log,
        }
    }

    /// Enters the target shop for this session.
    ///
    /// Requires the multi-shop admin role, consumes the `shop_switch` rate
    /// window, and validates current access. State is unchanged on any
    /// failure.
    pub async fn switch_shop(
        &self,
        principal: &Principal,
        target_shop_id: ShopId,
        meta: &RequestMeta,
    ) -> AppResult<ShopContext> {
        let session_id = required_session_id(meta)?;

        if !principal.is_active() || !principal.is_multi_shop_admin() {
            self.audit_log
                .record(
                    AuditEvent::new(principal.id(), AuditAction::ShopSwitch, AuditStatus::Denied)
                        .with_target_shop(target_shop_id)
                        .with_reason("not an active multi-shop admin")
                        .with_meta(meta),
                )
                .await;
            return Err(AppError::Forbidden(
                "not an active multi-shop admin".to_owned(),
            ));
        }

        if let Err(error) = self
            .rate_limits
            .enforce(&RateLimitRule::shop_switch(), principal.id())
            .await
        {
            self.audit_log
                .record(
                    AuditEvent::new(principal.id(), AuditAction::ShopSwitch, AuditStatus::Denied)
                        .with_target_shop(target_shop_id)
                        .with_reason("shop switch rate limit exceeded")
                        .with_meta(meta),
                )
                .await;
            return Err(error);
        }

        match self
            .validation
            .validate_shop_access(principal.id(), target_shop_id, meta)
            .await?
        {
            AccessDecision::Allowed => {}
            AccessDecision::Denied { reason } => {
                // The validation service already audited the denial.
                return Err(AppError::Forbidden(reason));
            }
        }

        let current = self
            .store
            .load(session_id)
            .await?
            .unwrap_or_else(ShopContext::dashboard);
        let entered = current.entered(target_shop_id, Utc::now());
        self.store.save(session_id, entered.clone()).await?;

        let mut event =
            AuditEvent::new(principal.id(), AuditAction::ShopSwitch, AuditStatus::Success)
                .with_shop(target_shop_id)
                .with_target_shop(target_shop_id)
                .with_meta(meta);
        if let Some(previous_shop_id) = entered.previous_shop_id {
            event = event.with_reason(format!("switched from shop {previous_shop_id}"));
        }
        self.audit_log.record(event).await;

        Ok(entered)
    }

    /// Returns the current context, revalidating any active shop.
    ///
    /// A context whose underlying permission no longer validates is silently
    /// reset to the dashboard state and audited; the caller receives the
    /// reset context, never a stale one.
    pub async fn current_context(
        &self,
        principal: &Principal,
        meta: &RequestMeta,
    ) -> AppResult<ShopContext> {
        let session_id = required_session_id(meta)?;

        let Some(context) = self.store.load(session_id).await? else {
            return Ok(ShopContext::dashboard());
        };
        let Some(current_shop_id) = context.current_shop_id else {
            return Ok(context);
        };

        let decision = self
            .validation
            .validate_shop_access(principal.id(), current_shop_id, meta)
            .await?;
        if decision.has_access() {
            return Ok(context);
        }

        self.store
            .save(session_id, ShopContext::dashboard())
            .await?;
        self.audit_log
            .record(
                AuditEvent::new(
                    principal.id(),
                    AuditAction::InvalidShopContextReset,
                    AuditStatus::Success,
                )
                .with_shop(current_shop_id)
                .with_reason(decision.reason().unwrap_or("access no longer valid"))
                .with_meta(meta),
            )
            .await;

        Ok(ShopContext::dashboard())
    }

    /// Unconditionally clears the session back to the dashboard state.
    pub async fn reset_context(&self, principal: &Principal, meta: &RequestMeta) -> AppResult<()> {
        let session_id = required_session_id(meta)?;
        self.store.clear(session_id).await?;

        self.audit_log
            .record(
                AuditEvent::new(
                    principal.id(),
                    AuditAction::ShopContextReset,
                    AuditStatus::Success,
                )
                .with_meta(meta),
            )
            .await;

        Ok(())
    }
}

fn required_session_id(meta: &RequestMeta) -> AppResult<&str> {
    meta.session_id.as_deref().ok_or_else(|| {
        AppError::Validation("a session id is required for shop context operations".to_owned())
    })
}
