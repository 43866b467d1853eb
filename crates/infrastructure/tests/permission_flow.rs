//! End-to-end permission lifecycle over the in-memory adapters.

#![allow(unused_crate_dependencies)]

use std::sync::Arc;

use shopwright_application::{
    AccessValidationService, AuditLogRepository, AuditLogService, PermissionWorkflowService,
    RateLimitService, SessionContextService, SuperadminAssignmentService,
};
use shopwright_core::{Principal, RequestMeta, ShopId, UserId};
use shopwright_domain::{AuditAction, PermissionStatus, Shop};
use shopwright_infrastructure::{
    InMemoryAuditLogRepository, InMemoryDirectory, InMemoryPermissionRepository,
    InMemoryRateLimitRepository, InMemorySessionContextStore,
};

struct World {
    directory: Arc<InMemoryDirectory>,
    audit: Arc<InMemoryAuditLogRepository>,
    validation: AccessValidationService,
    workflow: PermissionWorkflowService,
    sessions: SessionContextService,
    assignments: SuperadminAssignmentService,
}

fn world() -> World {
    let directory = Arc::new(InMemoryDirectory::new());
    let permissions = Arc::new(InMemoryPermissionRepository::new());
    let audit = Arc::new(InMemoryAuditLogRepository::new());
    let audit_log = AuditLogService::new(audit.clone());
    let rate_limits = RateLimitService::new(Arc::new(InMemoryRateLimitRepository::new()));

    let validation = AccessValidationService::new(
        directory.clone(),
        permissions.clone(),
        audit_log.clone(),
    );
    let workflow = PermissionWorkflowService::new(
        permissions,
        directory.clone(),
        directory.clone(),
        rate_limits.clone(),
        audit_log.clone(),
    );
    let sessions = SessionContextService::new(
        Arc::new(InMemorySessionContextStore::new()),
        validation.clone(),
        rate_limits.clone(),
        audit_log.clone(),
    );
    let assignments =
        SuperadminAssignmentService::new(workflow.clone(), rate_limits, audit_log);

    World {
        directory,
        audit,
        validation,
        workflow,
        sessions,
        assignments,
    }
}

async fn seed_admin(world: &World, display_name: &str) -> Principal {
    let admin = Principal::new(
        UserId::new(),
        display_name,
        None,
        false,
        true,
        true,
        None,
    );
    world.directory.upsert_principal(admin.clone()).await;
    admin
}

async fn seed_shop(world: &World, name: &str) -> (Shop, Principal) {
    let owner = Principal::new(
        UserId::new(),
        "Olive Owner",
        Some("olive@example.test".to_owned()),
        false,
        false,
        true,
        None,
    );
    let shop = Shop {
        id: ShopId::new(),
        owner_id: owner.id(),
        display_name: name.to_owned(),
    };
    world.directory.upsert_principal(owner.clone()).await;
    world.directory.upsert_shop(shop.clone()).await;
    (shop, owner)
}

#[tokio::test]
async fn request_approve_switch_revoke_lifecycle() {
    let world = world();
    let admin = seed_admin(&world, "Avery Admin").await;
    let (shop, owner) = seed_shop(&world, "Main Street Repairs").await;
    let meta = RequestMeta::for_session("session-1");

    // Request: a pending record becomes visible to the owner.
    let record = world
        .workflow
        .request_access(admin.id(), shop.id, &meta)
        .await;
    let Ok(record) = record else {
        panic!("request failed");
    };
    assert_eq!(record.status(), PermissionStatus::Pending);

    let pending = world.workflow.list_pending(owner.id(), &meta).await;
    let Ok(pending) = pending else {
        panic!("listing failed");
    };
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].admin_display_name, "Avery Admin");
    assert_eq!(pending[0].shop_display_name, "Main Street Repairs");

    // Approve: validation now allows access and the switch succeeds.
    let approved = world
        .workflow
        .approve(record.id, owner.id(), Some("known partner".to_owned()), &meta)
        .await;
    assert!(approved.is_ok());

    let decision = world
        .validation
        .validate_shop_access(admin.id(), shop.id, &meta)
        .await;
    assert!(decision.is_ok_and(|decision| decision.has_access()));

    let context = world.sessions.switch_shop(&admin, shop.id, &meta).await;
    let Ok(context) = context else {
        panic!("switch failed");
    };
    assert_eq!(context.current_shop_id, Some(shop.id));

    // Revoke out of band: the very next context read resets to dashboard.
    let revoked = world
        .workflow
        .revoke(record.id, owner.id(), Some("contract ended".to_owned()), &meta)
        .await;
    assert!(revoked.is_ok());

    let decision = world
        .validation
        .validate_shop_access(admin.id(), shop.id, &meta)
        .await;
    assert!(decision.is_ok_and(|decision| !decision.has_access()));

    let context = world.sessions.current_context(&admin, &meta).await;
    assert!(context.is_ok_and(|context| context.is_dashboard()));

    // Every step of the story is on the audit trail for this shop.
    let trail = world.audit.list_by_shop(shop.id, 100).await;
    let Ok(trail) = trail else {
        panic!("audit query failed");
    };
    let actions: Vec<AuditAction> = trail.iter().map(|entry| entry.action).collect();
    for expected in [
        AuditAction::InvalidShopContextReset,
        AuditAction::PermissionRevoke,
        AuditAction::ShopSwitch,
        AuditAction::PermissionGrant,
        AuditAction::PermissionRequest,
    ] {
        assert!(actions.contains(&expected), "missing {expected:?} in trail");
    }
}

#[tokio::test]
async fn denied_request_never_authorizes_access() {
    let world = world();
    let admin = seed_admin(&world, "Avery Admin").await;
    let (shop, owner) = seed_shop(&world, "Harbor Electronics").await;
    let meta = RequestMeta::for_session("session-2");

    let record = world
        .workflow
        .request_access(admin.id(), shop.id, &meta)
        .await;
    let Ok(record) = record else {
        panic!("request failed");
    };

    let denied = world
        .workflow
        .deny(record.id, owner.id(), Some("unknown requester".to_owned()), &meta)
        .await;
    let Ok(denied) = denied else {
        panic!("deny failed");
    };
    assert_eq!(denied.status(), PermissionStatus::Denied);

    let decision = world
        .validation
        .validate_shop_access(admin.id(), shop.id, &meta)
        .await;
    assert!(decision.is_ok_and(|decision| !decision.has_access()));

    let switch = world.sessions.switch_shop(&admin, shop.id, &meta).await;
    assert!(switch.is_err());
}

#[tokio::test]
async fn superadmin_seeding_still_requires_owner_approval() {
    let world = world();
    let admin = seed_admin(&world, "Avery Admin").await;
    let (shop_a, owner_a) = seed_shop(&world, "North Branch").await;
    let (shop_b, _owner_b) = seed_shop(&world, "South Branch").await;
    let platform_operator = Principal::new(
        UserId::new(),
        "Sasha Super",
        None,
        true,
        false,
        true,
        None,
    );
    world
        .directory
        .upsert_principal(platform_operator.clone())
        .await;
    let meta = RequestMeta::for_session("session-3");

    let report = world
        .assignments
        .assign_shops(
            &platform_operator,
            admin.id(),
            vec![shop_a.id, shop_b.id],
            Some("regional rollout".to_owned()),
            &meta,
        )
        .await;
    let Ok(report) = report else {
        panic!("bulk assignment failed");
    };
    assert_eq!(report.seeded.len(), 2);

    // Seeding grants nothing by itself.
    let decision = world
        .validation
        .validate_shop_access(admin.id(), shop_a.id, &meta)
        .await;
    assert!(decision.is_ok_and(|decision| !decision.has_access()));

    // Owner approval of their own shop's request unlocks exactly that shop.
    let pending = world.workflow.list_pending(owner_a.id(), &meta).await;
    let Ok(pending) = pending else {
        panic!("listing failed");
    };
    assert_eq!(pending.len(), 1);
    let approved = world
        .workflow
        .approve(pending[0].permission.id, owner_a.id(), None, &meta)
        .await;
    assert!(approved.is_ok());

    let allowed = world
        .validation
        .validate_shop_access(admin.id(), shop_a.id, &meta)
        .await;
    assert!(allowed.is_ok_and(|decision| decision.has_access()));
    let still_denied = world
        .validation
        .validate_shop_access(admin.id(), shop_b.id, &meta)
        .await;
    assert!(still_denied.is_ok_and(|decision| !decision.has_access()));
}
