//! Application services and ports for the multi-shop permission core.

#![forbid(unsafe_code)]

mod access_validation_service;
mod audit_log_service;
mod directory_ports;
mod permission_ports;
mod permission_workflow_service;
mod rate_limit_service;
mod session_context_service;
mod superadmin_service;

#[cfg(test)]
mod test_support;

pub use access_validation_service::{AccessDecision, AccessValidationService};
pub use audit_log_service::{AuditEvent, AuditLogRepository, AuditLogService, MAX_AUDIT_QUERY_LIMIT};
pub use directory_ports::{PrincipalDirectory, ShopDirectory};
pub use permission_ports::PermissionRepository;
pub use permission_workflow_service::{PendingAccessRequest, PermissionWorkflowService};
pub use rate_limit_service::{
    AttemptInfo, RateLimitDecision, RateLimitRepository, RateLimitRule, RateLimitService,
};
pub use session_context_service::{SessionContextService, SessionContextStore};
pub use superadmin_service::{ShopAssignmentFailure, ShopAssignmentReport, SuperadminAssignmentService};
