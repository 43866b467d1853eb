//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod permission;
mod session;
mod shop;

pub use audit::{AuditAction, AuditLogEntry, AuditStatus};
pub use permission::{PermissionGrant, PermissionId, PermissionStatus};
pub use session::ShopContext;
pub use shop::Shop;
