//! Infrastructure adapters for the permission core's application ports.

#![forbid(unsafe_code)]

mod in_memory_audit_log_repository;
mod in_memory_directory;
mod in_memory_permission_repository;
mod in_memory_rate_limit_repository;
mod in_memory_session_context_store;
mod postgres_audit_log_repository;
mod postgres_permission_repository;
mod postgres_rate_limit_repository;
mod redis_rate_limit_repository;

pub use in_memory_audit_log_repository::InMemoryAuditLogRepository;
pub use in_memory_directory::InMemoryDirectory;
pub use in_memory_permission_repository::InMemoryPermissionRepository;
pub use in_memory_rate_limit_repository::InMemoryRateLimitRepository;
pub use in_memory_session_context_store::InMemorySessionContextStore;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use redis_rate_limit_repository::RedisRateLimitRepository;
