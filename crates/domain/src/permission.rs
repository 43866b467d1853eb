use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopwright_core::{ShopId, UserId};
use uuid::Uuid;

/// Unique identifier for a permission grant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a random permission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a permission identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle state derived from a grant record's timestamps.
///
/// Storage keeps only the `granted` flag and the two nullable timestamps; the
/// status is re-derived on every read so a record denied before it was ever
/// granted stays distinguishable from one revoked after a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// Requested and awaiting the shop owner's decision.
    Pending,
    /// Approved by the shop owner and not revoked.
    Granted,
    /// Closed by the shop owner before any grant was issued.
    Denied,
    /// Revoked after having been granted.
    Revoked,
}

impl PermissionStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Revoked => "revoked",
        }
    }
}

/// Durable record linking one multi-shop admin to one shop.
///
/// Records are append-only in spirit: a grant is never deleted, only moved
/// forward through its lifecycle, so the full decision history survives for
/// audit queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Stable record identifier.
    pub id: PermissionId,
    /// The multi-shop admin the record applies to.
    pub multi_shop_admin_id: UserId,
    /// The shop the record applies to.
    pub shop_id: ShopId,
    /// Snapshot of the shop's owner at request time, kept for audit
    /// readability and never re-derived.
    pub shop_owner_id: UserId,
    /// Whether the shop owner has approved the request.
    pub granted: bool,
    /// When the owner approved, if ever.
    pub granted_at: Option<DateTime<Utc>>,
    /// When the record was denied or revoked, if ever.
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

impl PermissionGrant {
    /// Returns the derived lifecycle status.
    #[must_use]
    pub fn status(&self) -> PermissionStatus {
        match (self.revoked_at, self.granted_at) {
            (Some(_), Some(_)) => PermissionStatus::Revoked,
            (Some(_), None) => PermissionStatus::Denied,
            (None, _) if self.granted => PermissionStatus::Granted,
            (None, _) => PermissionStatus::Pending,
        }
    }

    /// Returns whether the record is awaiting an owner decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.granted && self.revoked_at.is_none()
    }

    /// Returns whether the record authorizes access at the given instant.
    ///
    /// Each field is checked explicitly rather than trusting the derived
    /// status, so a partially written or stale record fails closed. A
    /// future-dated `granted_at` is not yet active.
    #[must_use]
    pub fn is_currently_valid(&self, now: DateTime<Utc>) -> bool {
        if !self.granted {
            return false;
        }
        if self.revoked_at.is_some() {
            return false;
        }
        match self.granted_at {
            Some(granted_at) => granted_at <= now,
            None => false,
        }
    }
}
