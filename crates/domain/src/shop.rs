use serde::{Deserialize, Serialize};
use shopwright_core::{ShopId, UserId};

/// Tenant shop owned by exactly one principal.
///
/// Read-only to the permission core; ownership changes happen in the host
/// application's shop directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    /// Stable shop identifier.
    pub id: ShopId,
    /// Owner of the shop.
    pub owner_id: UserId,
    /// Display name shown in approval views.
    pub display_name: String,
}
