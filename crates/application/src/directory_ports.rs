//! Read-only directory ports satisfied by the host application.

use async_trait::async_trait;
use shopwright_core::{AppResult, Principal, ShopId, UserId};
use shopwright_domain::Shop;

/// Port for resolving principals from the external identity subsystem.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Finds a principal by user id.
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>>;
}

/// Port for resolving shops from the host tenant directory.
#[async_trait]
pub trait ShopDirectory: Send + Sync {
    /// Finds a shop by id.
    async fn find_shop(&self, shop_id: ShopId) -> AppResult<Option<Shop>>;
}
