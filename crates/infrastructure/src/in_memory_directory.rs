//! In-memory principal and shop directory.
//!
//! Serves both directory ports from data seeded by the host application;
//! intended for tests and embedded deployments where the host exposes its
//! users and shops directly.

use std::collections::HashMap;

use async_trait::async_trait;
use shopwright_application::{PrincipalDirectory, ShopDirectory};
use shopwright_core::{AppResult, Principal, ShopId, UserId};
use shopwright_domain::Shop;
use tokio::sync::RwLock;

/// In-memory implementation of the principal and shop directory ports.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    principals: RwLock<HashMap<UserId, Principal>>,
    shops: RwLock<HashMap<ShopId, Shop>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            principals: RwLock::new(HashMap::new()),
            shops: RwLock::new(HashMap::new()),
        }
    }

    /// Adds or replaces a principal.
    pub async fn upsert_principal(&self, principal: Principal) {
        self.principals
            .write()
            .await
            .insert(principal.id(), principal);
    }

    /// Adds or replaces a shop.
    pub async fn upsert_shop(&self, shop: Shop) {
        self.shops.write().await.insert(shop.id, shop);
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryDirectory {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self.principals.read().await.get(&user_id).cloned())
    }
}

#[async_trait]
impl ShopDirectory for InMemoryDirectory {
    async fn find_shop(&self, shop_id: ShopId) -> AppResult<Option<Shop>> {
        Ok(self.shops.read().await.get(&shop_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use shopwright_application::{PrincipalDirectory, ShopDirectory};
    use shopwright_core::{Principal, ShopId, UserId};
    use shopwright_domain::Shop;

    use super::InMemoryDirectory;

    #[tokio::test]
    async fn lookups_return_seeded_records() {
        let directory = InMemoryDirectory::new();
        let user_id = UserId::new();
        let shop_id = ShopId::new();

        directory
            .upsert_principal(Principal::new(
                user_id, "Avery Admin", None, false, true, true, None,
            ))
            .await;
        directory
            .upsert_shop(Shop {
                id: shop_id,
                owner_id: user_id,
                display_name: "Main Street Repairs".to_owned(),
            })
            .await;

        let principal = directory.find_principal(user_id).await;
        assert!(principal.is_ok_and(|principal| principal.is_some()));
        let shop = directory.find_shop(shop_id).await;
        assert!(shop.is_ok_and(|shop| shop.is_some()));
        let missing = directory.find_shop(ShopId::new()).await;
        assert!(missing.is_ok_and(|shop| shop.is_none()));
    }
}
