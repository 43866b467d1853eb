//! In-memory per-session shop context store.

use std::collections::HashMap;

use async_trait::async_trait;
use shopwright_application::SessionContextStore;
use shopwright_core::AppResult;
use shopwright_domain::ShopContext;
use tokio::sync::RwLock;

/// In-memory implementation of the session context store port.
///
/// Contexts are keyed by the opaque session id; the host session layer is
/// responsible for calling `clear` on logout.
#[derive(Debug, Default)]
pub struct InMemorySessionContextStore {
    contexts: RwLock<HashMap<String, ShopContext>>,
}

impl InMemorySessionContextStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            contexts: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionContextStore for InMemorySessionContextStore {
    async fn load(&self, session_id: &str) -> AppResult<Option<ShopContext>> {
        Ok(self.contexts.read().await.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, context: ShopContext) -> AppResult<()> {
        self.contexts
            .write()
            .await
            .insert(session_id.to_owned(), context);
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> AppResult<()> {
        self.contexts.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use shopwright_application::SessionContextStore;
    use shopwright_core::ShopId;
    use shopwright_domain::ShopContext;

    use super::InMemorySessionContextStore;

    #[tokio::test]
    async fn contexts_are_isolated_per_session() {
        let store = InMemorySessionContextStore::new();
        let shop_id = ShopId::new();

        let saved = store
            .save("session-a", ShopContext::dashboard().entered(shop_id, Utc::now()))
            .await;
        assert!(saved.is_ok());

        let other = store.load("session-b").await;
        assert!(other.is_ok_and(|context| context.is_none()));

        let cleared = store.clear("session-a").await;
        assert!(cleared.is_ok());
        let reloaded = store.load("session-a").await;
        assert!(reloaded.is_ok_and(|context| context.is_none()));
    }
}
