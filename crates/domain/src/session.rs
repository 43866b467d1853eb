use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopwright_core::ShopId;

/// Ephemeral per-session shop context for a multi-shop admin.
///
/// The context is never trusted as a standing fact: every read re-derives its
/// validity from the durable permission store, and a failed revalidation
/// resets it to the dashboard state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopContext {
    /// Shop the session is currently viewing, if any.
    pub current_shop_id: Option<ShopId>,
    /// Shop the session viewed before the last switch, if any.
    pub previous_shop_id: Option<ShopId>,
    /// When the last switch happened.
    pub switched_at: Option<DateTime<Utc>>,
}

impl ShopContext {
    /// Returns the dashboard state with no shop selected.
    #[must_use]
    pub fn dashboard() -> Self {
        Self::default()
    }

    /// Returns whether no shop context is active.
    #[must_use]
    pub fn is_dashboard(&self) -> bool {
        self.current_shop_id.is_none()
    }

    /// Returns the context after switching into the given shop.
    #[must_use]
    pub fn entered(&self, target_shop_id: ShopId, now: DateTime<Utc>) -> Self {
        Self {
            current_shop_id: Some(target_shop_id),
            previous_shop_id: self.current_shop_id,
            switched_at: Some(now),
        }
    }
}
