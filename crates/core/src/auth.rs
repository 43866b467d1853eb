use serde::{Deserialize, Serialize};

use crate::{ShopId, UserId};

/// Authenticated actor resolved by the external identity subsystem.
///
/// Role flags are snapshots taken at session establishment; the permission
/// core re-reads nothing from the identity store beyond what is carried here,
/// so callers must pass the principal for the current session, not a cached
/// one from an earlier login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: UserId,
    display_name: String,
    email: Option<String>,
    is_superadmin: bool,
    is_multi_shop_admin: bool,
    is_active: bool,
    owns_shop_id: Option<ShopId>,
}

impl Principal {
    /// Creates a principal from authentication and role data.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: UserId,
        display_name: impl Into<String>,
        email: Option<String>,
        is_superadmin: bool,
        is_multi_shop_admin: bool,
        is_active: bool,
        owns_shop_id: Option<ShopId>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email,
            is_superadmin,
            is_multi_shop_admin,
            is_active,
            owns_shop_id,
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the identity provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns whether the principal is a platform superadmin.
    #[must_use]
    pub fn is_superadmin(&self) -> bool {
        self.is_superadmin
    }

    /// Returns whether the principal holds the multi-shop admin role.
    #[must_use]
    pub fn is_multi_shop_admin(&self) -> bool {
        self.is_multi_shop_admin
    }

    /// Returns whether the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the shop owned by this principal, if any.
    #[must_use]
    pub fn owns_shop_id(&self) -> Option<ShopId> {
        self.owns_shop_id
    }
}

/// Per-request metadata forwarded into audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    /// Remote address of the caller, if known.
    pub ip_address: Option<String>,
    /// User agent string of the caller, if known.
    pub user_agent: Option<String>,
    /// Opaque session identifier issued at login.
    pub session_id: Option<String>,
}

impl RequestMeta {
    /// Creates request metadata carrying only a session identifier.
    #[must_use]
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            ip_address: None,
            user_agent: None,
            session_id: Some(session_id.into()),
        }
    }
}
