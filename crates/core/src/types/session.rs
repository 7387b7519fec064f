//! Session user and the auth snapshot derived from the backend's viewer query.

use serde::{Deserialize, Serialize};

use super::{Role, UserId};

/// The signed-in account as reported by the backend.
///
/// Read-only from the marketplace's point of view: it is never constructed
/// from local input, only deserialized from backend responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Point-in-time view of the auth state.
///
/// Starts out loading until the first backend answer arrives. Consumers must
/// tolerate that state rather than treating it as signed out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthSnapshot {
    pub loading: bool,
    pub user: Option<SessionUser>,
}

impl AuthSnapshot {
    /// Snapshot before the first backend answer.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            loading: true,
            user: None,
        }
    }

    /// Resolved snapshot with no signed-in user.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            loading: false,
            user: None,
        }
    }

    /// Resolved snapshot for `user`.
    #[must_use]
    pub const fn signed_in(user: SessionUser) -> Self {
        Self {
            loading: false,
            user: Some(user),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !self.loading && self.user.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Admin or moderator.
    #[must_use]
    pub fn has_admin_access(&self) -> bool {
        matches!(self.role(), Some(Role::Admin | Role::Moderator))
    }
}
