//! Marketplace roles and the access tiers that gate staff views.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role assigned to a marketplace account by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shopper; the role every new account starts with.
    #[default]
    Customer,
    /// Approved seller with access to the seller console.
    Seller,
    /// Forum and catalog moderator with access to most of the admin dashboard.
    Moderator,
    /// Full access, including seller approval and role changes.
    Admin,
}

impl Role {
    /// Whether this role meets the minimum requirement of `tier`.
    #[must_use]
    pub const fn satisfies(self, tier: AccessTier) -> bool {
        match tier {
            AccessTier::AdminOnly => matches!(self, Self::Admin),
            AccessTier::Staff => matches!(self, Self::Admin | Self::Moderator),
        }
    }

    /// String form used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

/// Minimum role requirement for a guarded view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    /// Admins and moderators.
    #[default]
    Staff,
    /// Admins only.
    AdminOnly,
}
