//! Core types for the marketplace.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod loadable;
pub mod price;
pub mod role;
pub mod session;

pub use id::*;
pub use loadable::Loadable;
pub use price::{CurrencyCode, Price, TAX_RATE_PERCENT, tax_on};
pub use role::{AccessTier, Role, RoleParseError};
pub use session::{AuthSnapshot, SessionUser};
