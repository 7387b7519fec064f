//! Persisted cart format.
//!
//! Carts are stored as a versioned JSON envelope:
//!
//! ```json
//! {"version": 1, "saved_at": "2026-10-17T12:00:00Z", "items": [...]}
//! ```
//!
//! A bare JSON array of items (the un-versioned layout) is still accepted.
//! Envelopes written by a newer version are rejected so the caller can start
//! from an empty cart instead of misreading them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::CartItem;

/// Version written by [`encode`].
pub const CART_FORMAT_VERSION: u32 = 1;

/// Errors decoding or encoding a persisted cart.
#[derive(Debug, Error)]
pub enum CartFormatError {
    #[error("malformed cart data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported cart format version {found}")]
    UnsupportedVersion { found: u64 },

    #[error("cart data is neither an envelope nor an item list")]
    UnknownLayout,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a [CartItem],
}

#[derive(Deserialize)]
struct Envelope {
    items: Vec<CartItem>,
}

/// Serialize `items` into the current envelope.
///
/// # Errors
///
/// Returns `CartFormatError::Malformed` if serialization fails.
pub fn encode(items: &[CartItem]) -> Result<String, CartFormatError> {
    Ok(serde_json::to_string(&EnvelopeRef {
        version: CART_FORMAT_VERSION,
        saved_at: Utc::now(),
        items,
    })?)
}

/// Parse a stored cart.
///
/// Entries with a zero quantity are dropped.
///
/// # Errors
///
/// Returns `CartFormatError` for invalid JSON, unknown layouts or versions
/// newer than [`CART_FORMAT_VERSION`].
pub fn decode(raw: &str) -> Result<Vec<CartItem>, CartFormatError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let items: Vec<CartItem> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        serde_json::Value::Object(ref fields) => {
            let version = fields
                .get("version")
                .and_then(serde_json::Value::as_u64)
                .ok_or(CartFormatError::UnknownLayout)?;
            if version > u64::from(CART_FORMAT_VERSION) {
                return Err(CartFormatError::UnsupportedVersion { found: version });
            }
            serde_json::from_value::<Envelope>(value)?.items
        }
        _ => return Err(CartFormatError::UnknownLayout),
    };

    Ok(items.into_iter().filter(|item| item.quantity > 0).collect())
}
