//! Typed wrappers over backend functions.
//!
//! Each hook names one backend function, shapes its arguments and decodes
//! its answer. Reads come back as [`Loadable`]. A hook only returns once the
//! backend has answered, so a `null` answer is `Empty`, never `Pending`;
//! pending belongs to subscriptions that have not polled yet.

pub mod admin;
pub mod catalog;
pub mod community;
pub mod orders;
pub mod session;

pub use admin::{
    approve_product, approve_seller, dashboard_stats, pending_products, pending_sellers,
    reject_product, update_user_role,
};
pub use catalog::{create_category, list_categories};
pub use community::{DEFAULT_LEADERBOARD_LIMIT, leaderboard, review_stats};
pub use orders::update_fulfillment;
pub use session::current_user;

use marketplace_core::Loadable;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::BackendError;

/// Decode a list answer; `null` and `[]` are both empty.
fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Loadable<Vec<T>>, BackendError> {
    let list: Option<Vec<T>> = serde_json::from_value(value)?;
    Ok(Loadable::from_list(Some(list.unwrap_or_default())))
}

/// Decode a single document; `null` is empty.
fn decode_document<T: DeserializeOwned>(value: Value) -> Result<Loadable<T>, BackendError> {
    let document: Option<T> = serde_json::from_value(value)?;
    Ok(document.map_or(Loadable::Empty, Loadable::Populated))
}

fn no_args() -> Value {
    Value::Object(serde_json::Map::new())
}
