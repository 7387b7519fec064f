//! Reviews and forum.

use marketplace_core::{Loadable, ProductId};
use serde_json::json;

use super::{decode_document, decode_list};
use crate::backend::types::{LeaderboardEntry, ReviewStats};
use crate::backend::{Backend, BackendError, Credentials, functions};

pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;
const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// Aggregated review numbers for a product.
///
/// # Errors
///
/// Returns `BackendError` if the call fails or the answer is malformed.
pub async fn review_stats(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
    product_id: &ProductId,
) -> Result<Loadable<ReviewStats>, BackendError> {
    let value = backend
        .query(
            functions::REVIEWS_STATS,
            json!({ "productId": product_id }),
            credentials,
        )
        .await?;
    decode_document(value)
}

/// Top forum contributors, best first.
///
/// `limit` is clamped to `1..=100`. An empty board is `Empty`, not pending.
///
/// # Errors
///
/// Returns `BackendError` if the call fails or the answer is malformed.
pub async fn leaderboard(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
    limit: u32,
) -> Result<Loadable<Vec<LeaderboardEntry>>, BackendError> {
    let limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);
    let value = backend
        .query(
            functions::FORUM_LEADERBOARD,
            json!({ "limit": limit }),
            credentials,
        )
        .await?;
    decode_list(value)
}
