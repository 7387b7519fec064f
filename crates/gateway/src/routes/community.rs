//! Review and forum route handlers. All public.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use marketplace_core::{Loadable, ProductId};
use serde::Deserialize;

use crate::backend::Credentials;
use crate::backend::types::{LeaderboardEntry, ReviewStats};
use crate::error::Result;
use crate::hooks;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<u32>,
}

/// Review numbers for a product.
pub async fn review_stats(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Loadable<ReviewStats>>> {
    let stats = hooks::review_stats(state.backend(), Credentials::Anonymous, &id).await?;
    Ok(Json(stats))
}

/// Top forum contributors.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Loadable<Vec<LeaderboardEntry>>>> {
    let limit = query.limit.unwrap_or(hooks::DEFAULT_LEADERBOARD_LIMIT);
    let entries = hooks::leaderboard(state.backend(), Credentials::Anonymous, limit).await?;
    Ok(Json(entries))
}
