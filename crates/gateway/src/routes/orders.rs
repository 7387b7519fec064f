//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use marketplace_core::OrderId;
use serde::Deserialize;

use crate::backend::types::FulfillmentStatus;
use crate::error::Result;
use crate::hooks;
use crate::middleware::RequireSession;
use crate::state::AppState;

/// Body of a fulfillment update.
#[derive(Debug, Deserialize)]
pub struct FulfillmentUpdate {
    pub status: FulfillmentStatus,
}

/// Update an order's fulfillment status.
///
/// Any signed-in account may ask; the backend checks it owns the order.
pub async fn update_fulfillment(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(id): Path<OrderId>,
    Json(update): Json<FulfillmentUpdate>,
) -> Result<StatusCode> {
    hooks::update_fulfillment(state.backend(), session.credentials(), &id, update.status).await?;
    Ok(StatusCode::NO_CONTENT)
}
