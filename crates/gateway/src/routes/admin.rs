//! Admin route handlers.
//!
//! Staff routes accept admins and moderators; seller and account management
//! is admin only. The backend enforces the same rules again.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use marketplace_core::{Loadable, ProductId, SellerId, UserId};
use serde::Deserialize;

use crate::backend::types::{DashboardStats, PendingProduct, PendingSeller, RoleChange};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::hooks;
use crate::middleware::{RequireAdmin, RequireStaff};
use crate::state::AppState;

/// Body of a product rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RejectProduct {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Dashboard numbers.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
) -> Result<Json<Loadable<DashboardStats>>> {
    let stats = hooks::dashboard_stats(state.backend(), session.credentials()).await?;
    Ok(Json(stats))
}

/// Products awaiting moderation.
pub async fn pending_products(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
) -> Result<Json<Loadable<Vec<PendingProduct>>>> {
    let products = hooks::pending_products(state.backend(), session.credentials()).await?;
    Ok(Json(products))
}

/// Approve a product.
pub async fn approve_product(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    hooks::approve_product(state.backend(), session.credentials(), &id).await?;
    add_breadcrumb("admin", "Approved product", Some(&[("product_id", id.as_str())]));
    Ok(StatusCode::NO_CONTENT)
}

/// Reject a product.
pub async fn reject_product(
    State(state): State<AppState>,
    RequireStaff(session): RequireStaff,
    Path(id): Path<ProductId>,
    body: Bytes,
) -> Result<StatusCode> {
    // The body is optional; an empty one means no reason given
    let reason = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<RejectProduct>(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid body: {e}")))?
            .reason
    };
    hooks::reject_product(
        state.backend(),
        session.credentials(),
        &id,
        reason.as_deref(),
    )
    .await?;
    add_breadcrumb("admin", "Rejected product", Some(&[("product_id", id.as_str())]));
    Ok(StatusCode::NO_CONTENT)
}

/// Seller applications.
pub async fn pending_sellers(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
) -> Result<Json<Loadable<Vec<PendingSeller>>>> {
    let sellers = hooks::pending_sellers(state.backend(), session.credentials()).await?;
    Ok(Json(sellers))
}

/// Approve a seller.
pub async fn approve_seller(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<SellerId>,
) -> Result<StatusCode> {
    hooks::approve_seller(state.backend(), session.credentials(), &id).await?;
    add_breadcrumb("admin", "Approved seller", Some(&[("seller_id", id.as_str())]));
    Ok(StatusCode::NO_CONTENT)
}

/// Change an account's role.
pub async fn update_user_role(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<UserId>,
    Json(change): Json<RoleChange>,
) -> Result<StatusCode> {
    hooks::update_user_role(state.backend(), session.credentials(), &id, change.role).await?;
    add_breadcrumb(
        "admin",
        "Changed user role",
        Some(&[("user_id", id.as_str()), ("role", change.role.as_str())]),
    );
    Ok(StatusCode::NO_CONTENT)
}
