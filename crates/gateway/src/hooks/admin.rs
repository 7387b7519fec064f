//! Moderation and account management.
//!
//! The backend re-checks the caller's role on every one of these; the
//! gateway's own role check only saves a round trip.

use marketplace_core::{Loadable, ProductId, Role, SellerId, UserId};
use serde_json::json;
use tracing::instrument;

use super::{decode_document, decode_list, no_args};
use crate::backend::types::{DashboardStats, PendingProduct, PendingSeller};
use crate::backend::{Backend, BackendError, Credentials, functions};

/// Headline numbers for the admin dashboard.
///
/// # Errors
///
/// Returns `BackendError` if the call fails or the answer is malformed.
pub async fn dashboard_stats(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
) -> Result<Loadable<DashboardStats>, BackendError> {
    let value = backend
        .query(functions::ADMIN_DASHBOARD_STATS, no_args(), credentials)
        .await?;
    decode_document(value)
}

/// Products waiting for moderation.
///
/// # Errors
///
/// Returns `BackendError` if the call fails or the answer is malformed.
pub async fn pending_products(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
) -> Result<Loadable<Vec<PendingProduct>>, BackendError> {
    let value = backend
        .query(functions::ADMIN_LIST_PENDING_PRODUCTS, no_args(), credentials)
        .await?;
    decode_list(value)
}

/// Approve a pending product.
///
/// # Errors
///
/// Returns `BackendError` if the backend refuses the change.
#[instrument(skip(backend, credentials), fields(product_id = %product_id))]
pub async fn approve_product(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
    product_id: &ProductId,
) -> Result<(), BackendError> {
    backend
        .mutation(
            functions::ADMIN_APPROVE_PRODUCT,
            json!({ "productId": product_id }),
            credentials,
        )
        .await?;
    tracing::info!("Product approved");
    Ok(())
}

/// Reject a pending product, optionally telling the seller why.
///
/// # Errors
///
/// Returns `BackendError` if the backend refuses the change.
#[instrument(skip(backend, credentials, reason), fields(product_id = %product_id))]
pub async fn reject_product(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
    product_id: &ProductId,
    reason: Option<&str>,
) -> Result<(), BackendError> {
    let mut args = json!({ "productId": product_id });
    if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
        args["reason"] = json!(reason);
    }
    backend
        .mutation(functions::ADMIN_REJECT_PRODUCT, args, credentials)
        .await?;
    tracing::info!("Product rejected");
    Ok(())
}

/// Seller applications waiting for approval.
///
/// # Errors
///
/// Returns `BackendError` if the call fails or the answer is malformed.
pub async fn pending_sellers(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
) -> Result<Loadable<Vec<PendingSeller>>, BackendError> {
    let value = backend
        .query(functions::ADMIN_LIST_PENDING_SELLERS, no_args(), credentials)
        .await?;
    decode_list(value)
}

/// Approve a seller application.
///
/// # Errors
///
/// Returns `BackendError` if the backend refuses the change.
#[instrument(skip(backend, credentials), fields(seller_id = %seller_id))]
pub async fn approve_seller(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
    seller_id: &SellerId,
) -> Result<(), BackendError> {
    backend
        .mutation(
            functions::ADMIN_APPROVE_SELLER,
            json!({ "sellerId": seller_id }),
            credentials,
        )
        .await?;
    tracing::info!("Seller approved");
    Ok(())
}

/// Change an account's role.
///
/// # Errors
///
/// Returns `BackendError` if the backend refuses the change.
#[instrument(skip(backend, credentials), fields(user_id = %user_id, role = %role))]
pub async fn update_user_role(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
    user_id: &UserId,
    role: Role,
) -> Result<(), BackendError> {
    backend
        .mutation(
            functions::ADMIN_UPDATE_USER_ROLE,
            json!({ "userId": user_id, "role": role }),
            credentials,
        )
        .await?;
    tracing::info!("User role updated");
    Ok(())
}
