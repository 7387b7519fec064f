//! Order fulfillment.

use marketplace_core::OrderId;
use serde_json::json;
use tracing::instrument;

use crate::backend::types::FulfillmentStatus;
use crate::backend::{Backend, BackendError, Credentials, functions};

/// Move an order to a new fulfillment status.
///
/// Whether the caller may touch the order (its seller, or staff) is decided
/// by the backend.
///
/// # Errors
///
/// Returns `BackendError` if the backend refuses the change.
#[instrument(skip(backend, credentials), fields(order_id = %order_id, status = ?status))]
pub async fn update_fulfillment(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
    order_id: &OrderId,
    status: FulfillmentStatus,
) -> Result<(), BackendError> {
    backend
        .mutation(
            functions::ORDERS_UPDATE_FULFILLMENT,
            json!({ "orderId": order_id, "status": status }),
            credentials,
        )
        .await?;
    Ok(())
}
