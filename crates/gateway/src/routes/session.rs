//! Session route handlers.

use axum::Json;
use marketplace_core::SessionUser;

use crate::middleware::RequireSession;

/// The signed-in account.
pub async fn me(RequireSession(session): RequireSession) -> Json<SessionUser> {
    Json(session.user)
}
