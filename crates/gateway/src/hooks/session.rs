//! The signed-in account.

use marketplace_core::SessionUser;

use super::no_args;
use crate::backend::{Backend, BackendError, Credentials, functions};

/// Resolve the account behind `token`.
///
/// `Ok(None)` means the backend does not recognise a user for the token.
///
/// # Errors
///
/// Returns `BackendError` if the call fails; a rejected token is
/// `BackendError::Unauthenticated`.
pub async fn current_user(
    backend: &dyn Backend,
    token: &str,
) -> Result<Option<SessionUser>, BackendError> {
    let value = backend
        .query(functions::USERS_VIEWER, no_args(), Credentials::User(token))
        .await?;
    Ok(serde_json::from_value(value)?)
}
