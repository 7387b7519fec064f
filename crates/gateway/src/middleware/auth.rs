//! Authentication extractors for the JSON API.
//!
//! The caller's token comes from an `Authorization: Bearer` header or, for
//! browser requests, the session cookie. It is resolved to an account by
//! the backend's viewer query on every request; nothing is cached here.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn dashboard(RequireStaff(session): RequireStaff) -> impl IntoResponse {
//!     format!("Hello, {}!", session.user.email)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use marketplace_core::{AccessTier, SessionUser};

use super::cookies::cookie_value;
use crate::backend::{BackendError, Credentials};
use crate::error::{AppError, set_sentry_user};
use crate::hooks;
use crate::state::AppState;

/// A resolved session: the account and the token it was resolved from.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user: SessionUser,
    pub token: String,
}

impl SessionContext {
    /// Credentials for calls made on the caller's behalf.
    #[must_use]
    pub fn credentials(&self) -> Credentials<'_> {
        Credentials::User(&self.token)
    }
}

/// Any signed-in account.
pub struct RequireSession(pub SessionContext);

/// Admin or moderator.
pub struct RequireStaff(pub SessionContext);

/// Admin only.
pub struct RequireAdmin(pub SessionContext);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = resolve_session(parts, state).await?;
        require_tier(session, AccessTier::Staff).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = resolve_session(parts, state).await?;
        require_tier(session, AccessTier::AdminOnly).map(Self)
    }
}

/// Bearer token from the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn resolve_session(parts: &Parts, state: &AppState) -> Result<SessionContext, AppError> {
    let token = bearer_token(&parts.headers)
        .or_else(|| cookie_value(&parts.headers, state.proxy().session_cookie()))
        .ok_or(AppError::Unauthorized)?
        .to_owned();

    let user = match hooks::current_user(state.backend(), &token).await {
        Ok(Some(user)) => user,
        Ok(None) | Err(BackendError::Unauthenticated) => return Err(AppError::Unauthorized),
        Err(err) => return Err(err.into()),
    };

    set_sentry_user(&user.id, Some(&user.email));
    Ok(SessionContext { user, token })
}

fn require_tier(session: SessionContext, tier: AccessTier) -> Result<SessionContext, AppError> {
    if session.user.role.satisfies(tier) {
        Ok(session)
    } else {
        tracing::info!(
            user_id = %session.user.id,
            role = %session.user.role,
            tier = ?tier,
            "Role does not satisfy tier"
        );
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer eyJhbGci"));
        assert_eq!(bearer_token(&headers), Some("eyJhbGci"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
