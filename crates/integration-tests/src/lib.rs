//! Integration tests for the marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `proxy` - Page proxy: redirects, preflight, CORS, security headers
//! - `api_auth` - JSON API role checks and backend calls
//! - `cart_sync` - Carts sharing one storage area
//!
//! The gateway runs in-process against [`FakeBackend`]; no network or
//! deployment is needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{Router, body::Body, http::Response};
use marketplace_core::{Role, SessionUser, UserId};
use marketplace_gateway::backend::{Backend, BackendError, Credentials, functions};
use marketplace_gateway::config::GatewayConfig;
use marketplace_gateway::state::AppState;
use serde_json::Value;
use url::Url;

/// Origin the test gateway allows.
pub const ALLOWED_ORIGIN: &str = "https://app.marketplace.test";

/// Body the stub page router answers with.
pub const PAGE_BODY: &str = "page";

/// Body the stub asset router answers with.
pub const ASSET_BODY: &str = "asset";

/// Whether a recorded call was a query or a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Mutation,
}

/// A call the gateway made to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub function: String,
    pub args: Value,
    pub token: Option<String>,
}

/// In-memory backend with canned answers.
///
/// `users.viewer` resolves tokens registered with [`FakeBackend::with_user`]
/// and answers `null` otherwise, like the real deployment. Every other
/// function answers what was registered for it, or `null`.
#[derive(Debug, Default)]
pub struct FakeBackend {
    users: HashMap<String, SessionUser>,
    answers: HashMap<String, Result<Value, String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as belonging to a user with `role`.
    #[must_use]
    pub fn with_user(mut self, token: &str, role: Role) -> Self {
        let user = SessionUser {
            id: UserId::new(format!("user-{token}")),
            email: format!("{token}@marketplace.test"),
            name: None,
            role,
        };
        self.users.insert(token.to_owned(), user);
        self
    }

    /// Answer `function` with `value`.
    #[must_use]
    pub fn with_answer(mut self, function: &str, value: Value) -> Self {
        self.answers.insert(function.to_owned(), Ok(value));
        self
    }

    /// Fail `function` with `message`.
    #[must_use]
    pub fn with_error(mut self, function: &str, message: &str) -> Self {
        self.answers
            .insert(function.to_owned(), Err(message.to_owned()));
        self
    }

    /// Calls made so far, excluding session lookups.
    ///
    /// # Panics
    ///
    /// Panics if the call log lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.function != functions::USERS_VIEWER)
            .cloned()
            .collect()
    }

    #[allow(clippy::unwrap_used)]
    fn answer(
        &self,
        kind: CallKind,
        function: &str,
        args: Value,
        credentials: Credentials<'_>,
    ) -> Result<Value, BackendError> {
        let token = match credentials {
            Credentials::User(token) => Some(token.to_owned()),
            Credentials::Anonymous | Credentials::Deployment => None,
        };
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            function: function.to_owned(),
            args,
            token: token.clone(),
        });

        if function == functions::USERS_VIEWER {
            let user = token.and_then(|token| self.users.get(&token).cloned());
            return Ok(serde_json::to_value(user)?);
        }

        match self.answers.get(function) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(BackendError::Function {
                function: function.to_owned(),
                message: message.clone(),
                data: None,
            }),
            None => Ok(Value::Null),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn query(
        &self,
        function: &str,
        args: Value,
        credentials: Credentials<'_>,
    ) -> Result<Value, BackendError> {
        self.answer(CallKind::Query, function, args, credentials)
    }

    async fn mutation(
        &self,
        function: &str,
        args: Value,
        credentials: Credentials<'_>,
    ) -> Result<Value, BackendError> {
        self.answer(CallKind::Mutation, function, args, credentials)
    }
}

/// Gateway configuration used by the tests.
///
/// # Panics
///
/// Never in practice; the backend URL is a constant.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::new(Url::parse("https://backend.marketplace.test").unwrap());
    config.proxy.allowed_origins = vec![ALLOWED_ORIGIN.to_owned()];
    config
}

/// The full gateway over `backend`, with stub page and asset routers.
pub fn test_app(backend: Arc<FakeBackend>) -> Router {
    let state = AppState::new(test_config(), backend);
    let pages = Router::new().fallback(|| async { PAGE_BODY });
    let assets = Router::new().fallback(|| async { ASSET_BODY });
    marketplace_gateway::app_with_pages(state, pages, assets)
}

/// Read a response body as a string.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
#[allow(clippy::unwrap_used)]
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read a response body as JSON.
///
/// # Panics
///
/// Panics if the body is not valid JSON.
#[allow(clippy::unwrap_used)]
pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
