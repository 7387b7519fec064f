//! Client for the managed backend's function API.
//!
//! # Architecture
//!
//! - The backend is the source of truth; nothing is stored locally
//! - Functions are addressed by dotted names (`admin.getDashboardStats`)
//! - Queries are reads, mutations are writes; both are request/response RPCs
//! - Anonymous query results are cached in memory via `moka`
//!
//! The [`Backend`] trait is the seam between the gateway and the deployment,
//! so route tests can run against an in-memory fake.

pub mod functions;
mod http;
pub mod subscription;
pub mod types;

pub use http::HttpBackend;
pub use subscription::{subscribe_query, watch_session};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when calling backend functions.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The function ran and reported an error.
    #[error("{function} failed: {message}")]
    Function {
        function: String,
        message: String,
        data: Option<Value>,
    },

    /// The caller's token was rejected.
    #[error("not authenticated")]
    Unauthenticated,

    /// A deployment-level call was made without a deployment key.
    #[error("no deployment key configured")]
    MissingDeployKey,

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Unexpected response status or shape.
    #[error("unexpected backend response: {0}")]
    Unexpected(String),
}

/// Whose authority a call runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials<'a> {
    /// No identity; the function sees an anonymous caller.
    Anonymous,
    /// A signed-in user's auth token (from the session cookie).
    User(&'a str),
    /// The deployment key; reserved for operator tooling.
    Deployment,
}

impl<'a> Credentials<'a> {
    /// `User` when a token is present, otherwise `Anonymous`.
    #[must_use]
    pub fn from_token(token: Option<&'a str>) -> Self {
        token.map_or(Self::Anonymous, Self::User)
    }
}

/// Remote function surface of the managed backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Run a read-only query function.
    async fn query(
        &self,
        function: &str,
        args: Value,
        credentials: Credentials<'_>,
    ) -> Result<Value, BackendError>;

    /// Run a mutation function.
    async fn mutation(
        &self,
        function: &str,
        args: Value,
        credentials: Credentials<'_>,
    ) -> Result<Value, BackendError>;
}

/// Convert a dotted function name into the backend's `module:function` path.
///
/// Nested modules become directories: `admin.products.approve` is
/// `admin/products:approve`. Paths that already contain `:` pass unchanged.
#[must_use]
pub fn function_path(name: &str) -> String {
    if name.contains(':') {
        return name.to_owned();
    }
    match name.rsplit_once('.') {
        Some((module, function)) => format!("{}:{function}", module.replace('.', "/")),
        None => name.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_path() {
        assert_eq!(
            function_path("admin.getDashboardStats"),
            "admin:getDashboardStats"
        );
        assert_eq!(
            function_path("admin.products.approve"),
            "admin/products:approve"
        );
        assert_eq!(function_path("users:viewer"), "users:viewer");
        assert_eq!(function_path("health"), "health");
    }

    #[test]
    fn test_credentials_from_token() {
        assert_eq!(Credentials::from_token(None), Credentials::Anonymous);
        assert_eq!(Credentials::from_token(Some("jwt")), Credentials::User("jwt"));
    }
}
