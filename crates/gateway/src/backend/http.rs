//! HTTP implementation of [`Backend`].
//!
//! Calls `POST {url}/api/query` and `POST {url}/api/mutation` with
//! `{"path": "module:function", "args": {...}, "format": "json"}`.
//! Anonymous query results are cached; any mutation clears the cache.
//! A query that started before a mutation finished never leaves its
//! answer in the cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::{Backend, BackendError, Credentials, function_path};
use crate::config::BackendConfig;

/// Maximum number of cached query results.
const CACHE_CAPACITY: u64 = 1000;

#[derive(Debug, Clone, Copy)]
enum CallKind {
    Query,
    Mutation,
}

impl CallKind {
    const fn endpoint(self) -> &'static str {
        match self {
            Self::Query => "api/query",
            Self::Mutation => "api/mutation",
        }
    }
}

#[derive(Serialize)]
struct FunctionRequest<'a> {
    path: &'a str,
    args: &'a Value,
    format: &'static str,
}

#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
enum FunctionResponse {
    Success {
        value: Value,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        error_message: String,
        #[serde(default)]
        error_data: Option<Value>,
    },
}

/// Client for the backend's HTTP function API.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    base_url: Url,
    deploy_key: Option<SecretString>,
    cache: QueryCache,
}

/// Anonymous query results, stamped with a write generation.
struct QueryCache {
    entries: Cache<String, Value>,
    /// Bumped by every mutation.
    generation: AtomicU64,
}

impl QueryCache {
    fn new(ttl: std::time::Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
            generation: AtomicU64::new(0),
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).await
    }

    /// Cache `value`, read while the cache was at generation `read_at`.
    ///
    /// If a mutation finished in the meantime the entry is dropped again.
    async fn insert(&self, key: String, value: Value, read_at: u64) {
        if self.generation() != read_at {
            return;
        }
        self.entries.insert(key.clone(), value).await;
        if self.generation() != read_at {
            self.entries.invalidate(&key).await;
        }
    }

    fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.invalidate_all();
    }
}

impl HttpBackend {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = QueryCache::new(config.cache_ttl);

        Self {
            inner: Arc::new(HttpBackendInner {
                client: reqwest::Client::new(),
                base_url: config.url.clone(),
                deploy_key: config.deploy_key.clone(),
                cache,
            }),
        }
    }

    fn endpoint(&self, kind: CallKind) -> Result<Url, BackendError> {
        self.inner
            .base_url
            .join(kind.endpoint())
            .map_err(|e| BackendError::Unexpected(format!("invalid backend URL: {e}")))
    }

    /// Execute a function call.
    #[instrument(skip(self, args, credentials), fields(path = tracing::field::Empty))]
    async fn call(
        &self,
        kind: CallKind,
        function: &str,
        args: &Value,
        credentials: Credentials<'_>,
    ) -> Result<Value, BackendError> {
        let path = function_path(function);
        tracing::Span::current().record("path", path.as_str());

        let mut request = self
            .inner
            .client
            .post(self.endpoint(kind)?)
            .json(&FunctionRequest {
                path: &path,
                args,
                format: "json",
            });

        request = match credentials {
            Credentials::Anonymous => request,
            Credentials::User(token) => request.bearer_auth(token),
            Credentials::Deployment => {
                let key = self
                    .inner
                    .deploy_key
                    .as_ref()
                    .ok_or(BackendError::MissingDeployKey)?;
                request.header(
                    reqwest::header::AUTHORIZATION,
                    format!("Convex {}", key.expose_secret()),
                )
            }
        };

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthenticated);
        }

        // Function errors arrive as 4xx/5xx with the same JSON body, so read it first
        let body = response.text().await?;
        let parsed: FunctionResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned an unparseable response"
                );
                return Err(if status.is_success() {
                    BackendError::Parse(e)
                } else {
                    BackendError::Unexpected(format!("HTTP {status}"))
                });
            }
        };

        match parsed {
            FunctionResponse::Success { value } => Ok(value),
            FunctionResponse::Error {
                error_message,
                error_data,
            } => {
                debug!(%status, error = %error_message, "backend function returned an error");
                Err(BackendError::Function {
                    function: function.to_owned(),
                    message: error_message,
                    data: error_data,
                })
            }
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn query(
        &self,
        function: &str,
        args: Value,
        credentials: Credentials<'_>,
    ) -> Result<Value, BackendError> {
        if credentials != Credentials::Anonymous {
            return self.call(CallKind::Query, function, &args, credentials).await;
        }

        let key = format!("{}|{args}", function_path(function));
        if let Some(cached) = self.inner.cache.get(&key).await {
            debug!(cache_key = %key, "Cache hit for query");
            return Ok(cached);
        }

        let read_at = self.inner.cache.generation();
        let value = self.call(CallKind::Query, function, &args, credentials).await?;
        self.inner.cache.insert(key, value.clone(), read_at).await;
        Ok(value)
    }

    async fn mutation(
        &self,
        function: &str,
        args: Value,
        credentials: Credentials<'_>,
    ) -> Result<Value, BackendError> {
        let result = self
            .call(CallKind::Mutation, function, &args, credentials)
            .await;
        // Writes may change any cached read
        self.inner.cache.invalidate_all();
        result
    }
}
