//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{Backend, HttpBackend};
use crate::config::GatewayConfig;
use crate::middleware::ProxyPolicy;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc` and read-only after start-up.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    proxy: ProxyPolicy,
    backend: Arc<dyn Backend>,
}

impl AppState {
    /// Create state around an existing backend.
    ///
    /// Tests pass an in-memory fake here.
    #[must_use]
    pub fn new(config: GatewayConfig, backend: Arc<dyn Backend>) -> Self {
        let proxy = ProxyPolicy::from_settings(&config.proxy);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                proxy,
                backend,
            }),
        }
    }

    /// Create state talking to the configured backend over HTTP.
    #[must_use]
    pub fn from_config(config: GatewayConfig) -> Self {
        let backend = Arc::new(HttpBackend::new(&config.backend));
        Self::new(config, backend)
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn proxy(&self) -> &ProxyPolicy {
        &self.inner.proxy
    }

    /// The backend client.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }
}
