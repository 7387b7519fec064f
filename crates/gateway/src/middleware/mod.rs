//! HTTP middleware stack for the gateway.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Page proxy (route protection, CORS, security headers) on page routes,
//!    or security headers alone on `/api`
//!
//! Role checks for the API are extractors, see [`auth`].

pub mod auth;
pub mod cookies;
pub mod cors;
pub mod proxy;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireAdmin, RequireSession, RequireStaff, SessionContext};
pub use cors::CorsPolicy;
pub use proxy::{ProxyPolicy, proxy_middleware};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
