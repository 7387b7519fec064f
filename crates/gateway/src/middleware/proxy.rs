//! Page proxy: route protection, CORS and security headers.
//!
//! Runs in front of every page route. It only looks for the presence of the
//! session cookie; whether the session is valid is the backend's business.
//! The proxy never fails a request of its own: it answers a preflight,
//! redirects to sign-in, or passes through.

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::ORIGIN},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use marketplace_core::routes::{ProxyDecision, RouteRequest, RouteTable};

use super::cookies::cookie_value;
use super::cors::CorsPolicy;
use super::security_headers::apply_security_headers;
use crate::config::ProxySettings;
use crate::state::AppState;

/// Everything the proxy needs, built once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyPolicy {
    routes: RouteTable,
    cors: CorsPolicy,
    session_cookie: String,
}

impl ProxyPolicy {
    #[must_use]
    pub fn from_settings(settings: &ProxySettings) -> Self {
        Self {
            routes: RouteTable::new(
                settings.public_prefixes.iter().map(String::as_str),
                settings.protected_prefixes.iter().map(String::as_str),
            )
            .with_sign_in(&settings.sign_in_path, &settings.redirect_param),
            cors: CorsPolicy::new(&settings.allowed_origins),
            session_cookie: settings.session_cookie.clone(),
        }
    }

    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub const fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    #[must_use]
    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }
}

/// Classify the request and protect it if needed.
///
/// - `OPTIONS` is answered with an empty `204`.
/// - A protected path without the session cookie is redirected (`307`) to
///   sign-in, carrying the original path.
/// - Everything else goes through to the app.
///
/// Security headers are set on every response, and CORS headers when the
/// `Origin` is allowed.
pub async fn proxy_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let policy = state.proxy();
    let origin = request.headers().get(ORIGIN).cloned();
    let has_session = cookie_value(request.headers(), policy.session_cookie()).is_some();

    let decision = policy.routes().decide(&RouteRequest {
        method: request.method().as_str(),
        path: request.uri().path(),
        has_session,
    });

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        has_session,
        decision = ?decision,
        "Proxy decision"
    );

    let mut response = match decision {
        ProxyDecision::Preflight => StatusCode::NO_CONTENT.into_response(),
        ProxyDecision::Redirect { location } => Redirect::temporary(&location).into_response(),
        ProxyDecision::PassThrough(_) => next.run(request).await,
    };

    let headers = response.headers_mut();
    apply_security_headers(headers);
    policy.cors().apply(headers, origin.as_ref());

    response
}

#[cfg(test)]
mod tests {
    use marketplace_core::routes::RouteClass;

    use super::*;

    #[test]
    fn test_policy_from_settings() {
        let settings = ProxySettings {
            allowed_origins: vec!["https://admin.example".to_owned()],
            public_prefixes: vec!["/".to_owned(), "/shop".to_owned()],
            protected_prefixes: vec!["/vault".to_owned()],
            session_cookie: "sid".to_owned(),
            sign_in_path: "/login".to_owned(),
            redirect_param: "next".to_owned(),
        };
        let policy = ProxyPolicy::from_settings(&settings);

        assert_eq!(policy.session_cookie(), "sid");
        assert!(policy.cors().is_allowed("https://admin.example"));
        assert_eq!(policy.routes().classify("/shop/lamps"), RouteClass::Public);
        assert_eq!(
            policy.routes().decide(&RouteRequest {
                method: "GET",
                path: "/vault/keys",
                has_session: false,
            }),
            ProxyDecision::Redirect {
                location: "/login?next=%2Fvault%2Fkeys".to_owned()
            }
        );
    }

    #[test]
    fn test_default_settings_protect_messages() {
        let policy = ProxyPolicy::from_settings(&ProxySettings::default());
        assert_eq!(policy.routes().classify("/messages"), RouteClass::Protected);
        assert_eq!(policy.routes().classify("/t/abc123"), RouteClass::Public);
        assert_eq!(policy.routes().classify("/t/new"), RouteClass::Protected);
    }
}
