//! CORS for the page proxy.
//!
//! Only origins on the allow-list are echoed back; everyone else gets no
//! CORS headers at all and the browser does the rest.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, VARY,
    },
};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Origin allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    #[must_use]
    pub fn new(allowed_origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed_origins: allowed_origins
                .into_iter()
                .map(|origin| origin.into().trim_end_matches('/').to_owned())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    /// Add CORS headers for `origin` if it is allowed.
    ///
    /// Returns whether headers were added.
    pub fn apply(&self, headers: &mut HeaderMap, origin: Option<&HeaderValue>) -> bool {
        let Some(origin) = origin.filter(|o| o.to_str().is_ok_and(|o| self.is_allowed(o))) else {
            return false;
        };

        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        // Responses differ per origin
        headers.append(VARY, HeaderValue::from_static("Origin"));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origin_is_echoed() {
        let policy = CorsPolicy::new(["https://shop.example/"]);
        let origin = HeaderValue::from_static("https://shop.example");
        let mut headers = HeaderMap::new();

        assert!(policy.apply(&mut headers, Some(&origin)));
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://shop.example");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);
        assert_eq!(headers[VARY], "Origin");
    }

    #[test]
    fn test_unknown_origin_gets_nothing() {
        let policy = CorsPolicy::new(["https://shop.example"]);
        let origin = HeaderValue::from_static("https://evil.example");
        let mut headers = HeaderMap::new();

        assert!(!policy.apply(&mut headers, Some(&origin)));
        assert!(!policy.apply(&mut headers, None));
        assert!(headers.is_empty());
    }
}
