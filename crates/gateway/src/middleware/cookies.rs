//! Reading cookies from request headers.

use axum::http::{HeaderMap, header::COOKIE};

/// Value of the cookie called `name`, if present and non-empty.
///
/// Looks through every `Cookie` header; the first non-empty match wins.
#[must_use]
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .find(|value| !value.is_empty())
}
