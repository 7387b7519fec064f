//! Integration tests for the page proxy.
//!
//! Drives the full gateway router with `oneshot` and checks what a browser
//! would see: redirects to sign-in, preflight answers, CORS and security
//! headers.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use marketplace_integration_tests::{
    ALLOWED_ORIGIN, ASSET_BODY, FakeBackend, PAGE_BODY, body_string, test_app,
};
use tower::util::ServiceExt;

fn app() -> Router {
    test_app(Arc::new(FakeBackend::new()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn location(response: &axum::http::Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

// =============================================================================
// Route protection
// =============================================================================

#[tokio::test]
async fn test_public_page_passes_through() {
    let response = app().oneshot(get("/products/lamp-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, PAGE_BODY);
}

#[tokio::test]
async fn test_thread_detail_is_public() {
    let response = app().oneshot(get("/t/abc123")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_new_thread_page_is_protected() {
    let response = app().oneshot(get("/t/new")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/sign-in?redirect=%2Ft%2Fnew");
}

#[tokio::test]
async fn test_protected_page_without_cookie_redirects() {
    let response = app().oneshot(get("/messages")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/sign-in?redirect=%2Fmessages");
}

#[tokio::test]
async fn test_nested_protected_page_keeps_full_path() {
    let response = app().oneshot(get("/admin/products/pending")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "/sign-in?redirect=%2Fadmin%2Fproducts%2Fpending"
    );
}

#[tokio::test]
async fn test_protected_page_with_cookie_passes_through() {
    let response = app()
        .oneshot(get_with_cookie("/messages", "theme=dark; __session=eyJhbGci"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, PAGE_BODY);
}

#[tokio::test]
async fn test_empty_session_cookie_counts_as_absent() {
    let response = app()
        .oneshot(get_with_cookie("/orders", "__session="))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_empty_duplicate_session_cookie_is_skipped() {
    let response = app()
        .oneshot(get_with_cookie("/orders", "__session=; __session=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, PAGE_BODY);
}

#[tokio::test]
async fn test_prefix_match_respects_segments() {
    // "/ordersheet" is not under "/orders"
    let response = app().oneshot(get("/ordersheet")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_uncategorized_page_passes_through() {
    let response = app().oneshot(get("/some/other/page")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_is_never_redirected() {
    let response = app().oneshot(get("/api/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::LOCATION).is_none());

    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_assets_bypass_the_proxy() {
    let response = app().oneshot(get("/assets/seller/logo.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(body_string(response).await, ASSET_BODY);
}

// =============================================================================
// Preflight and CORS
// =============================================================================

#[tokio::test]
async fn test_preflight_from_allowed_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/messages")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization"
    );
    assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");

    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn test_preflight_from_unknown_origin_has_no_cors() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/products")
        .header(header::ORIGIN, "https://elsewhere.test")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_allowed_origin_on_regular_request() {
    let request = Request::builder()
        .uri("/products")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ALLOWED_ORIGIN
    );
    assert_eq!(response.headers()[header::VARY], "Origin");
}

// =============================================================================
// Security headers
// =============================================================================

#[tokio::test]
async fn test_security_headers_on_pages_and_redirects() {
    for uri in ["/products", "/checkout"] {
        let response = app().oneshot(get(uri)).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN", "{uri}");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff", "{uri}");
        assert_eq!(
            headers[header::REFERRER_POLICY],
            "strict-origin-when-cross-origin",
            "{uri}"
        );
        assert_eq!(
            headers["permissions-policy"],
            "camera=(), microphone=(), geolocation=()",
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_security_headers_on_api() {
    let response = app().oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/products")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let response = app().oneshot(get("/products")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
