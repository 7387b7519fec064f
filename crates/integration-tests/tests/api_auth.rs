//! Integration tests for the JSON API.
//!
//! Covers the role matrix (anonymous, customer, moderator, admin) and checks
//! that handlers call the right backend functions with the caller's token.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use marketplace_core::Role;
use marketplace_gateway::backend::functions;
use marketplace_integration_tests::{CallKind, FakeBackend, body_json, test_app};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn backend() -> FakeBackend {
    FakeBackend::new()
        .with_user("customer-token", Role::Customer)
        .with_user("seller-token", Role::Seller)
        .with_user("moderator-token", Role::Moderator)
        .with_user("admin-token", Role::Admin)
}

fn get_as(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("__session={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_as(uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, format!("__session={token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn status_of(backend: FakeBackend, request: Request<Body>) -> StatusCode {
    test_app(Arc::new(backend))
        .oneshot(request)
        .await
        .unwrap()
        .status()
}

// =============================================================================
// Role matrix
// =============================================================================

#[tokio::test]
async fn test_no_cookie_is_unauthorized() {
    let response = test_app(Arc::new(backend()))
        .oneshot(get_as("/api/admin/dashboard", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Sign in required");
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let status = status_of(backend(), get_as("/api/me", Some("forged-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_on_staff_route_is_forbidden() {
    let status = status_of(
        backend(),
        get_as("/api/admin/dashboard", Some("customer-token")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_seller_on_staff_route_is_forbidden() {
    let status = status_of(
        backend(),
        get_as("/api/admin/products/pending", Some("seller-token")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_moderator_on_staff_route_is_allowed() {
    let backend = backend().with_answer(
        functions::ADMIN_DASHBOARD_STATS,
        json!({
            "totalUsers": 120,
            "totalSellers": 8,
            "totalProducts": 340,
            "totalOrders": 57,
            "pendingProducts": 3,
            "pendingSellers": 1,
            "totalRevenue": "1520.50"
        }),
    );
    let response = test_app(Arc::new(backend))
        .oneshot(get_as("/api/admin/dashboard", Some("moderator-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["state"], "populated");
    assert_eq!(body["data"]["pendingProducts"], 3);
}

#[tokio::test]
async fn test_moderator_on_admin_route_is_forbidden() {
    let status = status_of(
        backend(),
        get_as("/api/admin/sellers/pending", Some("moderator-token")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_on_admin_route_is_allowed() {
    let backend = backend().with_answer(functions::ADMIN_LIST_PENDING_SELLERS, json!([]));
    let response = test_app(Arc::new(backend))
        .oneshot(get_as("/api/admin/sellers/pending", Some("admin-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["state"], "empty");
}

#[tokio::test]
async fn test_bearer_header_is_accepted() {
    let request = Request::builder()
        .uri("/api/me")
        .header(header::AUTHORIZATION, "Bearer admin-token")
        .body(Body::empty())
        .unwrap();
    let response = test_app(Arc::new(backend())).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], "user-admin-token");
    assert_eq!(body["role"], "admin");
}

// =============================================================================
// Backend calls
// =============================================================================

#[tokio::test]
async fn test_approve_product_calls_backend_with_token() {
    let backend = Arc::new(backend());
    let response = test_app(Arc::clone(&backend))
        .oneshot(post_as(
            "/api/admin/products/p1/approve",
            "moderator-token",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, CallKind::Mutation);
    assert_eq!(calls[0].function, functions::ADMIN_APPROVE_PRODUCT);
    assert_eq!(calls[0].args, json!({"productId": "p1"}));
    assert_eq!(calls[0].token.as_deref(), Some("moderator-token"));
}

#[tokio::test]
async fn test_reject_product_passes_reason() {
    let backend = Arc::new(backend());
    let response = test_app(Arc::clone(&backend))
        .oneshot(post_as(
            "/api/admin/products/p2/reject",
            "admin-token",
            Some(json!({"reason": "Blurry photos"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        backend.calls()[0].args,
        json!({"productId": "p2", "reason": "Blurry photos"})
    );
}

#[tokio::test]
async fn test_backend_function_error_is_bad_request() {
    let backend = backend().with_error(functions::ADMIN_APPROVE_SELLER, "Seller already approved");
    let response = test_app(Arc::new(backend))
        .oneshot(post_as("/api/admin/sellers/s1/approve", "admin-token", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Seller already approved");
}

#[tokio::test]
async fn test_update_user_role() {
    let backend = Arc::new(backend());
    let response = test_app(Arc::clone(&backend))
        .oneshot(post_as(
            "/api/admin/users/u9/role",
            "admin-token",
            Some(json!({"role": "moderator"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        backend.calls()[0].args,
        json!({"userId": "u9", "role": "moderator"})
    );
}

#[tokio::test]
async fn test_update_fulfillment_needs_only_a_session() {
    let backend = Arc::new(backend());
    let response = test_app(Arc::clone(&backend))
        .oneshot(post_as(
            "/api/orders/o1/fulfillment",
            "seller-token",
            Some(json!({"status": "shipped"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        backend.calls()[0].args,
        json!({"orderId": "o1", "status": "shipped"})
    );
}

#[tokio::test]
async fn test_create_category() {
    let backend = Arc::new(backend().with_answer(functions::CATEGORIES_CREATE, json!("c42")));

    let response = test_app(Arc::clone(&backend))
        .oneshot(post_as(
            "/api/categories",
            "admin-token",
            Some(json!({"name": "Garden", "slug": "garden"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["id"], "c42");

    let status = status_of(
        FakeBackend::new().with_user("admin-token", Role::Admin),
        post_as(
            "/api/categories",
            "admin-token",
            Some(json!({"name": "Garden", "slug": "Not A Slug"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Public reads
// =============================================================================

#[tokio::test]
async fn test_public_categories_are_anonymous() {
    let backend = Arc::new(backend().with_answer(
        functions::CATEGORIES_LIST,
        json!([{"_id": "c1", "name": "Home", "slug": "home"}]),
    ));
    let response = test_app(Arc::clone(&backend))
        .oneshot(get_as("/api/categories", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["state"], "populated");
    assert_eq!(body["data"][0]["slug"], "home");
    assert_eq!(backend.calls()[0].token, None);
}

#[tokio::test]
async fn test_answered_reads_are_never_pending() {
    let response = test_app(Arc::new(backend()))
        .oneshot(get_as("/api/forum/leaderboard", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["state"], "empty");

    let answered_empty = backend().with_answer(functions::FORUM_LEADERBOARD, json!([]));
    let response = test_app(Arc::new(answered_empty))
        .oneshot(get_as("/api/forum/leaderboard", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["state"], "empty");

    let no_stats = backend().with_answer(functions::REVIEWS_STATS, Value::Null);
    let response = test_app(Arc::new(no_stats))
        .oneshot(get_as("/api/products/p1/reviews/stats", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["state"], "empty");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_leaderboard_limit_is_clamped() {
    let backend = Arc::new(backend());
    test_app(Arc::clone(&backend))
        .oneshot(get_as("/api/forum/leaderboard?limit=500", None))
        .await
        .unwrap();
    assert_eq!(backend.calls()[0].args, json!({"limit": 100}));
}

#[tokio::test]
async fn test_review_stats() {
    let backend = Arc::new(backend().with_answer(
        functions::REVIEWS_STATS,
        json!({"averageRating": 4.5, "totalReviews": 2, "distribution": [0, 0, 0, 1, 1]}),
    ));
    let response = test_app(Arc::clone(&backend))
        .oneshot(get_as("/api/products/p7/reviews/stats", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["totalReviews"], 2);
    assert_eq!(backend.calls()[0].args, json!({"productId": "p7"}));
}

#[tokio::test]
async fn test_unknown_api_path_is_json_404() {
    let response = test_app(Arc::new(backend()))
        .oneshot(get_as("/api/nope", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());
}
