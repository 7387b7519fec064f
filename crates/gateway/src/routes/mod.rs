//! HTTP routes for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                               - Liveness check
//!
//! # Session
//! GET  /api/me                               - Signed-in account
//!
//! # Admin (staff: admin or moderator)
//! GET  /api/admin/dashboard                  - Dashboard numbers
//! GET  /api/admin/products/pending           - Products awaiting moderation
//! POST /api/admin/products/{id}/approve      - Approve a product
//! POST /api/admin/products/{id}/reject       - Reject a product
//!
//! # Admin (admin only)
//! GET  /api/admin/sellers/pending            - Seller applications
//! POST /api/admin/sellers/{id}/approve       - Approve a seller
//! POST /api/admin/users/{id}/role            - Change an account's role
//! POST /api/categories                       - Create a category
//!
//! # Signed in
//! POST /api/orders/{id}/fulfillment          - Update fulfillment status
//!
//! # Public
//! GET  /api/categories                       - List categories
//! GET  /api/products/{id}/reviews/stats      - Review numbers for a product
//! GET  /api/forum/leaderboard?limit=         - Top forum contributors
//!
//! # Pages
//! GET  /assets/*                             - Built assets, no proxy
//! *    everything else                       - App shell, behind the proxy
//! ```

pub mod admin;
pub mod catalog;
pub mod community;
pub mod orders;
pub mod pages;
pub mod session;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the JSON API router, to be nested under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(session::me))
        .nest("/admin", admin_routes())
        .route("/orders/{id}/fulfillment", post(orders::update_fulfillment))
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/products/{id}/reviews/stats", get(community::review_stats))
        .route("/forum/leaderboard", get(community::leaderboard))
        .fallback(api_not_found)
}

/// Create the admin API router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/products/pending", get(admin::pending_products))
        .route("/products/{id}/approve", post(admin::approve_product))
        .route("/products/{id}/reject", post(admin::reject_product))
        .route("/sellers/pending", get(admin::pending_sellers))
        .route("/sellers/{id}/approve", post(admin::approve_seller))
        .route("/users/{id}/role", post(admin::update_user_role))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
pub async fn health() -> &'static str {
    "ok"
}

/// Unknown API paths get a JSON 404 instead of the app shell.
pub async fn api_not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}
