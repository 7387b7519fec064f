//! Marketplace gateway library.
//!
//! The gateway sits in front of the marketplace apps. It protects page
//! routes with the session-cookie proxy, serves the app shell, and exposes a
//! small JSON API over the managed backend's functions.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod hooks;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router, serving pages from the configured
/// site directory.
pub fn app(state: AppState) -> Router {
    let site_dir = &state.config().site_dir;
    let pages = routes::pages::page_routes(site_dir);
    let assets = routes::pages::asset_routes(site_dir);
    app_with_pages(state, pages, assets)
}

/// Build the application router around the given page and asset routers.
///
/// The proxy wraps only `pages`. `/health`, `/api` and the assets under
/// [`routes::pages::ASSETS_PATH`] are never redirected.
pub fn app_with_pages(state: AppState, pages: Router<AppState>, assets: Router) -> Router {
    let assets = assets.layer(from_fn(middleware::security_headers_middleware));

    let pages = pages
        .layer(from_fn_with_state(state.clone(), middleware::proxy_middleware))
        .with_state(state.clone());

    let api = routes::api_routes().layer(from_fn(middleware::security_headers_middleware));

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", api)
        .nest_service(routes::pages::ASSETS_PATH, assets)
        .fallback_service(pages)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
