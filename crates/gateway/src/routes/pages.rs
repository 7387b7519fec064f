//! The app shell.
//!
//! Pages are rendered client-side. Every path that is not an asset gets the
//! shell's `index.html` and the client router takes it from there.
//!
//! Built assets live under [`ASSETS_PATH`] and are served outside the page
//! proxy, so a logo never redirects to sign-in.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;

/// Mount point for built assets, relative to the site directory too.
pub const ASSETS_PATH: &str = "/assets";

/// Serve `site_dir`, falling back to its `index.html`.
pub fn page_routes(site_dir: &Path) -> Router<AppState> {
    let shell = ServeFile::new(site_dir.join("index.html"));
    Router::new().fallback_service(ServeDir::new(site_dir).not_found_service(shell))
}

/// Serve `site_dir/assets`; missing files are a plain 404.
pub fn asset_routes(site_dir: &Path) -> Router {
    let dir = site_dir.join(ASSETS_PATH.trim_start_matches('/'));
    Router::new().fallback_service(ServeDir::new(dir))
}
