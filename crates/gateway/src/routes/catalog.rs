//! Category route handlers.

use axum::{Json, extract::State, http::StatusCode};
use marketplace_core::{CategoryId, Loadable};
use serde::Serialize;

use crate::backend::Credentials;
use crate::backend::types::{Category, NewCategory};
use crate::error::{AppError, Result};
use crate::hooks;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: CategoryId,
}

/// List categories. Public.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Loadable<Vec<Category>>>> {
    let categories = hooks::list_categories(state.backend(), Credentials::Anonymous).await?;
    Ok(Json(categories))
}

/// Create a category.
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Json(category): Json<NewCategory>,
) -> Result<(StatusCode, Json<Created>)> {
    category.validate().map_err(AppError::BadRequest)?;
    let id = hooks::create_category(state.backend(), session.credentials(), &category).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}
