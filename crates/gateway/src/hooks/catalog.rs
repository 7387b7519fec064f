//! Categories.

use marketplace_core::{CategoryId, Loadable};
use tracing::instrument;

use super::{decode_list, no_args};
use crate::backend::types::{Category, NewCategory};
use crate::backend::{Backend, BackendError, Credentials, functions};

/// All catalog categories.
///
/// # Errors
///
/// Returns `BackendError` if the call fails or the answer is malformed.
pub async fn list_categories(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
) -> Result<Loadable<Vec<Category>>, BackendError> {
    let value = backend
        .query(functions::CATEGORIES_LIST, no_args(), credentials)
        .await?;
    decode_list(value)
}

/// Create a category and return its ID.
///
/// # Errors
///
/// Returns `BackendError` if the backend refuses the category or answers
/// with something other than an ID.
#[instrument(skip(backend, credentials, category), fields(slug = %category.slug))]
pub async fn create_category(
    backend: &dyn Backend,
    credentials: Credentials<'_>,
    category: &NewCategory,
) -> Result<CategoryId, BackendError> {
    let value = backend
        .mutation(
            functions::CATEGORIES_CREATE,
            serde_json::to_value(category)?,
            credentials,
        )
        .await?;
    let id: CategoryId = serde_json::from_value(value)?;
    tracing::info!(category_id = %id, "Category created");
    Ok(id)
}
