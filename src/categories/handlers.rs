use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    categories::{repo::Category, services::CreateCategoryRequest},
    errors::AppError,
    extract::{parse_id, AppJson},
    response::Success,
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", get(get_category))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Success<Vec<Category>>, AppError> {
    let categories = state.categories.list().await?;
    Ok(Success::ok("Categories retrieved successfully", categories))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Success<Category>, AppError> {
    let id = parse_id(&id, AppError::CategoryNotFound)?;
    let category = state.categories.get(id).await?;
    Ok(Success::ok("Category retrieved successfully", category))
}

#[instrument(skip(state, payload), fields(user_id = %user.id))]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(mut payload): AppJson<CreateCategoryRequest>,
) -> Result<Success<Category>, AppError> {
    payload.validate()?;
    let category = state.categories.create(&payload.name, &payload.slug).await?;
    Ok(Success::created("Category created successfully", category))
}
