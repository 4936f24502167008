use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    errors::AppError,
    extract::{parse_id, AppJson, AppQuery},
    posts::{
        dto::{CreatePostRequest, ListQuery, UpdatePostRequest},
        repo_types::PostView,
    },
    response::Success,
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/slug/:slug", get(get_post_by_slug))
        .route(
            "/posts/:id",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route("/me/posts", get(list_my_posts))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Success<Vec<PostView>>, AppError> {
    let (page, limit) = query.resolve();
    let (posts, pagination) = state.posts.list(page, limit).await?;
    Ok(Success::ok("Posts retrieved successfully", posts).with_pagination(pagination))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Success<PostView>, AppError> {
    let id = parse_id(&id, AppError::PostNotFound)?;
    let post = state.posts.get_by_id(id).await?;
    Ok(Success::ok("Post retrieved successfully", post))
}

#[instrument(skip(state))]
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Success<PostView>, AppError> {
    let post = state.posts.get_by_slug(&slug).await?;
    Ok(Success::ok("Post retrieved successfully", post))
}

#[instrument(skip(state, payload), fields(user_id = %user.id))]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> Result<Success<PostView>, AppError> {
    let input = payload.validate()?;
    let post = state.posts.create(user.id, input).await?;
    Ok(Success::created("Post created successfully", post))
}

#[instrument(skip(state, payload), fields(user_id = %user.id))]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> Result<Success<PostView>, AppError> {
    let id = parse_id(&id, AppError::PostNotFound)?;
    let changes = payload.validate()?;
    let post = state.posts.update(id, user.id, changes).await?;
    Ok(Success::ok("Post updated successfully", post))
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Success<()>, AppError> {
    let id = parse_id(&id, AppError::PostNotFound)?;
    state.posts.delete(id, user.id).await?;
    Ok(Success::empty("Post deleted successfully"))
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn list_my_posts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Success<Vec<PostView>>, AppError> {
    let posts = state.posts.list_by_user(user.id).await?;
    Ok(Success::ok("My posts retrieved successfully", posts))
}
