use axum::{
    extract::State,
    response::Redirect,
};
use tracing::info;

use crate::{
    auth::AuthenticatedUser,
    error::BlogError,
    models::post_url,
    repositories::{like_repository, post_repository},
    utils::PostId,
    AppState,
};

/// Handler that likes the post for the requesting user, or unlikes it if
/// they already did, then sends them back to the post.
pub async fn toggle_like_handler(
    State(state): State<AppState>,
    PostId(post_id): PostId,
    user: AuthenticatedUser,
) -> Result<Redirect, BlogError> {
    post_repository::get_post_by_id(&state.db_pool, post_id)
        .await?
        .ok_or(BlogError::NotFound("Post"))?;

    let liked = like_repository::toggle_like(&state.db_pool, post_id, user.id()).await?;
    info!(post_id, user_id = user.id(), liked, "Toggled like");

    Ok(Redirect::to(&post_url(post_id)))
}
