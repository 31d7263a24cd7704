use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    auth::{require_author, AuthError, AuthenticatedUser},
    constants::{MAX_TITLE_LENGTH, POSTS_PER_PAGE},
    error::BlogError,
    flash,
    models::{Post, PostDetail, PostPage},
    repositories::{
        comment_repository, like_repository,
        post_repository::{self, CreatePostData, UpdatePostData},
        user_repository,
    },
    utils::{paginate, PageParams, PostId},
    AppState,
};

/// Title and content as submitted by the create and update forms.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl PostForm {
    /// Returns the trimmed title and content, or the first invalid field.
    pub fn validate(&self) -> Result<(String, String), BlogError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(BlogError::validation("title", "This field is required."));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(BlogError::validation(
                "title",
                format!("Ensure this value has at most {} characters.", MAX_TITLE_LENGTH),
            ));
        }

        let content = self.content.trim();
        if content.is_empty() {
            return Err(BlogError::validation("content", "This field is required."));
        }

        Ok((title.to_string(), content.to_string()))
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
        }
    }
}

async fn fetch_post(state: &AppState, post_id: i64) -> Result<Post, BlogError> {
    post_repository::get_post_by_id(&state.db_pool, post_id)
        .await?
        .ok_or(BlogError::NotFound("Post"))
}

/// Handler for the home page: every post, newest first, five per page.
pub async fn list_posts_handler(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PostPage>, BlogError> {
    let count = post_repository::count_posts(&state.db_pool).await?;
    let page = paginate(count, POSTS_PER_PAGE, params.requested())?;
    let posts = post_repository::list_posts(&state.db_pool, &page).await?;
    Ok(Json(PostPage { posts, page }))
}

/// Handler listing one author's posts, newest first.
pub async fn user_posts_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<PostPage>, BlogError> {
    let author = user_repository::get_user_by_username(&state.db_pool, &username)
        .await?
        .ok_or(BlogError::NotFound("User"))?;

    let count = post_repository::count_posts_by_author(&state.db_pool, author.id).await?;
    let page = paginate(count, POSTS_PER_PAGE, params.requested())?;
    let posts = post_repository::list_posts_by_author(&state.db_pool, author.id, &page).await?;
    Ok(Json(PostPage { posts, page }))
}

/// Handler for a single post with its comments and like state.
///
/// Authentication is optional here; anonymous viewers never count as likers.
/// Credentials that are sent but fail to authenticate are rejected.
/// Pending flash messages are returned and cleared.
pub async fn post_detail_handler(
    State(state): State<AppState>,
    PostId(post_id): PostId,
    viewer: Result<AuthenticatedUser, AuthError>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<PostDetail>), BlogError> {
    let viewer = match viewer {
        Ok(user) => Some(user),
        Err(AuthError::MissingOrInvalidHeaders) => None,
        Err(e) => return Err(e.into()),
    };

    let post = fetch_post(&state, post_id).await?;
    let comments = comment_repository::get_comments_for_post(&state.db_pool, post_id).await?;
    let total_likes = like_repository::count_likes(&state.db_pool, post_id).await?;
    let liked = match &viewer {
        Some(user) => like_repository::has_liked(&state.db_pool, post_id, user.id()).await?,
        None => false,
    };

    let (jar, messages) = flash::take(jar);
    Ok((
        jar,
        Json(PostDetail {
            post,
            comments,
            total_likes,
            liked,
            messages,
        }),
    ))
}

/// Empty form for a new post.
pub async fn new_post_form_handler(_user: AuthenticatedUser) -> Json<PostForm> {
    Json(PostForm::default())
}

/// Handler to create a post authored by the requesting user.
pub async fn create_post_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Form(form): Form<PostForm>,
) -> Result<Redirect, BlogError> {
    let (title, content) = form.validate()?;

    let post = post_repository::create_post(
        &state.db_pool,
        CreatePostData {
            author_id: user.id(),
            title,
            content,
        },
    )
    .await?;

    info!(post_id = post.id, author = %user.username(), "Successfully created post");
    Ok(Redirect::to(&post.url()))
}

/// Current values of a post, for its author to edit.
pub async fn edit_post_form_handler(
    State(state): State<AppState>,
    PostId(post_id): PostId,
    user: AuthenticatedUser,
) -> Result<Json<PostForm>, BlogError> {
    let post = fetch_post(&state, post_id).await?;
    require_author(&user, &post)?;
    Ok(Json(PostForm::from(&post)))
}

/// Handler to update a post's title and content. Author only.
pub async fn update_post_handler(
    State(state): State<AppState>,
    PostId(post_id): PostId,
    user: AuthenticatedUser,
    Form(form): Form<PostForm>,
) -> Result<Redirect, BlogError> {
    let post = fetch_post(&state, post_id).await?;
    require_author(&user, &post)?;
    let (title, content) = form.validate()?;

    let updated = post_repository::update_post(&state.db_pool, post_id, UpdatePostData { title, content })
        .await?
        .ok_or(BlogError::NotFound("Post"))?;

    info!(post_id = updated.id, "Successfully updated post");
    Ok(Redirect::to(&updated.url()))
}

/// The post about to be deleted, for its author to confirm.
pub async fn delete_post_confirm_handler(
    State(state): State<AppState>,
    PostId(post_id): PostId,
    user: AuthenticatedUser,
) -> Result<Json<Post>, BlogError> {
    let post = fetch_post(&state, post_id).await?;
    require_author(&user, &post)?;
    Ok(Json(post))
}

/// Handler to delete a post. Author only; redirects to the site root.
pub async fn delete_post_handler(
    State(state): State<AppState>,
    PostId(post_id): PostId,
    user: AuthenticatedUser,
) -> Result<Redirect, BlogError> {
    let post = fetch_post(&state, post_id).await?;
    require_author(&user, &post)?;

    match post_repository::delete_post(&state.db_pool, post_id).await? {
        0 => Err(BlogError::NotFound("Post")),
        _ => {
            info!(post_id, deleted_by = %user.username(), "Successfully deleted post");
            Ok(Redirect::to("/"))
        }
    }
}
