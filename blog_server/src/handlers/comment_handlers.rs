use axum::{
    extract::State,
    response::Redirect,
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    auth::AuthenticatedUser,
    error::BlogError,
    flash::{self, FlashMessage},
    repositories::{
        comment_repository::{self, CreateCommentData},
        post_repository,
    },
    utils::PostId,
    AppState,
};

/// Comment body plus the comment being replied to, if any.
/// An absent or empty `parentId` means a top-level comment.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
}

impl CommentForm {
    pub fn empty() -> Self {
        Self {
            comment: String::new(),
            parent_id: Some(String::new()),
        }
    }

    fn body(&self) -> Result<String, BlogError> {
        let body = self.comment.trim();
        if body.is_empty() {
            return Err(BlogError::validation("comment", "This field is required."));
        }
        Ok(body.to_string())
    }

    fn parent(&self) -> Result<Option<i64>, BlogError> {
        match self.parent_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| BlogError::validation("parentId", "Invalid parent comment id.")),
        }
    }
}

/// Empty comment form for a post.
pub async fn comment_form_handler(
    State(state): State<AppState>,
    PostId(post_id): PostId,
) -> Result<Json<CommentForm>, BlogError> {
    post_repository::get_post_by_id(&state.db_pool, post_id)
        .await?
        .ok_or(BlogError::NotFound("Post"))?;
    Ok(Json(CommentForm::empty()))
}

/// Handler to post a comment, or a reply when `parentId` names a comment.
pub async fn post_comment_handler(
    State(state): State<AppState>,
    PostId(post_id): PostId,
    user: AuthenticatedUser,
    jar: CookieJar,
    Form(form): Form<CommentForm>,
) -> Result<(CookieJar, Redirect), BlogError> {
    let post = post_repository::get_post_by_id(&state.db_pool, post_id)
        .await?
        .ok_or(BlogError::NotFound("Post"))?;

    let body = form.body()?;
    let parent_id = match form.parent()? {
        Some(parent_id) => {
            let parent = comment_repository::get_comment_by_id(&state.db_pool, parent_id)
                .await?
                .ok_or(BlogError::NotFound("Comment"))?;
            if parent.post_id != post.id {
                return Err(BlogError::validation(
                    "parentId",
                    "Parent comment belongs to a different post.",
                ));
            }
            Some(parent.id)
        }
        None => None,
    };

    let comment = comment_repository::create_comment(
        &state.db_pool,
        CreateCommentData {
            user_id: user.id(),
            post_id: post.id,
            parent_id,
            comment: body,
        },
    )
    .await?;

    info!(comment_id = comment.id, post_id = post.id, "Posted {}", comment);

    let message = if comment.is_reply() {
        "Your reply has been posted successfully"
    } else {
        "Your comment has been posted successfully"
    };
    let jar = flash::push(jar, FlashMessage::success(message));
    Ok((jar, Redirect::to(&post.url())))
}
