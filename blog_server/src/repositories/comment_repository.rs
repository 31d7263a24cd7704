use sqlx::SqlitePool;

use crate::{models::Comment, utils::now_timestamp};

const SELECT_COMMENT: &str = r#"
    SELECT c.id, c.comment, c.user_id, u.username, c.post_id, c.parent_id, c.time_stamp
    FROM blog_comments c
    JOIN users u ON u.id = c.user_id
"#;

pub struct CreateCommentData {
    pub user_id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub comment: String,
}

/// Inserts a comment, or a reply when `parent_id` is set.
pub async fn create_comment(
    pool: &SqlitePool,
    comment_data: CreateCommentData,
) -> Result<Comment, sqlx::Error> {
    let comment_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO blog_comments (comment, user_id, post_id, parent_id, time_stamp)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&comment_data.comment)
    .bind(comment_data.user_id)
    .bind(comment_data.post_id)
    .bind(comment_data.parent_id)
    .bind(now_timestamp())
    .fetch_one(pool)
    .await?;

    get_comment_by_id(pool, comment_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn get_comment_by_id(
    pool: &SqlitePool,
    comment_id: i64,
) -> Result<Option<Comment>, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(&format!("{SELECT_COMMENT} WHERE c.id = ?"))
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;
    Ok(comment)
}

/// All comments and replies on a post, newest first.
pub async fn get_comments_for_post(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<Comment>, sqlx::Error> {
    let comments = sqlx::query_as::<_, Comment>(&format!(
        "{SELECT_COMMENT} WHERE c.post_id = ? ORDER BY c.time_stamp DESC, c.id DESC"
    ))
    .bind(post_id)
    .fetch_all(pool)
    .await?;
    Ok(comments)
}
