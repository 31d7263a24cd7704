use sqlx::SqlitePool;

use crate::models::Post;
use crate::utils::{now_timestamp, PageInfo};

// Every read joins the author's username in.
const SELECT_POST: &str = r#"
    SELECT p.id, p.title, p.content, p.date_posted, p.author_id, u.username AS author
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

pub struct CreatePostData {
    pub author_id: i64,
    pub title: String,
    pub content: String,
}

// The author is not part of an update; ownership never changes.
pub struct UpdatePostData {
    pub title: String,
    pub content: String,
}

/// Inserts a new post stamped with the current time.
pub async fn create_post(pool: &SqlitePool, post_data: CreatePostData) -> Result<Post, sqlx::Error> {
    let post_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO posts (title, content, date_posted, author_id)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&post_data.title)
    .bind(&post_data.content)
    .bind(now_timestamp())
    .bind(post_data.author_id)
    .fetch_one(pool)
    .await?;

    get_post_by_id(pool, post_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Fetches a single post by its ID.
pub async fn get_post_by_id(pool: &SqlitePool, post_id: i64) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(&format!("{SELECT_POST} WHERE p.id = ?"))
        .bind(post_id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

pub async fn count_posts(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
}

/// Fetches one page of all posts, newest first.
pub async fn list_posts(pool: &SqlitePool, page: &PageInfo) -> Result<Vec<Post>, sqlx::Error> {
    let posts = sqlx::query_as::<_, Post>(&format!(
        "{SELECT_POST} ORDER BY p.date_posted DESC, p.id DESC LIMIT ? OFFSET ?"
    ))
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok(posts)
}

pub async fn count_posts_by_author(pool: &SqlitePool, author_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
}

/// Fetches one page of a single author's posts, newest first.
pub async fn list_posts_by_author(
    pool: &SqlitePool,
    author_id: i64,
    page: &PageInfo,
) -> Result<Vec<Post>, sqlx::Error> {
    let posts = sqlx::query_as::<_, Post>(&format!(
        "{SELECT_POST} WHERE p.author_id = ? ORDER BY p.date_posted DESC, p.id DESC LIMIT ? OFFSET ?"
    ))
    .bind(author_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok(posts)
}

/// Replaces a post's title and content.
pub async fn update_post(
    pool: &SqlitePool,
    post_id: i64,
    update_data: UpdatePostData,
) -> Result<Option<Post>, sqlx::Error> {
    let result = sqlx::query("UPDATE posts SET title = ?, content = ? WHERE id = ?")
        .bind(&update_data.title)
        .bind(&update_data.content)
        .bind(post_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_post_by_id(pool, post_id).await
}

/// Deletes a post by its ID; comments and likes cascade.
/// Returns the number of rows affected.
pub async fn delete_post(pool: &SqlitePool, post_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
