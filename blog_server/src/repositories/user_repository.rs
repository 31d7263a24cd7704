use sqlx::SqlitePool;

use crate::{models::User, utils::now_timestamp};

/// Registers `public_key` under `username`.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    public_key: &[u8],
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, public_key, date_joined)
        VALUES (?, ?, ?)
        RETURNING id, username, public_key, date_joined
        "#,
    )
    .bind(username)
    .bind(public_key)
    .bind(now_timestamp())
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, public_key, date_joined FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn get_user_by_public_key(
    pool: &SqlitePool,
    public_key: &[u8],
) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, public_key, date_joined FROM users WHERE public_key = ?",
    )
    .bind(public_key)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Deletes a user. Their posts, comments, replies to those comments and
/// likes go with them through the schema's cascades.
/// Returns the number of rows affected.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
