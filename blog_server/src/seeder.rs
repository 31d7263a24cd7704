use sqlx::SqlitePool;
use tracing::info;

use crate::utils::now_timestamp;

/// Username the demo content is published under.
pub const DEMO_USERNAME: &str = "demo";

const DEMO_POSTS: &[(&str, &str)] = &[
    (
        "Welcome to the blog",
        "This is the first post. Register a key, then write your own.",
    ),
    (
        "Comments and replies",
        "Every post takes comments, and every comment can be replied to.",
    ),
    (
        "Likes",
        "Like a post once to add it to your favourites; like it again to take that back.",
    ),
];

/// Seed the database with a demo user owning `public_key` and a few posts.
///
/// Idempotent: the user is inserted with `ON CONFLICT DO NOTHING` and posts
/// are only added while the demo user has none.
pub async fn seed_database(pool: &SqlitePool, public_key: &[u8]) -> Result<i64, sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (username, public_key, date_joined) VALUES (?, ?, ?) ON CONFLICT (username) DO NOTHING",
    )
    .bind(DEMO_USERNAME)
    .bind(public_key)
    .bind(now_timestamp())
    .execute(pool)
    .await?;

    let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(DEMO_USERNAME)
        .fetch_one(pool)
        .await?;
    info!(user_id, "Ensured demo user");

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!(existing, "Demo posts already present");
        return Ok(user_id);
    }

    for &(title, content) in DEMO_POSTS {
        sqlx::query("INSERT INTO posts (title, content, date_posted, author_id) VALUES (?, ?, ?, ?)")
            .bind(title)
            .bind(content)
            .bind(now_timestamp())
            .bind(user_id)
            .execute(pool)
            .await?;
        info!(title, "Seeded post");
    }

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn seeding_twice_does_not_duplicate(pool: SqlitePool) {
        let first = seed_database(&pool, &[9; 32]).await.unwrap();
        let second = seed_database(&pool, &[9; 32]).await.unwrap();
        assert_eq!(first, second);

        let posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(posts, DEMO_POSTS.len() as i64);
    }
}
