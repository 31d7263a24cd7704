use sqlx::SqlitePool;

/// Flips `user_id`'s membership in the likers of `post_id`.
/// Returns whether the user likes the post afterwards.
///
/// Runs in one transaction: remove if present, otherwise insert. The join
/// table's primary key keeps a user from being counted twice even when two
/// toggles race.
pub async fn toggle_like(pool: &SqlitePool, post_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = if removed == 0 {
        sqlx::query(
            "INSERT INTO post_likes (post_id, user_id) VALUES (?, ?) ON CONFLICT (post_id, user_id) DO NOTHING",
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        true
    } else {
        false
    };

    tx.commit().await?;
    Ok(liked)
}

/// Number of users who like the post.
pub async fn count_likes(pool: &SqlitePool, post_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(pool)
        .await
}

pub async fn has_liked(pool: &SqlitePool, post_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM post_likes WHERE post_id = ? AND user_id = ?")
            .bind(post_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{
        post_repository::{self, CreatePostData},
        user_repository,
    };

    async fn seed_post(pool: &SqlitePool) -> (i64, i64, i64) {
        let alice = user_repository::create_user(pool, "alice", &[1; 32]).await.unwrap();
        let bob = user_repository::create_user(pool, "bob", &[2; 32]).await.unwrap();
        let post = post_repository::create_post(
            pool,
            CreatePostData {
                author_id: alice.id,
                title: "Hello".to_string(),
                content: "First post".to_string(),
            },
        )
        .await
        .unwrap();
        (post.id, alice.id, bob.id)
    }

    #[sqlx::test]
    async fn toggle_twice_restores_original_state(pool: SqlitePool) {
        let (post_id, _alice, bob) = seed_post(&pool).await;

        assert!(toggle_like(&pool, post_id, bob).await.unwrap());
        assert_eq!(count_likes(&pool, post_id).await.unwrap(), 1);
        assert!(has_liked(&pool, post_id, bob).await.unwrap());

        assert!(!toggle_like(&pool, post_id, bob).await.unwrap());
        assert_eq!(count_likes(&pool, post_id).await.unwrap(), 0);
        assert!(!has_liked(&pool, post_id, bob).await.unwrap());
    }

    #[sqlx::test]
    async fn likes_are_counted_per_user(pool: SqlitePool) {
        let (post_id, alice, bob) = seed_post(&pool).await;

        toggle_like(&pool, post_id, alice).await.unwrap();
        toggle_like(&pool, post_id, bob).await.unwrap();
        assert_eq!(count_likes(&pool, post_id).await.unwrap(), 2);

        toggle_like(&pool, post_id, alice).await.unwrap();
        assert_eq!(count_likes(&pool, post_id).await.unwrap(), 1);
        assert!(!has_liked(&pool, post_id, alice).await.unwrap());
        assert!(has_liked(&pool, post_id, bob).await.unwrap());
    }

    #[sqlx::test]
    async fn deleting_the_post_drops_its_likes(pool: SqlitePool) {
        let (post_id, _alice, bob) = seed_post(&pool).await;
        toggle_like(&pool, post_id, bob).await.unwrap();

        post_repository::delete_post(&pool, post_id).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_likes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
