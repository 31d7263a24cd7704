use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    auth::{AuthenticatedUser, VerifiedKey},
    constants::MAX_USERNAME_LENGTH,
    error::BlogError,
    models::User,
    repositories::user_repository,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterUserPayload {
    pub username: String,
}

/// Letters, digits and `@.+-_`, at most 150 characters.
fn validate_username(username: &str) -> Result<(), BlogError> {
    if username.is_empty() {
        return Err(BlogError::validation("username", "This field is required."));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(BlogError::validation(
            "username",
            format!("Ensure this value has at most {} characters.", MAX_USERNAME_LENGTH),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(BlogError::validation(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// Registers the caller's verified key under a username.
pub async fn register_user_handler(
    State(state): State<AppState>,
    key: VerifiedKey,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<(StatusCode, Json<User>), BlogError> {
    let username = payload.username.trim();
    validate_username(username)?;

    if user_repository::get_user_by_username(&state.db_pool, username)
        .await?
        .is_some()
    {
        return Err(BlogError::Conflict("A user with that username already exists.".to_string()));
    }
    if user_repository::get_user_by_public_key(&state.db_pool, &key.0)
        .await?
        .is_some()
    {
        return Err(BlogError::Conflict("This key is already registered.".to_string()));
    }

    match user_repository::create_user(&state.db_pool, username, &key.0).await {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "Registered user");
            Ok((StatusCode::CREATED, Json(user)))
        }
        // Lost a race with a concurrent registration.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(username, "Unique violation while registering user");
            Err(BlogError::Conflict("Username or key already registered.".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// The user behind the current request.
pub async fn current_user_handler(user: AuthenticatedUser) -> Json<User> {
    Json(user.0)
}

/// Deletes the caller's account along with everything they wrote or liked.
pub async fn delete_current_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<StatusCode, BlogError> {
    match user_repository::delete_user(&state.db_pool, user.id()).await? {
        0 => Err(BlogError::NotFound("User")),
        _ => {
            info!(user_id = user.id(), username = %user.username(), "Deleted user and their content");
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_django_style_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob.smith+blog@example-1_x").is_ok());
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LENGTH + 1)).is_err());
    }
}
