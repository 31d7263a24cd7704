use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeder;
pub mod utils;

use auth::{get_challenge_handler, ChallengeStore};
use config::BlogServerConfig;
use handlers::{
    about_handler,
    comment_handlers::{comment_form_handler, post_comment_handler},
    like_handlers::toggle_like_handler,
    post_handlers::{
        create_post_handler, delete_post_confirm_handler, delete_post_handler,
        edit_post_form_handler, list_posts_handler, new_post_form_handler, post_detail_handler,
        update_post_handler, user_posts_handler,
    },
    user_handlers::{current_user_handler, delete_current_user_handler, register_user_handler},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub challenge_store: ChallengeStore,
    pub config: Arc<BlogServerConfig>,
}

/// Builds the application router. Must be called inside a tokio runtime.
pub fn create_router(db_pool: SqlitePool, config: BlogServerConfig) -> Router {
    let max_body_size = config.max_body_size_bytes;

    let app_state = AppState {
        db_pool,
        challenge_store: ChallengeStore::new(),
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(list_posts_handler))
        .route("/posts", get(list_posts_handler))
        .route("/about", get(about_handler))
        .route("/user/:username", get(user_posts_handler))
        .route("/post/new", get(new_post_form_handler).post(create_post_handler))
        .route("/post/:id", get(post_detail_handler))
        .route("/post/:id/update", get(edit_post_form_handler).post(update_post_handler))
        .route("/post/:id/delete", get(delete_post_confirm_handler).post(delete_post_handler))
        .route("/post/:id/comment", get(comment_form_handler).post(post_comment_handler))
        .route("/post/:id/like", get(toggle_like_handler).post(toggle_like_handler))
        .route("/auth/challenge", get(get_challenge_handler))
        .route("/users", post(register_user_handler))
        .route("/users/me", get(current_user_handler).delete(delete_current_user_handler))
        .with_state(app_state)
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
}
