pub mod comment_handlers;
pub mod like_handlers;
pub mod post_handlers;
pub mod user_handlers;

use axum::{extract::State, Json};

use crate::{models::AboutPage, AppState};

/// Static information about the site.
pub async fn about_handler(State(state): State<AppState>) -> Json<AboutPage> {
    Json(AboutPage {
        title: "About".to_string(),
        site_name: state.config.site_name.clone(),
        description: state.config.site_description.clone(),
    })
}
