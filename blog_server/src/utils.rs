use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BlogError;

/// The `:id` segment of a post route. An id that is not an integer names no
/// post, so it is rejected as not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = BlogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(PostId(id)),
            Err(rejection) => {
                debug!(uri = %parts.uri, %rejection, "Unparseable post id");
                Err(BlogError::NotFound("Post"))
            }
        }
    }
}

/// `?page=` query parameter. Accepts a 1-based page number or `last`.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    page: Option<String>,
}

impl PageParams {
    pub fn requested(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

/// Position of one page within a listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageInfo {
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }
}

/// Resolves the requested page of a listing holding `count` items.
///
/// An empty listing still has a first page. Anything that does not name an
/// existing page is treated as not found.
pub fn paginate(count: i64, per_page: i64, requested: Option<&str>) -> Result<PageInfo, BlogError> {
    let per_page = per_page.max(1);
    let num_pages = ((count + per_page - 1) / per_page).max(1);

    let number = match requested.map(str::trim) {
        None | Some("") => 1,
        Some("last") => num_pages,
        Some(raw) => raw.parse::<i64>().map_err(|_| BlogError::NotFound("Page"))?,
    };

    if number < 1 || number > num_pages {
        return Err(BlogError::NotFound("Page"));
    }

    Ok(PageInfo {
        number,
        num_pages,
        count,
        per_page,
        has_next: number < num_pages,
        has_previous: number > 1,
    })
}

/// The current time as fixed-width RFC 3339 text, so stored timestamps sort
/// chronologically as strings.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
