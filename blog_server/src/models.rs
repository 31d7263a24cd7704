use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::flash::FlashMessage;
use crate::utils::PageInfo;

/// A registered user. Identity is the ed25519 public key; the username is
/// what the blog shows.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub public_key: Vec<u8>,
    pub date_joined: DateTime<Utc>,
}

/// A blog article. `author` is the author's username, joined in on read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String, // Free text, no length limit
    pub date_posted: DateTime<Utc>,
    pub author_id: i64,
    pub author: String,
}

impl Post {
    /// Canonical location of the post's detail view.
    pub fn url(&self) -> String {
        post_url(self.id)
    }
}

pub fn post_url(post_id: i64) -> String {
    format!("/post/{}", post_id)
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// A remark on a post. `parent_id` is set when the comment is a reply.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub comment: String,
    pub user_id: i64,
    pub username: String,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub time_stamp: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.comment.chars().take(13).collect();
        write!(f, "{}...by {}", preview, self.username)
    }
}

/// One page of a post listing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub page: PageInfo,
}

/// Everything the detail view shows for a single post.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>, // Newest first
    pub total_likes: i64,
    pub liked: bool,
    #[serde(default)]
    pub messages: Vec<FlashMessage>,
}

/// Static site information served by `/about`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AboutPage {
    pub title: String,
    pub site_name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(body: &str) -> Comment {
        Comment {
            id: 1,
            comment: body.to_string(),
            user_id: 7,
            username: "alice".to_string(),
            post_id: 3,
            parent_id: None,
            time_stamp: Utc::now(),
        }
    }

    #[test]
    fn comment_display_truncates_to_thirteen_chars() {
        let c = comment("This comment is definitely longer than thirteen characters");
        assert_eq!(c.to_string(), "This comment ...by alice");
    }

    #[test]
    fn comment_display_keeps_short_bodies_whole() {
        assert_eq!(comment("Nice").to_string(), "Nice...by alice");
    }

    #[test]
    fn post_displays_as_title_and_links_to_detail() {
        let post = Post {
            id: 42,
            title: "Hello".to_string(),
            content: "World".to_string(),
            date_posted: Utc::now(),
            author_id: 1,
            author: "alice".to_string(),
        };
        assert_eq!(post.to_string(), "Hello");
        assert_eq!(post.url(), "/post/42");
    }
}
