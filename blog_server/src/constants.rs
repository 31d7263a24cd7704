/// Posts shown per listing page.
pub const POSTS_PER_PAGE: i64 = 5;

/// Maximum post title length, in characters.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum username length, in characters.
pub const MAX_USERNAME_LENGTH: usize = 150;
