use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type Id = i64;

/// Full user row as stored. The password hash never leaves the process;
/// API responses use [`PublicUser`].
#[derive(Debug, Clone, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        PublicUser { id: u.id, name: u.name, email: u.email, created_at: u.created_at }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Post {
    pub id: Id,
    pub title: String,
    pub content: String,
    pub user_id: Id,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub user_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Comment {
    pub id: Id,
    pub content: String,
    pub user_id: Id,
    pub post_id: Id,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewComment {
    pub content: String,
    pub user_id: Id,
    pub post_id: Id,
}

/// One row of the post feed: a post joined with its author plus at most
/// one comment (itself joined with its author). A post without comments
/// yields a single row with the comment columns null; a post with N
/// comments yields N rows. Callers regroup into a nested shape if they
/// want one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct FeedRow {
    pub post_id: Id,
    pub title: String,
    pub content: String,
    pub post_created_at: DateTime<Utc>,
    pub author_name: String,
    pub comment_id: Option<Id>,
    pub comment_content: Option<String>,
    pub comment_author: Option<String>,
    pub comment_created_at: Option<DateTime<Utc>>,
}
