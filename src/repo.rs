use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("conflict")] Conflict,
    #[error("internal: {0}")] Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

use async_trait::async_trait;

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a new user. `Conflict` when the email is already taken.
    async fn create_user(&self, new: NewUser) -> RepoResult<User>;
    async fn get_user_by_email(&self, email: &str) -> RepoResult<User>;
}

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn create_post(&self, new: NewPost) -> RepoResult<Post>;
    async fn get_post(&self, id: Id) -> RepoResult<Post>;
    /// The flat post/comment feed: every post joined with its author,
    /// left-joined with its comments. Posts newest-first (ties broken by
    /// id descending), comments within a post by id ascending.
    async fn list_feed(&self) -> RepoResult<Vec<FeedRow>>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn create_comment(&self, new: NewComment) -> RepoResult<Comment>;
}

pub trait Repo: UserRepo + PostRepo + CommentRepo {}

impl<T> Repo for T where T: UserRepo + PostRepo + CommentRepo {}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    #[derive(Default)]
    struct State {
        users: HashMap<Id, User>,
        posts: HashMap<Id, Post>,
        comments: HashMap<Id, Comment>,
        next_id: Id,
    }

    /// HashMap-backed repository used by the integration test suite.
    #[derive(Clone, Default)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
    }

    impl InMemRepo {
        pub fn new() -> Self {
            Self::default()
        }

        fn next_id(state: &mut State) -> Id {
            state.next_id += 1;
            state.next_id
        }
    }

    #[async_trait]
    impl UserRepo for InMemRepo {
        async fn create_user(&self, new: NewUser) -> RepoResult<User> {
            let mut s = self.state.write().unwrap();
            if s.users.values().any(|u| u.email == new.email) {
                return Err(RepoError::Conflict);
            }
            let id = Self::next_id(&mut s);
            let user = User {
                id,
                name: new.name,
                email: new.email,
                password_hash: new.password_hash,
                created_at: Utc::now(),
            };
            s.users.insert(id, user.clone());
            Ok(user)
        }

        async fn get_user_by_email(&self, email: &str) -> RepoResult<User> {
            let s = self.state.read().unwrap();
            s.users
                .values()
                .find(|u| u.email == email)
                .cloned()
                .ok_or(RepoError::NotFound)
        }
    }

    #[async_trait]
    impl PostRepo for InMemRepo {
        async fn create_post(&self, new: NewPost) -> RepoResult<Post> {
            let mut s = self.state.write().unwrap();
            let id = Self::next_id(&mut s);
            let post = Post {
                id,
                title: new.title,
                content: new.content,
                user_id: new.user_id,
                created_at: Utc::now(),
            };
            s.posts.insert(id, post.clone());
            Ok(post)
        }

        async fn get_post(&self, id: Id) -> RepoResult<Post> {
            let s = self.state.read().unwrap();
            s.posts.get(&id).cloned().ok_or(RepoError::NotFound)
        }

        async fn list_feed(&self) -> RepoResult<Vec<FeedRow>> {
            let s = self.state.read().unwrap();
            let mut posts: Vec<_> = s.posts.values().collect();
            posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

            let mut rows = Vec::new();
            for post in posts {
                let author = s
                    .users
                    .get(&post.user_id)
                    .ok_or_else(|| RepoError::Internal(format!("post {} has no author row", post.id)))?;
                let mut comments: Vec<_> = s
                    .comments
                    .values()
                    .filter(|c| c.post_id == post.id)
                    .collect();
                comments.sort_by_key(|c| c.id);

                if comments.is_empty() {
                    rows.push(FeedRow {
                        post_id: post.id,
                        title: post.title.clone(),
                        content: post.content.clone(),
                        post_created_at: post.created_at,
                        author_name: author.name.clone(),
                        comment_id: None,
                        comment_content: None,
                        comment_author: None,
                        comment_created_at: None,
                    });
                    continue;
                }
                for c in comments {
                    let commenter = s.users.get(&c.user_id).ok_or_else(|| {
                        RepoError::Internal(format!("comment {} has no author row", c.id))
                    })?;
                    rows.push(FeedRow {
                        post_id: post.id,
                        title: post.title.clone(),
                        content: post.content.clone(),
                        post_created_at: post.created_at,
                        author_name: author.name.clone(),
                        comment_id: Some(c.id),
                        comment_content: Some(c.content.clone()),
                        comment_author: Some(commenter.name.clone()),
                        comment_created_at: Some(c.created_at),
                    });
                }
            }
            Ok(rows)
        }
    }

    #[async_trait]
    impl CommentRepo for InMemRepo {
        async fn create_comment(&self, new: NewComment) -> RepoResult<Comment> {
            let mut s = self.state.write().unwrap();
            if !s.posts.contains_key(&new.post_id) {
                return Err(RepoError::NotFound);
            }
            let id = Self::next_id(&mut s);
            let comment = Comment {
                id,
                content: new.content,
                user_id: new.user_id,
                post_id: new.post_id,
                created_at: Utc::now(),
            };
            s.comments.insert(id, comment.clone());
            Ok(comment)
        }
    }
}

// Postgres implementation (feature = "postgres-store")
#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres};

    #[derive(Clone)]
    pub struct PgRepo { pool: Pool<Postgres> }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }
    }

    fn internal(e: sqlx::Error) -> RepoError {
        RepoError::Internal(e.to_string())
    }

    #[async_trait]
    impl UserRepo for PgRepo {
        async fn create_user(&self, new: NewUser) -> RepoResult<User> {
            sqlx::query_as::<_, User>(
                "INSERT INTO users (name, email, password_hash) VALUES ($1,$2,$3) \
                 RETURNING id, name, email, password_hash, created_at",
            )
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.constraint() == Some("users_email_key") => {
                    RepoError::Conflict
                }
                _ => internal(e),
            })
        }

        async fn get_user_by_email(&self, email: &str) -> RepoResult<User> {
            sqlx::query_as::<_, User>(
                "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .ok_or(RepoError::NotFound)
        }
    }

    #[async_trait]
    impl PostRepo for PgRepo {
        async fn create_post(&self, new: NewPost) -> RepoResult<Post> {
            sqlx::query_as::<_, Post>(
                "INSERT INTO posts (title, content, user_id) VALUES ($1,$2,$3) \
                 RETURNING id, title, content, user_id, created_at",
            )
            .bind(&new.title)
            .bind(&new.content)
            .bind(new.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)
        }

        async fn get_post(&self, id: Id) -> RepoResult<Post> {
            sqlx::query_as::<_, Post>(
                "SELECT id, title, content, user_id, created_at FROM posts WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .ok_or(RepoError::NotFound)
        }

        async fn list_feed(&self) -> RepoResult<Vec<FeedRow>> {
            sqlx::query_as::<_, FeedRow>(r#"
                SELECT
                    p.id AS post_id,
                    p.title,
                    p.content,
                    p.created_at AS post_created_at,
                    u.name AS author_name,
                    c.id AS comment_id,
                    c.content AS comment_content,
                    cu.name AS comment_author,
                    c.created_at AS comment_created_at
                FROM posts p
                JOIN users u ON p.user_id = u.id
                LEFT JOIN comments c ON p.id = c.post_id
                LEFT JOIN users cu ON c.user_id = cu.id
                ORDER BY p.created_at DESC, p.id DESC, c.id ASC
            "#)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)
        }
    }

    #[async_trait]
    impl CommentRepo for PgRepo {
        async fn create_comment(&self, new: NewComment) -> RepoResult<Comment> {
            sqlx::query_as::<_, Comment>(
                "INSERT INTO comments (content, user_id, post_id) VALUES ($1,$2,$3) \
                 RETURNING id, content, user_id, post_id, created_at",
            )
            .bind(&new.content)
            .bind(new.user_id)
            .bind(new.post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.constraint() == Some("comments_post_id_fkey") => {
                    RepoError::NotFound
                }
                _ => internal(e),
            })
        }
    }
}
