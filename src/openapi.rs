use crate::models::{Comment, FeedRow, Post, PublicUser};
use crate::routes::{CreateCommentRequest, CreatePostRequest, LoginRequest, RegisterRequest, TokenResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::register,
        crate::routes::login,
        crate::routes::list_posts,
        crate::routes::create_post,
        crate::routes::add_comment,
    ),
    components(schemas(
        PublicUser, Post, Comment, FeedRow,
        RegisterRequest, LoginRequest, TokenResponse,
        CreatePostRequest, CreateCommentRequest
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Post and comment operations"),
    )
)]
pub struct ApiDoc;
