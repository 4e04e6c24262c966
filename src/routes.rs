use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{create_jwt, Auth};
use crate::error::ApiError;
use crate::models::*;
use crate::password;
use crate::rate_limit::RateLimiterFacade;
use crate::repo::Repo;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(web::resource("/register").route(web::post().to(register)))
            .service(web::resource("/login").route(web::post().to(login))),
    )
    .service(
        web::scope("/api/posts")
            .service(
                web::resource("")
                    .route(web::get().to(list_posts))
                    .route(web::post().to(create_post)),
            )
            .service(web::resource("/{post_id}/comments").route(web::post().to(add_comment))),
    );
    cfg.route("/", web::get().to(liveness));
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
    pub rate_limiter: Option<RateLimiterFacade>,
}

fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub content: String,
}

pub async fn liveness() -> impl Responder {
    "Blog API Running"
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = PublicUser),
        (status = 400, description = "Missing fields or email already registered"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn register(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Some(rl) = &data.rate_limiter {
        if !rl.allow_register(&client_ip(&req)) {
            return Err(ApiError::RateLimited);
        }
    }
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.trim().is_empty()
    {
        return Err(ApiError::Validation("name, email and password required".into()));
    }

    let hash = password::hash_password(&payload.password).map_err(|e| {
        log::error!("password hashing failed: {e}");
        ApiError::Internal
    })?;

    let payload = payload.into_inner();
    let user = data
        .repo
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash: hash,
        })
        .await?;
    Ok(HttpResponse::Created().json(PublicUser::from(user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed bearer token", body = TokenResponse),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn login(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Some(rl) = &data.rate_limiter {
        if !rl.allow_login(&client_ip(&req)) {
            return Err(ApiError::RateLimited);
        }
    }

    // Unknown email and wrong password are indistinguishable to the caller.
    let user = match data.repo.get_user_by_email(&payload.email).await {
        Ok(u) => u,
        Err(crate::repo::RepoError::NotFound) => return Err(ApiError::Unauthorized),
        Err(e) => return Err(e.into()),
    };
    if !password::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = create_jwt(user.id).map_err(|e| {
        log::error!("token issuance failed: {e}");
        ApiError::Internal
    })?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/posts",
    responses(
        (status = 200, description = "Flat post/comment feed, posts newest-first", body = [FeedRow])
    )
)]
pub async fn list_posts(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = data.repo.list_feed().await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Empty title or content"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn create_post(
    req: HttpRequest,
    auth: Auth,
    data: web::Data<AppState>,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Some(rl) = &data.rate_limiter {
        if !rl.allow_post(&client_ip(&req)) {
            return Err(ApiError::RateLimited);
        }
    }
    let user_id = auth.user_id()?;
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(ApiError::Validation("title and content required".into()));
    }

    let payload = payload.into_inner();
    let post = data
        .repo
        .create_post(NewPost {
            title: payload.title,
            content: payload.content,
            user_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(post))
}

#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/comments",
    request_body = CreateCommentRequest,
    params(("post_id" = Id, Path, description = "Parent post id")),
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Empty content"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Post not found"),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn add_comment(
    req: HttpRequest,
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Some(rl) = &data.rate_limiter {
        if !rl.allow_comment(&client_ip(&req)) {
            return Err(ApiError::RateLimited);
        }
    }
    let user_id = auth.user_id()?;
    if payload.content.trim().is_empty() {
        return Err(ApiError::Validation("comment content required".into()));
    }

    let post_id = path.into_inner();
    // Parent must exist before we insert, independent of the FK.
    data.repo.get_post(post_id).await?;

    let comment = data
        .repo
        .create_comment(NewComment {
            content: payload.into_inner().content,
            user_id,
            post_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(comment))
}
