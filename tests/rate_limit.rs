#![cfg(feature = "inmem-store")]

use actix_web::{test, App};
use rbb::rate_limit::{InMemoryRateLimiter, RateLimitConfig, RateLimiterFacade};
use rbb::repo::inmem::InMemRepo;
use rbb::{config, AppState};
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

fn setup_env() {
    std::env::set_var("JWT_SECRET", "test-secret-must-be-32-bytes-long!!");
}

fn tight_register_cfg() -> RateLimitConfig {
    RateLimitConfig {
        register_limit: 1,
        register_window: Duration::from_secs(300),
        login_limit: 100,
        login_window: Duration::from_secs(60),
        post_limit: 100,
        post_window: Duration::from_secs(60),
        comment_limit: 100,
        comment_window: Duration::from_secs(60),
    }
}

#[actix_web::test]
#[serial]
async fn rate_limit_register() {
    setup_env();

    // limiter: only 1 registration per large window so the second is denied
    let limiter = RateLimiterFacade::new(InMemoryRateLimiter::new(true), tight_register_cfg());
    let state = AppState { repo: Arc::new(InMemRepo::new()), rate_limiter: Some(limiter) };
    let app = test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(state))
            .configure(config),
    )
    .await;

    // first registration -> 201
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({"name": "Ann", "email": "ann@example.com", "password": "pw123456"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201, "first registration allowed");

    // second registration from the same address -> 429
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({"name": "Bob", "email": "bob@example.com", "password": "pw123456"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 429, "second registration should be rate limited");
}

#[actix_web::test]
#[serial]
async fn disabled_limiter_never_trips() {
    setup_env();

    let limiter = RateLimiterFacade::new(InMemoryRateLimiter::new(false), tight_register_cfg());
    let state = AppState { repo: Arc::new(InMemRepo::new()), rate_limiter: Some(limiter) };
    let app = test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(state))
            .configure(config),
    )
    .await;

    for i in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&json!({
                "name": format!("User{i}"),
                "email": format!("user{i}@example.com"),
                "password": "pw123456"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
    }
}
