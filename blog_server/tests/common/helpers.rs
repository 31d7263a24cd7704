// tests/common/helpers.rs
//! Shared helper functions for integration tests

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{self, header, HeaderMap, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use blog_server::{
    auth::{ChallengeResponse, HEADER_CHALLENGE_ID, HEADER_PUBKEY, HEADER_SIGNATURE},
    config::BlogServerConfig,
    create_router,
    models::{PostDetail, User},
};
use ed25519_dalek::{Signer, SigningKey};
use http_body_util::BodyExt;
use rand::rngs::OsRng;
use serde_json::json;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub async fn create_test_app(pool: SqlitePool) -> Router {
    let mut config = BlogServerConfig::new("Test Blog".to_string());
    config.site_description = "A blog under test".to_string();
    create_router(pool, config)
}

// Helper to generate a test keypair
pub fn generate_test_keypair() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// Sends one request through the router and collects the response.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

// Helper to get challenge and prepare auth headers
pub async fn get_auth_headers(app: &Router, keypair: &SigningKey) -> Vec<(&'static str, String)> {
    // 1. Get challenge
    let (status, _, body) = send(
        app,
        Request::builder()
            .method(http::Method::GET)
            .uri("/auth/challenge")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Failed to get challenge");
    let challenge_resp: ChallengeResponse =
        serde_json::from_slice(&body).expect("Failed to deserialize challenge response in helper");

    // 2. Decode and sign nonce
    let nonce = BASE64_STANDARD
        .decode(&challenge_resp.nonce_base64)
        .expect("Failed to decode nonce in helper");
    let signature = keypair.sign(&nonce);

    // 3. Prepare headers
    vec![
        (HEADER_PUBKEY, BASE64_STANDARD.encode(keypair.verifying_key().to_bytes())),
        (HEADER_SIGNATURE, BASE64_STANDARD.encode(signature.to_bytes())),
        (HEADER_CHALLENGE_ID, challenge_resp.challenge_id.to_string()),
    ]
}

/// Builds a request, signed by `keypair` when given.
pub async fn request(
    app: &Router,
    method: http::Method,
    uri: &str,
    keypair: Option<&SigningKey>,
) -> http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(keypair) = keypair {
        for (name, value) in get_auth_headers(app, keypair).await {
            builder = builder.header(name, value);
        }
    }
    builder
}

/// GET `uri`, optionally signed.
pub async fn get(app: &Router, uri: &str, keypair: Option<&SigningKey>) -> (StatusCode, HeaderMap, Bytes) {
    let req = request(app, http::Method::GET, uri, keypair)
        .await
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

/// POST an urlencoded form to `uri`, optionally signed.
pub async fn post_form(
    app: &Router,
    uri: &str,
    fields: &[(&str, &str)],
    keypair: Option<&SigningKey>,
) -> (StatusCode, HeaderMap, Bytes) {
    let req = request(app, http::Method::POST, uri, keypair)
        .await
        .header(header::CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap();
    send(app, req).await
}

/// Registers `keypair` under `username`.
pub async fn register_user(app: &Router, keypair: &SigningKey, username: &str) -> User {
    let req = request(app, http::Method::POST, "/users", Some(keypair))
        .await
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(json!({ "username": username }).to_string()))
        .unwrap();
    let (status, _, body) = send(app, req).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Failed to register user: {}",
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).expect("Failed to deserialize user in helper")
}

/// The `Location` header of a redirect.
pub fn location(headers: &HeaderMap) -> String {
    headers
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Creates a post as `keypair` and returns its id.
pub async fn create_test_post(app: &Router, keypair: &SigningKey, title: &str, content: &str) -> i64 {
    let (status, headers, body) = post_form(
        app,
        "/post/new",
        &[("title", title), ("content", content)],
        Some(keypair),
    )
    .await;
    assert_eq!(
        status,
        StatusCode::SEE_OTHER,
        "Failed to create post: {}",
        String::from_utf8_lossy(&body)
    );
    location(&headers)
        .strip_prefix("/post/")
        .and_then(|id| id.parse().ok())
        .expect("create redirect does not point at a post")
}

/// The `name=value` pair of the flash cookie set by a response, if any.
pub fn flash_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.starts_with("blog_messages="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .next()
}

/// Fetches the detail view of a post, as `viewer` if given and with `cookie` if given.
pub async fn get_post_detail(
    app: &Router,
    post_id: i64,
    viewer: Option<&SigningKey>,
    cookie: Option<&str>,
) -> PostDetail {
    let mut builder = request(app, http::Method::GET, &format!("/post/{}", post_id), viewer).await;
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let (status, _, body) = send(app, builder.body(Body::empty()).unwrap()).await;
    assert_eq!(
        status,
        StatusCode::OK,
        "Failed to fetch post detail: {}",
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).expect("Failed to deserialize post detail in helper")
}
