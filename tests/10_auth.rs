mod common;

use anyhow::Result;
use axum::http::{header::AUTHORIZATION, Method, Request, StatusCode};
use axum::body::Body;
use chrono::Duration;
use common::{TestApp, PASSWORD};
use serde_json::json;
use shopfront_api::auth::{Claims, TokenService};
use tower::ServiceExt;

#[tokio::test]
async fn register_then_repeat_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let body = json!({
        "email": "a@b.com",
        "password": "secret1",
        "firstname": "A",
        "lastname": "B",
        "mobile": "123",
    });

    let first = app.post("/register", None, body.clone()).await?;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    assert_eq!(first.body["success"], true);
    assert_eq!(first.body["message"], "user registered successfully");
    assert_eq!(first.data()["role"], "user");
    assert!(first.data().get("passwordHash").is_none());

    let second = app.post("/register", None, body).await?;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.body["message"], "user already exists");
    Ok(())
}

#[tokio::test]
async fn duplicate_email_wins_regardless_of_other_fields() -> Result<()> {
    let app = TestApp::new();
    app.register("dup@shop.test", "111").await?;

    let reply = app
        .post(
            "/register",
            None,
            json!({
                "email": "DUP@shop.test",
                "password": "another-password",
                "firstname": "Other",
                "lastname": "Person",
                "mobile": "222",
            }),
        )
        .await?;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "user already exists");
    Ok(())
}

#[tokio::test]
async fn register_validates_before_writing() -> Result<()> {
    let app = TestApp::new();

    let missing = app
        .post("/register", None, json!({ "email": "x@shop.test", "password": "secret1" }))
        .await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["message"], "please enter all fields");
    assert_eq!(missing.body["field_errors"]["mobile"], "is required");

    let short = app
        .post(
            "/register",
            None,
            json!({
                "email": "x@shop.test",
                "password": "12345",
                "firstname": "X",
                "lastname": "Y",
                "mobile": "1",
            }),
        )
        .await?;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert!(short.body["field_errors"]["password"]
        .as_str()
        .unwrap_or_default()
        .contains("6 characters"));

    let bad_email = app
        .post(
            "/register",
            None,
            json!({
                "email": "not-an-email",
                "password": "secret1",
                "firstname": "X",
                "lastname": "Y",
                "mobile": "1",
            }),
        )
        .await?;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    // Nothing was stored by the rejected attempts
    assert!(app.state.store.users.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_mobile_is_a_bad_request() -> Result<()> {
    let app = TestApp::new();
    app.register("one@shop.test", "555").await?;

    let reply = app.register("two@shop.test", "555").await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["field_errors"]["mobile"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_returns_token_for_the_user() -> Result<()> {
    let app = TestApp::new();
    let id = app.register("login@shop.test", "42").await?.id()?;

    let reply = app.login("login@shop.test", PASSWORD).await?;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.data()["user"]["id"], id.to_string());
    assert_eq!(reply.data()["user"]["mobile"], "42");
    assert_eq!(reply.data()["expiresIn"], 3600);

    let token = reply.data()["token"].as_str().unwrap_or_default();
    let claims = app.state.tokens.verify(token)?;
    assert_eq!(claims.sub, id);
    Ok(())
}

#[tokio::test]
async fn login_failures() -> Result<()> {
    let app = TestApp::new();
    app.register("who@shop.test", "7").await?;

    let wrong = app.login("who@shop.test", "wrong-password").await?;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let unknown = app.login("nobody@shop.test", PASSWORD).await?;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], unknown.body["message"]);

    let missing = app.post("/login", None, json!({ "email": "who@shop.test" })).await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() -> Result<()> {
    let app = TestApp::new();

    let none = app.get("/cart", None).await?;
    assert_eq!(none.status, StatusCode::UNAUTHORIZED);
    assert_eq!(none.body["message"], "No token, no authorization");

    let garbage = app.get("/cart", Some("not.a.token")).await?;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.body["message"], "Token verification failed, access denied");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let (_, id) = app.user("late@shop.test", "9").await?;

    let config = shopfront_api::AppConfig::for_tests();
    let signer = TokenService::new(&config.security.jwt_secret, Duration::hours(1))?;
    let expired = signer.encode(&Claims::new(id, Duration::minutes(-5)))?;

    assert!(app.state.tokens.verify(&expired).is_err());
    let reply = app.get("/cart", Some(&expired)).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn bare_token_header_is_accepted() -> Result<()> {
    let app = TestApp::new();
    let (token, _) = app.user("bare@shop.test", "10").await?;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/cart")
        .header(AUTHORIZATION, token)
        .body(Body::empty())?;
    let response = app.router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn non_admin_gets_forbidden_on_admin_routes() -> Result<()> {
    let app = TestApp::new();
    let (token, _) = app.user("plain@shop.test", "11").await?;

    let reply = app.get("/users", Some(&token)).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.body["message"], "Access denied, not an admin");

    let anonymous = app.get("/users", None).await?;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_json_error() -> Result<()> {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from("{\"email\":"))?;
    let response = app.router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["error"], "INVALID_JSON");
    Ok(())
}
