//! Runs the HTTP surface against PostgreSQL. Every test returns early when
//! DATABASE_URL is not set; rows are keyed on random emails and mobiles so
//! runs can share one database.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{unique, TestApp};
use serde_json::json;

fn email() -> String {
    format!("{}@shop.test", unique("pg"))
}

#[tokio::test]
async fn cart_upsert_counts_and_overflows() -> Result<()> {
    let Some(app) = TestApp::postgres().await? else {
        return Ok(());
    };
    let (admin, _) = app.admin().await?;
    let (user, _) = app.user(&email(), &unique("m")).await?;
    let product = app.product(&admin, "Pen", "office", 1.25).await?;

    let first = app.post("/cart", Some(&user), json!({ "productId": product })).await?;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);

    let second = app
        .post("/cart", Some(&user), json!({ "productId": product, "quantity": 3 }))
        .await?;
    assert_eq!(second.status, StatusCode::OK, "{}", second.body);
    assert_eq!(second.data()["quantity"], 4);
    assert_eq!(second.data()["id"], first.data()["id"]);

    let overflow = app
        .post("/cart", Some(&user), json!({ "productId": product, "quantity": 2147483647 }))
        .await?;
    assert_eq!(overflow.status, StatusCode::BAD_REQUEST, "{}", overflow.body);
    assert!(overflow.body["field_errors"]["quantity"].is_string());

    let cart = app.get("/cart", Some(&user)).await?;
    let lines = cart.data().as_array().cloned().unwrap_or_default();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 4);
    assert_eq!(lines[0]["product"]["name"], "Pen");
    assert_eq!(lines[0]["product"]["price"], 1.25);
    Ok(())
}

#[tokio::test]
async fn deleted_product_populates_as_null() -> Result<()> {
    let Some(app) = TestApp::postgres().await? else {
        return Ok(());
    };
    let (admin, _) = app.admin().await?;
    let (user, _) = app.user(&email(), &unique("m")).await?;
    let product = app.product(&admin, "Lamp", "lighting", 30.0).await?;

    app.post("/cart", Some(&user), json!({ "productId": product })).await?;
    app.post("/wishlist", Some(&user), json!({ "productId": product })).await?;
    let deleted = app.delete(&format!("/product/{}", product), Some(&admin)).await?;
    assert_eq!(deleted.status, StatusCode::OK);

    let cart = app.get("/cart", Some(&user)).await?;
    assert_eq!(cart.status, StatusCode::OK, "{}", cart.body);
    assert!(cart.data()[0]["product"].is_null());
    assert_eq!(cart.data()[0]["productId"], product.to_string());

    let wishlist = app.get("/wishlist", Some(&user)).await?;
    assert!(wishlist.data()[0]["product"].is_null());
    Ok(())
}

#[tokio::test]
async fn wishlist_add_and_repoint() -> Result<()> {
    let Some(app) = TestApp::postgres().await? else {
        return Ok(());
    };
    let (admin, _) = app.admin().await?;
    let (user, _) = app.user(&email(), &unique("m")).await?;
    let a = app.product(&admin, "A", "x", 1.0).await?;
    let b = app.product(&admin, "B", "x", 1.0).await?;

    let first = app.post("/wishlist", Some(&user), json!({ "productId": a })).await?;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    let again = app.post("/wishlist", Some(&user), json!({ "productId": a })).await?;
    assert_eq!(again.status, StatusCode::OK, "{}", again.body);
    assert_eq!(again.data()["id"], first.data()["id"]);

    let other = app
        .post("/wishlist", Some(&user), json!({ "productId": b }))
        .await?
        .id()?;
    let clash = app
        .put(&format!("/wishlist/{}", other), Some(&user), json!({ "productId": a }))
        .await?;
    assert_eq!(clash.status, StatusCode::BAD_REQUEST, "{}", clash.body);

    let list = app.get("/wishlist", Some(&user)).await?;
    assert_eq!(list.data().as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn duplicate_email_and_mobile_are_rejected() -> Result<()> {
    let Some(app) = TestApp::postgres().await? else {
        return Ok(());
    };
    let taken_email = email();
    let taken_mobile = unique("m");
    let first = app.register(&taken_email, &taken_mobile).await?;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);

    let same_email = app.register(&taken_email, &unique("m")).await?;
    assert_eq!(same_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(same_email.body["message"], "user already exists");

    // Only the unique index catches this one
    let same_mobile = app.register(&email(), &taken_mobile).await?;
    assert_eq!(same_mobile.status, StatusCode::BAD_REQUEST, "{}", same_mobile.body);
    assert!(same_mobile.body["field_errors"]["mobile"].is_string());
    Ok(())
}

#[tokio::test]
async fn review_authors_are_joined() -> Result<()> {
    let Some(app) = TestApp::postgres().await? else {
        return Ok(());
    };
    let (admin, _) = app.admin().await?;
    let (author, author_id) = app.user(&email(), &unique("m")).await?;
    let product = app.product(&admin, "Radio", "audio", 40.0).await?;

    let created = app
        .post("/review", Some(&author), json!({ "productId": product, "rating": 4, "comment": "Good" }))
        .await?;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);

    let list = app.get(&format!("/reviews/{}", product), None).await?;
    assert_eq!(list.status, StatusCode::OK, "{}", list.body);
    assert_eq!(list.data()[0]["author"]["firstname"], "Test");

    app.delete(&format!("/user/{}", author_id), Some(&admin)).await?;
    let list = app.get(&format!("/reviews/{}", product), None).await?;
    assert!(list.data()[0]["author"].is_null());
    Ok(())
}
