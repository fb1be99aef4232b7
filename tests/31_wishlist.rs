mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn second_add_is_a_noop() -> Result<()> {
    let app = TestApp::new();
    let (admin, _) = app.admin().await?;
    let (user, _) = app.user("wish@shop.test", "1").await?;
    let product = app.product(&admin, "Book", "books", 12.0).await?;

    let first = app
        .post("/wishlist", Some(&user), json!({ "productId": product }))
        .await?;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .post("/wishlist", Some(&user), json!({ "productId": product }))
        .await?;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["id"], first.data()["id"]);

    let list = app.get("/wishlist", Some(&user)).await?;
    let entries = list.data().as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["product"]["name"], "Book");
    Ok(())
}

#[tokio::test]
async fn unknown_product_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let (user, _) = app.user("wish@shop.test", "1").await?;

    let reply = app
        .post("/wishlist", Some(&user), json!({ "productId": Uuid::new_v4() }))
        .await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn repoint_entry() -> Result<()> {
    let app = TestApp::new();
    let (admin, _) = app.admin().await?;
    let (user, _) = app.user("wish@shop.test", "1").await?;
    let a = app.product(&admin, "A", "x", 1.0).await?;
    let b = app.product(&admin, "B", "x", 1.0).await?;

    let entry = app
        .post("/wishlist", Some(&user), json!({ "productId": a }))
        .await?
        .id()?;

    let moved = app
        .put(&format!("/wishlist/{}", entry), Some(&user), json!({ "productId": b }))
        .await?;
    assert_eq!(moved.status, StatusCode::OK, "{}", moved.body);
    assert_eq!(moved.data()["productId"], b.to_string());

    // Pointing a second entry at an already wishlisted product would duplicate it
    let other = app
        .post("/wishlist", Some(&user), json!({ "productId": a }))
        .await?
        .id()?;
    let clash = app
        .put(&format!("/wishlist/{}", other), Some(&user), json!({ "productId": b }))
        .await?;
    assert_eq!(clash.status, StatusCode::BAD_REQUEST);

    let (stranger, _) = app.user("other@shop.test", "2").await?;
    let foreign = app
        .put(&format!("/wishlist/{}", entry), Some(&stranger), json!({ "productId": a }))
        .await?;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn remove_by_id_and_by_product() -> Result<()> {
    let app = TestApp::new();
    let (admin, _) = app.admin().await?;
    let (user, _) = app.user("wish@shop.test", "1").await?;
    let a = app.product(&admin, "A", "x", 1.0).await?;
    let b = app.product(&admin, "B", "x", 1.0).await?;

    let entry = app
        .post("/wishlist", Some(&user), json!({ "productId": a }))
        .await?
        .id()?;
    app.post("/wishlist", Some(&user), json!({ "productId": b })).await?;

    let by_id = app.delete(&format!("/wishlist/{}", entry), Some(&user)).await?;
    assert_eq!(by_id.status, StatusCode::OK);
    let again = app.delete(&format!("/wishlist/{}", entry), Some(&user)).await?;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let by_product = app
        .send(Method::DELETE, "/wishlist", Some(&user), Some(json!({ "productId": b })))
        .await?;
    assert_eq!(by_product.status, StatusCode::OK);

    let list = app.get("/wishlist", Some(&user)).await?;
    assert_eq!(list.body["data"], json!([]));
    Ok(())
}
