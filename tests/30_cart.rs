mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn adding_twice_increments_one_line() -> Result<()> {
    let app = TestApp::new();
    let (admin, _) = app.admin().await?;
    let (user, user_id) = app.user("cart@shop.test", "1").await?;
    let product = app.product(&admin, "Pen", "office", 1.5).await?;

    let first = app
        .post("/cart", Some(&user), json!({ "productId": product }))
        .await?;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    assert_eq!(first.data()["quantity"], 1);
    assert_eq!(first.data()["userId"], user_id.to_string());

    let second = app
        .post("/cart", Some(&user), json!({ "productId": product, "quantity": 3 }))
        .await?;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["quantity"], 4);

    let cart = app.get("/cart", Some(&user)).await?;
    let lines = cart.data().as_array().cloned().unwrap_or_default();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 4);
    assert_eq!(lines[0]["product"]["name"], "Pen");
    Ok(())
}

#[tokio::test]
async fn cart_add_is_validated() -> Result<()> {
    let app = TestApp::new();
    let (user, _) = app.user("cart@shop.test", "1").await?;

    let unknown = app
        .post("/cart", Some(&user), json!({ "productId": Uuid::new_v4() }))
        .await?;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let missing = app.post("/cart", Some(&user), json!({ "quantity": 2 })).await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["field_errors"]["productId"], "is required");

    let zero = app
        .post("/cart", Some(&user), json!({ "productId": Uuid::new_v4(), "quantity": 0 }))
        .await?;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn quantity_total_must_fit() -> Result<()> {
    let app = TestApp::new();
    let (admin, _) = app.admin().await?;
    let (user, _) = app.user("bulk@shop.test", "1").await?;
    let product = app.product(&admin, "Nail", "hardware", 0.1).await?;

    let too_many = app
        .post("/cart", Some(&user), json!({ "productId": product, "quantity": 2147483648i64 }))
        .await?;
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);

    let full = app
        .post("/cart", Some(&user), json!({ "productId": product, "quantity": 2147483647 }))
        .await?;
    assert_eq!(full.status, StatusCode::CREATED, "{}", full.body);

    let overflow = app
        .post("/cart", Some(&user), json!({ "productId": product, "quantity": 5 }))
        .await?;
    assert_eq!(overflow.status, StatusCode::BAD_REQUEST, "{}", overflow.body);
    assert!(overflow.body["field_errors"]["quantity"].is_string());

    let line = app.get(&format!("/cart/{}", product), Some(&user)).await?;
    assert_eq!(line.data()["quantity"], 2147483647);
    Ok(())
}

#[tokio::test]
async fn identity_comes_from_the_token() -> Result<()> {
    let app = TestApp::new();
    let (admin, _) = app.admin().await?;
    let (alice, alice_id) = app.user("alice@shop.test", "1").await?;
    let (bob, bob_id) = app.user("bob@shop.test", "2").await?;
    let product = app.product(&admin, "Cup", "kitchen", 2.0).await?;

    // A userId in the body is not an input
    let reply = app
        .post("/cart", Some(&alice), json!({ "productId": product, "userId": bob_id }))
        .await?;
    assert_eq!(reply.data()["userId"], alice_id.to_string());

    let bobs = app.get("/cart", Some(&bob)).await?;
    assert_eq!(bobs.body["data"], json!([]));

    let line = app.get(&format!("/cart/{}", product), Some(&bob)).await?;
    assert_eq!(line.status, StatusCode::NOT_FOUND);

    let line = app.get(&format!("/cart/{}", product), Some(&alice)).await?;
    assert_eq!(line.status, StatusCode::OK);
    assert_eq!(line.data()["productId"], product.to_string());
    Ok(())
}

#[tokio::test]
async fn delete_one_line_or_clear() -> Result<()> {
    let app = TestApp::new();
    let (admin, _) = app.admin().await?;
    let (user, _) = app.user("cart@shop.test", "1").await?;
    let a = app.product(&admin, "A", "x", 1.0).await?;
    let b = app.product(&admin, "B", "x", 1.0).await?;
    app.post("/cart", Some(&user), json!({ "productId": a })).await?;
    app.post("/cart", Some(&user), json!({ "productId": b })).await?;

    let one = app
        .send(Method::DELETE, "/cart", Some(&user), Some(json!({ "productId": a })))
        .await?;
    assert_eq!(one.status, StatusCode::OK);

    let again = app
        .send(Method::DELETE, "/cart", Some(&user), Some(json!({ "productId": a })))
        .await?;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let cleared = app.delete("/cart", Some(&user)).await?;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.data()["removed"], 1);

    let cart = app.get("/cart", Some(&user)).await?;
    assert_eq!(cart.body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn deleted_product_populates_as_null() -> Result<()> {
    let app = TestApp::new();
    let (admin, _) = app.admin().await?;
    let (user, _) = app.user("cart@shop.test", "1").await?;
    let product = app.product(&admin, "Gone", "x", 1.0).await?;
    app.post("/cart", Some(&user), json!({ "productId": product })).await?;

    app.delete(&format!("/product/{}", product), Some(&admin)).await?;

    let cart = app.get("/cart", Some(&user)).await?;
    assert_eq!(cart.status, StatusCode::OK);
    assert!(cart.data()[0]["product"].is_null());
    assert_eq!(cart.data()[0]["productId"], product.to_string());
    Ok(())
}
