// handlers/protected/wishlist.rs - /wishlist handlers
//
// GET    /wishlist               - caller's wishlist, products populated
// POST   /wishlist               - add a product (repeat adds are a no-op)
// DELETE /wishlist               - remove by { productId }
// PUT    /wishlist/:wishlistId   - point an entry at another product
// DELETE /wishlist/:wishlistId   - remove by entry id

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{ensure_product, required_id};
use crate::database::models::{WishlistItem, WishlistLine};
use crate::database::Upsert;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: Option<Uuid>,
}

pub async fn wishlist_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<WishlistLine>> {
    let lines = state.store.wishlists.list(auth.user_id).await?;
    Ok(ApiResponse::success(lines))
}

/// POST /wishlist - `{ "productId": "uuid" }`. 201 when added, 200 when the
/// product was already wishlisted.
pub async fn wishlist_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<WishlistRequest>, JsonRejection>,
) -> ApiResult<WishlistItem> {
    let Json(req) = payload?;
    let product_id = required_id("productId", req.product_id)?;

    ensure_product(&state, product_id).await?;

    match state.store.wishlists.add(auth.user_id, product_id).await? {
        Upsert::Created(item) => Ok(ApiResponse::created(item).with_message("added to wishlist")),
        Upsert::Updated(item) | Upsert::Unchanged(item) => {
            Ok(ApiResponse::success(item).with_message("product already in wishlist"))
        }
    }
}

pub async fn wishlist_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<WishlistRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(req) = payload?;
    let product_id = required_id("productId", req.product_id)?;

    if !state.store.wishlists.remove_product(auth.user_id, product_id).await? {
        return Err(ApiError::not_found("product not in wishlist"));
    }

    Ok(ApiResponse::success(json!({ "productId": product_id }))
        .with_message("removed from wishlist"))
}

/// PUT /wishlist/:wishlistId - `{ "productId": "uuid" }`. Rejected with 400
/// when the caller already wishlists the target product.
pub async fn wishlist_entry_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<WishlistRequest>, JsonRejection>,
) -> ApiResult<WishlistItem> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let product_id = required_id("productId", req.product_id)?;

    ensure_product(&state, product_id).await?;

    let item = state
        .store
        .wishlists
        .repoint(auth.user_id, id, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("wishlist item not found"))?;

    Ok(ApiResponse::success(item).with_message("wishlist updated"))
}

pub async fn wishlist_entry_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;

    if !state.store.wishlists.remove(auth.user_id, id).await? {
        return Err(ApiError::not_found("wishlist item not found"));
    }

    Ok(ApiResponse::success(json!({ "id": id })).with_message("removed from wishlist"))
}
