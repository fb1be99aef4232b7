// handlers/protected/cart.rs - /cart handlers
//
// GET    /cart              - caller's cart, products populated
// GET    /cart/:productId   - one line
// POST   /cart              - add a product or bump its quantity
// DELETE /cart              - remove one line ({ productId }) or clear the cart

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_product, required_id};
use crate::database::models::{CartItem, CartLine};
use crate::database::Upsert;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartAddRequest {
    pub product_id: Option<Uuid>,
    /// Bounded by the `INTEGER` column
    #[validate(range(min = 1, max = 2147483647, message = "must be a positive integer"))]
    pub quantity: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRemoveRequest {
    pub product_id: Option<Uuid>,
}

pub async fn cart_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<CartLine>> {
    let lines = state.store.carts.list(auth.user_id).await?;
    Ok(ApiResponse::success(lines))
}

pub async fn cart_item_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    product_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CartLine> {
    let Path(product_id) = product_id?;

    state
        .store
        .carts
        .find(auth.user_id, product_id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("item not in cart"))
}

/**
 * POST /cart - Add a product to the caller's cart
 *
 * Expected Input:
 * ```json
 * { "productId": "uuid", "quantity": 2 }
 * ```
 *
 * `quantity` defaults to 1. Adding a product that is already in the cart
 * adds to the existing line instead of creating a second one: 201 for a new
 * line, 200 when an existing line was incremented. A total that would not
 * fit the quantity column is a 400 on `quantity`.
 */
pub async fn cart_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CartAddRequest>, JsonRejection>,
) -> ApiResult<CartItem> {
    let Json(req) = payload?;

    let product_id = required_id("productId", req.product_id)?;
    req.validate()?;
    let quantity = req.quantity.and_then(|q| i32::try_from(q).ok()).unwrap_or(1);

    ensure_product(&state, product_id).await?;

    match state.store.carts.add(auth.user_id, product_id, quantity).await? {
        Upsert::Created(item) => {
            Ok(ApiResponse::created(item).with_message("item added to cart"))
        }
        Upsert::Updated(item) | Upsert::Unchanged(item) => {
            Ok(ApiResponse::success(item).with_message("cart quantity updated"))
        }
    }
}

/// DELETE /cart - `{ "productId": "uuid" }` removes that line; an empty body
/// (or one without `productId`) clears the whole cart.
pub async fn cart_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Bytes,
) -> ApiResult<Value> {
    let req = parse_optional_body(&body)?;

    match req.product_id {
        Some(product_id) => {
            if !state.store.carts.remove(auth.user_id, product_id).await? {
                return Err(ApiError::not_found("item not in cart"));
            }
            Ok(ApiResponse::success(json!({ "productId": product_id }))
                .with_message("item removed from cart"))
        }
        None => {
            let removed = state.store.carts.clear(auth.user_id).await?;
            tracing::debug!("Cleared {} cart lines for user {}", removed, auth.user_id);
            Ok(ApiResponse::success(json!({ "removed": removed }))
                .with_message("cart cleared"))
        }
    }
}

fn parse_optional_body(body: &[u8]) -> Result<CartRemoveRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CartRemoveRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::invalid_json(format!("Failed to parse the request body as JSON: {}", e)))
}
