// handlers/elevated/products/update.rs - PUT /product/:productId handler

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use uuid::Uuid;

use super::ProductRequest;
use crate::database::models::{Product, ProductPatch};
use crate::error::ApiError;
use crate::handlers::validate::Validator;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// PUT /product/:productId - Partial update; fields left out keep their
/// stored values.
pub async fn product_update(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<Product> {
    let Path(id) = id?;
    let Json(req) = payload?;

    let mut v = Validator::new();
    v.check(&req);
    let patch = ProductPatch {
        stock: req.stock(),
        price: v.price("price", req.price),
        name: req.name,
        category: req.category,
        description: req.description,
    };
    v.finish("invalid product details")?;

    if patch.is_empty() {
        return Err(ApiError::bad_request("no product fields to update"));
    }

    let product = state
        .store
        .products
        .update(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("product not found"))?;

    Ok(ApiResponse::success(product).with_message("product updated successfully"))
}
