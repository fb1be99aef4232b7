// handlers/elevated/products/delete.rs - DELETE /product/:productId handler

use axum::extract::{rejection::PathRejection, Path, State};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn product_delete(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;

    if !state.store.products.delete(id).await? {
        return Err(ApiError::not_found("product not found"));
    }

    tracing::info!("Deleted product {}", id);
    Ok(ApiResponse::success(json!({ "id": id })).with_message("product deleted successfully"))
}
