// handlers/public/products.rs - GET /products and GET /product/:productId

use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query, State,
};
use uuid::Uuid;

use crate::database::models::{Product, ProductFilter};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /products - Every product, optionally narrowed with `?category=`
pub async fn products_get(
    State(state): State<AppState>,
    filter: Result<Query<ProductFilter>, QueryRejection>,
) -> ApiResult<Vec<Product>> {
    let Query(mut filter) = filter?;
    filter.category = filter
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let products = state.store.products.list(&filter).await?;
    Ok(ApiResponse::success(products))
}

/// GET /product/:productId
pub async fn product_get(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Product> {
    let Path(id) = id?;

    state
        .store
        .products
        .find_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("product not found"))
}
