// handlers/elevated/products/create.rs - POST /product handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::ProductRequest;
use crate::database::models::{NewProduct, Product};
use crate::handlers::validate::Validator;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/**
 * POST /product - Add a product to the catalog
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "Desk lamp",
 *   "category": "lighting",
 *   "description": "Warm white, 40W",
 *   "price": 19.99,
 *   "stock": 12
 * }
 * ```
 *
 * `stock` defaults to 0. Prices are kept to two decimal places and must fit
 * the price column (at most 9999999999.99).
 */
pub async fn product_create(
    State(state): State<AppState>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<Product> {
    let Json(req) = payload?;

    let mut v = Validator::new();
    v.check(&req);
    let stock = req.stock().unwrap_or_default();
    let name = v.required("name", req.name);
    let category = v.required("category", req.category);
    let description = v.required("description", req.description);
    if req.price.is_none() {
        v.add("price", "is required");
    }
    let price = v.price("price", req.price);
    v.finish("please enter all product fields")?;

    let product = state
        .store
        .products
        .insert(NewProduct {
            name,
            category,
            description,
            price: price.unwrap_or_default(),
            stock,
        })
        .await?;

    tracing::info!("Created product {}", product.id);
    Ok(ApiResponse::created(product).with_message("product created successfully"))
}
