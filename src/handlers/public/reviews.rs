// handlers/public/reviews.rs - GET /reviews/:productId handler

use axum::extract::{rejection::PathRejection, Path, State};
use uuid::Uuid;

use crate::database::models::ReviewWithAuthor;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /reviews/:productId - Reviews of one product with their authors.
/// An unknown product simply has no reviews.
pub async fn reviews_get(
    State(state): State<AppState>,
    product_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<ReviewWithAuthor>> {
    let Path(product_id) = product_id?;

    let reviews = state.store.reviews.list_for_product(product_id).await?;
    Ok(ApiResponse::success(reviews))
}
