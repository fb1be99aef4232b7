// handlers/protected/review.rs - /review handlers
//
// POST   /review             - review a product as the caller
// PUT    /review/:reviewId   - edit one of the caller's reviews
// DELETE /review/:reviewId   - delete one of the caller's reviews (admins: any)

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
use validator::Validate;

use super::{ensure_product, required_id};
use crate::database::models::{NewReview, Review, ReviewPatch};
use crate::database::Scope;
use crate::error::ApiError;
use crate::handlers::validate::{trimmed, Validator};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub product_id: Option<Uuid>,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: Option<i64>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub comment: Option<String>,
}

impl ReviewRequest {
    /// In range once `validate` has passed
    fn rating(&self) -> Option<i32> {
        self.rating.and_then(|r| i32::try_from(r).ok())
    }
}

/**
 * POST /review - Review a product
 *
 * Expected Input:
 * ```json
 * { "productId": "uuid", "rating": 4, "comment": "Solid." }
 * ```
 *
 * The author is always the caller; a `userId` in the body is ignored.
 */
pub async fn review_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Review> {
    let Json(req) = payload?;

    let product_id = required_id("productId", req.product_id)?;
    let mut v = Validator::new();
    v.check(&req);
    let rating = req.rating();
    if rating.is_none() {
        v.add("rating", "is required");
    }
    let comment = v.required("comment", req.comment);
    v.finish("please enter all review fields")?;
    let rating = rating.ok_or_else(|| ApiError::invalid_field("rating", "is required"))?;

    ensure_product(&state, product_id).await?;

    let review = state
        .store
        .reviews
        .insert(NewReview {
            user_id: auth.user_id,
            product_id,
            rating,
            comment,
        })
        .await?;

    Ok(ApiResponse::created(review).with_message("review added successfully"))
}

/// PUT /review/:reviewId - `rating` and/or `comment`. Someone else's review
/// answers 404 exactly like a missing one.
pub async fn review_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Review> {
    let Path(id) = id?;
    let Json(req) = payload?;

    req.validate()?;
    let patch = ReviewPatch {
        rating: req.rating(),
        comment: req.comment,
    };

    if patch.is_empty() {
        return Err(ApiError::bad_request("no review fields to update"));
    }

    let review = state
        .store
        .reviews
        .update(Scope::Owner(auth.user_id), id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("review not found"))?;

    Ok(ApiResponse::success(review).with_message("review updated successfully"))
}

pub async fn review_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;

    // The role comes from the store, never from the token
    let caller = state.store.users.find_by_id(auth.user_id).await?;
    let scope = match caller {
        Some(user) if user.is_admin() => Scope::Any,
        _ => Scope::Owner(auth.user_id),
    };

    if !state.store.reviews.delete(scope, id).await? {
        return Err(ApiError::not_found("review not found"));
    }

    if scope == Scope::Any {
        tracing::info!("Admin {} deleted review {}", auth.user_id, id);
    }
    Ok(ApiResponse::success(json!({ "id": id })).with_message("review deleted successfully"))
}
