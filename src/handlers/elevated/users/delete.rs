// handlers/elevated/users/delete.rs - DELETE /user/:userId handler

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Deletes only the account. Carts, wishlists, addresses and reviews stay
/// behind; review reads populate a missing author as `null`.
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;

    if !state.store.users.delete(id).await? {
        return Err(ApiError::not_found("user not found"));
    }

    tracing::info!("Admin {} deleted user {}", auth.user_id, id);
    Ok(ApiResponse::success(json!({ "id": id })).with_message("user deleted successfully"))
}
