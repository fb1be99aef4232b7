// handlers/elevated/users/role.rs - PUT /user/role handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Role, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    pub user_id: Option<Uuid>,
    pub role: Option<String>,
}

/**
 * PUT /user/role - Grant or revoke administrator rights
 *
 * Expected Input:
 * ```json
 * { "userId": "uuid", "role": "admin" }
 * ```
 *
 * `role` must be exactly `user` or `admin`. The change applies to the very
 * next request of that user since admin routes re-read the role.
 */
pub async fn user_role_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(req) = payload?;

    let user_id = req
        .user_id
        .ok_or_else(|| ApiError::invalid_field("userId", "is required"))?;
    let role = req
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::invalid_field("role", "is required"))?
        .parse::<Role>()
        .map_err(|e: String| ApiError::invalid_field("role", e))?;

    let user = state
        .store
        .users
        .set_role(user_id, role)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    tracing::info!("Admin {} set role of user {} to {}", auth.user_id, user.id, role);
    Ok(ApiResponse::success(user).with_message("user role updated successfully"))
}
