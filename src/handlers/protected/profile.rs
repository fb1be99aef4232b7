// handlers/protected/profile.rs - PUT /profile handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{ProfilePatch, User};
use crate::error::ApiError;
use crate::handlers::validate::trimmed;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Only these fields are editable here. Email, password and role are not.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub mobile: Option<String>,
    #[serde(default, rename = "profilePhoto", deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub profile_photo: Option<String>,
}

/// PUT /profile - Partial update of the caller's own profile
pub async fn profile_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(req) = payload?;

    req.validate()?;
    let patch = ProfilePatch {
        firstname: req.firstname,
        lastname: req.lastname,
        mobile: req.mobile,
        profile_photo: req.profile_photo,
    };

    if patch.is_empty() {
        return Err(ApiError::bad_request("no profile fields to update"));
    }

    let user = state
        .store
        .users
        .update_profile(auth.user_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(ApiResponse::success(user).with_message("profile updated successfully"))
}
