// handlers/public/auth/register.rs - POST /register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{NewUser, Role, User};
use crate::error::ApiError;
use crate::handlers::validate::{trimmed, Validator};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password cannot be less than 6 characters"))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    pub mobile: Option<String>,
}

/**
 * POST /register - Create a user account
 *
 * Expected Input:
 * ```json
 * {
 *   "email": "a@b.com",
 *   "password": "secret1",
 *   "firstname": "A",
 *   "lastname": "B",
 *   "mobile": "123"
 * }
 * ```
 *
 * New accounts always get the `user` role. The password is validated and
 * hashed before anything is written; the hash never leaves the server.
 *
 * Errors:
 * - 400 "please enter all fields" when a field is missing or blank
 * - 400 when the email or password is malformed
 * - 400 "user already exists" when the email is taken
 */
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(req) = payload?;

    let mut format = Validator::new();
    format.check(&req);

    let mut required = Validator::new();
    let email = required.required("email", req.email).to_lowercase();
    let password = required.required("password", req.password);
    let firstname = required.required("firstname", req.firstname);
    let lastname = required.required("lastname", req.lastname);
    let mobile = required.required("mobile", req.mobile);
    required.finish("please enter all fields")?;
    format.finish("invalid registration details")?;

    if state.store.users.find_by_email(&email).await?.is_some() {
        tracing::debug!("Registration rejected, email already in use");
        return Err(ApiError::bad_request("user already exists"));
    }

    let password_hash = state.passwords.hash(&password).await?;

    // The unique index still decides when two registrations race
    let user = state
        .store
        .users
        .insert(NewUser {
            email,
            mobile,
            password_hash,
            firstname,
            lastname,
            role: Role::User,
        })
        .await?;

    tracing::info!("Registered user {}", user.id);
    Ok(ApiResponse::created(user).with_message("user registered successfully"))
}
