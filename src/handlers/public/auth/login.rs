// handlers/public/auth/login.rs - POST /login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::validate::{trimmed, Validator};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub mobile: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname,
            lastname: user.lastname,
            mobile: user.mobile,
        }
    }
}

/**
 * POST /login - Authenticate and receive a signed token
 *
 * Expected Input:
 * ```json
 * { "email": "a@b.com", "password": "secret1" }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "token": "eyJhbGciOiJIUzI1NiI...",
 *     "expiresIn": 3600,
 *     "user": { "id": "...", "firstname": "A", "lastname": "B", "mobile": "123" }
 *   }
 * }
 * ```
 *
 * Unknown email and wrong password both answer 401 with the same message.
 */
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(req) = payload?;

    let mut v = Validator::new();
    let email = v.required("email", req.email).to_lowercase();
    let password = v.required("password", req.password);
    v.finish("please enter all fields")?;

    let Some(user) = state.store.users.find_by_email(&email).await? else {
        tracing::warn!("Login failed: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !state.passwords.verify(&password, &user.password_hash).await? {
        tracing::warn!("Login failed: wrong password for user {}", user.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(user.id)?;
    tracing::info!("User {} logged in", user.id);

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: state.tokens.lifetime_secs(),
        user: user.into(),
    })
    .with_message("login successful"))
}
