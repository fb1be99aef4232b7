// handlers/elevated/users/list.rs - GET /users handler

use axum::extract::State;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn users_list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.store.users.list().await?;
    Ok(ApiResponse::success(users))
}
