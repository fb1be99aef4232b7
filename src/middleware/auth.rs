use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::Claims;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::state::AppState;

/// Caller identity resolved from a verified token. Handlers read the acting
/// user id from here, never from the request body.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self { user_id: claims.sub }
    }
}

/// Requires a valid token; attaches `AuthUser` to the request
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&state, request.headers())?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Requires a valid token whose subject is a stored administrator. The
/// role is read from the store on every request, not trusted from the token.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&state, request.headers())?;

    let user = state.store.users.find_by_id(claims.sub).await?.ok_or_else(|| {
        tracing::warn!("Admin check failed: user {} no longer exists", claims.sub);
        ApiError::forbidden("Access denied, not an admin")
    })?;

    if user.role != Role::Admin {
        tracing::warn!("Admin check failed: user {} has role '{}'", user.id, user.role);
        return Err(ApiError::forbidden("Access denied, not an admin"));
    }

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let token = extract_token(headers).map_err(|msg| {
        tracing::debug!("Rejected request without usable credentials: {}", msg);
        ApiError::unauthorized(msg)
    })?;

    state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ApiError::unauthorized("Token verification failed, access denied")
    })
}

/// Extract the token from the Authorization header. Accepts both
/// `Bearer <token>` and a bare token.
fn extract_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("No token, no authorization")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?
        .trim();

    let token = match auth_str.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return Err("Unsupported authorization scheme"),
        None if auth_str.eq_ignore_ascii_case("bearer") => "",
        None => auth_str,
    };

    if token.is_empty() {
        return Err("Empty token");
    }
    Ok(token)
}
