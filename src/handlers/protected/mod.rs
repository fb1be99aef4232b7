// handlers/protected/mod.rs - Protected handlers (user token required)
//
// Everything here acts on the caller's own data. The acting user id always
// comes from the verified token (`Extension<AuthUser>`); ids supplied in a
// request body are never used to choose whose rows are touched.
//
// Security Level: Valid token
// Middleware: require_user

pub mod address;
pub mod cart;
pub mod profile;
pub mod review;
pub mod wishlist;

pub use profile::profile_put;

use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// 404 unless the referenced product exists
pub(crate) async fn ensure_product(state: &AppState, product_id: Uuid) -> Result<(), ApiError> {
    match state.store.products.find_by_id(product_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("product not found")),
    }
}

/// Missing JSON ids surface as a 400 with the field named
pub(crate) fn required_id(field: &str, value: Option<Uuid>) -> Result<Uuid, ApiError> {
    value.ok_or_else(|| ApiError::invalid_field(field, "is required"))
}
