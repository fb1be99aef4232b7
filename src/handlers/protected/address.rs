// handlers/protected/address.rs - /address handlers
//
// GET    /address              - every address of the caller
// POST   /address              - add an address
// PUT    /address              - create the first address or revise the earliest one
// GET    /address/:addressId
// PUT    /address/:addressId   - partial update
// DELETE /address/:addressId

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

use crate::database::models::{Address, AddressPatch, NewAddress};
use crate::error::ApiError;
use crate::handlers::validate::{trimmed, Validator};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct AddressRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub country: Option<String>,
    #[serde(default, alias = "region", deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub county: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub town: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub building: Option<String>,
}

impl AddressRequest {
    fn into_new(self) -> Result<NewAddress, ApiError> {
        let mut v = Validator::new();
        let address = NewAddress {
            country: v.required("country", self.country),
            county: v.required("county", self.county),
            town: v.required("town", self.town),
            building: v.required("building", self.building),
        };
        v.finish("please enter all address fields")?;
        Ok(address)
    }

    fn into_patch(self) -> Result<AddressPatch, ApiError> {
        self.validate()?;
        let patch = AddressPatch {
            country: self.country,
            county: self.county,
            town: self.town,
            building: self.building,
        };

        if patch.is_empty() {
            return Err(ApiError::bad_request("no address fields to update"));
        }
        Ok(patch)
    }
}

pub async fn addresses_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Address>> {
    let addresses = state.store.addresses.list(auth.user_id).await?;
    Ok(ApiResponse::success(addresses))
}

pub async fn address_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<AddressRequest>, JsonRejection>,
) -> ApiResult<Address> {
    let Json(req) = payload?;
    let address = req.into_new()?;

    let address = state.store.addresses.insert(auth.user_id, address).await?;
    Ok(ApiResponse::created(address).with_message("address added successfully"))
}

/// PUT /address - One-shot form. With no address on file every field is
/// required and the address is created (201); otherwise the supplied fields
/// revise the earliest address (200).
pub async fn address_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<AddressRequest>, JsonRejection>,
) -> ApiResult<Address> {
    let Json(req) = payload?;

    let Some(existing) = state.store.addresses.first(auth.user_id).await? else {
        let address = state.store.addresses.insert(auth.user_id, req.into_new()?).await?;
        return Ok(ApiResponse::created(address).with_message("address added successfully"));
    };

    let address = state
        .store
        .addresses
        .update(auth.user_id, existing.id, req.into_patch()?)
        .await?
        .ok_or_else(|| ApiError::not_found("address not found"))?;

    Ok(ApiResponse::success(address).with_message("address updated successfully"))
}

pub async fn address_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Address> {
    let Path(id) = id?;

    state
        .store
        .addresses
        .find(auth.user_id, id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("address not found"))
}

pub async fn address_entry_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddressRequest>, JsonRejection>,
) -> ApiResult<Address> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let patch = req.into_patch()?;

    let address = state
        .store
        .addresses
        .update(auth.user_id, id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("address not found"))?;

    Ok(ApiResponse::success(address).with_message("address updated successfully"))
}

pub async fn address_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;

    if !state.store.addresses.delete(auth.user_id, id).await? {
        return Err(ApiError::not_found("address not found"));
    }

    Ok(ApiResponse::success(json!({ "id": id })).with_message("address deleted successfully"))
}
