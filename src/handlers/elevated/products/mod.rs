// handlers/elevated/products/mod.rs - Catalog maintenance handlers

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::handlers::validate::trimmed;

pub mod create; // POST /product
pub mod delete; // DELETE /product/:productId
pub mod update; // PUT /product/:productId

pub use create::product_create;
pub use delete::product_delete;
pub use update::product_update;

/// Body of both POST and PUT; which fields are required depends on the verb.
/// `price` is checked by `Validator::price`, `validator` has no decimal rules.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(range(min = 0, max = 2147483647, message = "must be zero or greater"))]
    pub stock: Option<i64>,
}

impl ProductRequest {
    /// In range once `validate` has passed
    fn stock(&self) -> Option<i32> {
        self.stock.and_then(|s| i32::try_from(s).ok())
    }
}
