// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation, token acquisition and read-only catalog access.
//
// Security Level: None
// Middleware: None

pub mod auth;
pub mod products;
pub mod reviews;

pub use auth::{login, register};
pub use products::{product_get, products_get};
pub use reviews::reviews_get;
