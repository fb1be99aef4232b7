// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (user token) → Elevated (admin token, role
// re-checked against the user store on every request).
//
// Handlers return `ApiResult<T>`; every failure is an `ApiError` and is
// rendered by one shared `IntoResponse` impl.

pub mod elevated; // Tier 3: admin only (/users, /user/*, POST/PUT/DELETE /product)
pub mod protected; // Tier 2: any authenticated user (/profile, /cart, /wishlist, ...)
pub mod public; // Tier 1: no authentication (/register, /login, catalog reads)
pub mod validate;
