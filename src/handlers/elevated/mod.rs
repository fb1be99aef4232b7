// handlers/elevated/mod.rs - Elevated handlers (administrator required)
//
// User administration and catalog maintenance.
//
// Security Level: Valid token whose subject is a stored admin
// Middleware: require_admin (role read from the user store per request)

pub mod products; // POST /product, PUT/DELETE /product/:productId
pub mod users; // GET /users, PUT /user/role, DELETE /user/:userId
