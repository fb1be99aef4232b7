// handlers/elevated/users/mod.rs - User administration handlers

pub mod delete; // DELETE /user/:userId
pub mod list; // GET /users
pub mod role; // PUT /user/role

pub use delete::user_delete;
pub use list::users_list;
pub use role::user_role_put;
