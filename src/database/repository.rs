use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Address, AddressPatch, CartItem, CartLine, NewAddress, NewProduct, NewReview, NewUser,
    Product, ProductFilter, ProductPatch, ProfilePatch, Review, ReviewPatch, ReviewWithAuthor,
    Role, User, WishlistItem, WishlistLine,
};

pub type DbResult<T> = Result<T, DatabaseError>;

/// Which rows a scoped mutation may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only rows owned by this user
    Owner(Uuid),
    /// Any row; administrators only
    Any,
}

impl Scope {
    pub fn permits(&self, owner: Uuid) -> bool {
        match self {
            Scope::Owner(user_id) => *user_id == owner,
            Scope::Any => true,
        }
    }
}

/// Outcome of a write keyed on a natural key
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert<T> {
    Created(T),
    Updated(T),
    /// The row already existed and was left alone
    Unchanged(T),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> DbResult<Vec<User>>;
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>>;
    /// Fails with `UniqueViolation` when email or mobile is taken
    async fn insert(&self, user: NewUser) -> DbResult<User>;
    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> DbResult<Option<User>>;
    async fn set_role(&self, id: Uuid, role: Role) -> DbResult<Option<User>>;
    /// Returns true if a row was deleted
    async fn delete(&self, id: Uuid) -> DbResult<bool>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>>;
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<Product>>;
    async fn insert(&self, product: NewProduct) -> DbResult<Product>;
    async fn update(&self, id: Uuid, patch: ProductPatch) -> DbResult<Option<Product>>;
    async fn delete(&self, id: Uuid) -> DbResult<bool>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<CartLine>>;
    async fn find(&self, user_id: Uuid, product_id: Uuid) -> DbResult<Option<CartLine>>;
    /// Inserts the line or adds `quantity` to the existing one, atomically
    async fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> DbResult<Upsert<CartItem>>;
    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> DbResult<bool>;
    /// Returns the number of lines removed
    async fn clear(&self, user_id: Uuid) -> DbResult<u64>;
}

#[async_trait]
pub trait WishlistRepository: Send + Sync {
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<WishlistLine>>;
    /// Second add of the same product is a no-op
    async fn add(&self, user_id: Uuid, product_id: Uuid) -> DbResult<Upsert<WishlistItem>>;
    async fn repoint(&self, user_id: Uuid, id: Uuid, product_id: Uuid) -> DbResult<Option<WishlistItem>>;
    async fn remove(&self, user_id: Uuid, id: Uuid) -> DbResult<bool>;
    async fn remove_product(&self, user_id: Uuid, product_id: Uuid) -> DbResult<bool>;
}

#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<Address>>;
    async fn find(&self, user_id: Uuid, id: Uuid) -> DbResult<Option<Address>>;
    /// Earliest address on file for the user
    async fn first(&self, user_id: Uuid) -> DbResult<Option<Address>>;
    async fn insert(&self, user_id: Uuid, address: NewAddress) -> DbResult<Address>;
    async fn update(&self, user_id: Uuid, id: Uuid, patch: AddressPatch) -> DbResult<Option<Address>>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> DbResult<bool>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn list_for_product(&self, product_id: Uuid) -> DbResult<Vec<ReviewWithAuthor>>;
    async fn insert(&self, review: NewReview) -> DbResult<Review>;
    async fn update(&self, scope: Scope, id: Uuid, patch: ReviewPatch) -> DbResult<Option<Review>>;
    async fn delete(&self, scope: Scope, id: Uuid) -> DbResult<bool>;
}
