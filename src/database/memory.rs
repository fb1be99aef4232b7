use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Address, AddressPatch, CartItem, CartLine, NewAddress, NewProduct, NewReview, NewUser,
    Product, ProductFilter, ProductPatch, ProfilePatch, Review, ReviewAuthor, ReviewPatch,
    ReviewWithAuthor, Role, User, WishlistItem, WishlistLine,
};
use crate::database::repository::{
    AddressRepository, CartRepository, DbResult, ProductRepository, ReviewRepository, Scope,
    Upsert, UserRepository, WishlistRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    products: HashMap<Uuid, Product>,
    cart_items: HashMap<Uuid, CartItem>,
    wishlist_items: HashMap<Uuid, WishlistItem>,
    addresses: HashMap<Uuid, Address>,
    reviews: HashMap<Uuid, Review>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn mobile_taken(&self, mobile: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.mobile == mobile && Some(u.id) != except)
    }

    fn cart_line(&self, item: &CartItem) -> CartLine {
        CartLine {
            item: item.clone(),
            product: self.products.get(&item.product_id).cloned(),
        }
    }

    fn wishlist_line(&self, item: &WishlistItem) -> WishlistLine {
        WishlistLine {
            item: item.clone(),
            product: self.products.get(&item.product_id).cloned(),
        }
    }

    fn review_author(&self, user_id: Uuid) -> Option<ReviewAuthor> {
        self.users.get(&user_id).map(|u| ReviewAuthor {
            id: u.id,
            firstname: u.firstname.clone(),
            lastname: u.lastname.clone(),
            profile_photo: u.profile_photo.clone(),
        })
    }
}

/// Process-local store behind one lock. Enforces the same unique keys as
/// the Postgres schema, so the write lock makes check-then-insert atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_creation<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by_key(key);
    rows
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list(&self) -> DbResult<Vec<User>> {
        let tables = self.tables.read().await;
        let users = tables.users.values().cloned().collect();
        Ok(sorted_by_creation(users, |u: &User| (u.created_at, u.id)))
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> DbResult<User> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(DatabaseError::UniqueViolation("email".to_string()));
        }
        if tables.mobile_taken(&user.mobile, None) {
            return Err(DatabaseError::UniqueViolation("mobile".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            mobile: user.mobile,
            password_hash: user.password_hash,
            firstname: user.firstname,
            lastname: user.lastname,
            role: user.role,
            profile_photo: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> DbResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(mobile) = patch.mobile.as_deref() {
            if tables.mobile_taken(mobile, Some(id)) {
                return Err(DatabaseError::UniqueViolation("mobile".to_string()));
            }
        }

        Ok(tables.users.get_mut(&id).map(|user| {
            patch.apply(user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_role(&self, id: Uuid, role: Role) -> DbResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        Ok(self.tables.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let tables = self.tables.read().await;
        let products = tables
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(sorted_by_creation(products, |p: &Product| (p.created_at, p.id)))
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn insert(&self, product: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            category: product.category,
            description: product.description,
            price: product.price,
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: Uuid, patch: ProductPatch) -> DbResult<Option<Product>> {
        let mut tables = self.tables.write().await;
        Ok(tables.products.get_mut(&id).map(|product| {
            patch.apply(product);
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        Ok(self.tables.write().await.products.remove(&id).is_some())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<CartLine>> {
        let tables = self.tables.read().await;
        let items = tables
            .cart_items
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |i: &CartItem| (i.created_at, i.id))
            .iter()
            .map(|i| tables.cart_line(i))
            .collect())
    }

    async fn find(&self, user_id: Uuid, product_id: Uuid) -> DbResult<Option<CartLine>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cart_items
            .values()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
            .map(|i| tables.cart_line(i)))
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> DbResult<Upsert<CartItem>> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(existing) = tables
            .cart_items
            .values_mut()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
        {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| DatabaseError::OutOfRange("quantity".to_string()))?;
            existing.updated_at = now;
            return Ok(Upsert::Updated(existing.clone()));
        }

        let item = CartItem {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        };
        tables.cart_items.insert(item.id, item.clone());
        Ok(Upsert::Created(item))
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.cart_items.len();
        tables
            .cart_items
            .retain(|_, i| !(i.user_id == user_id && i.product_id == product_id));
        Ok(tables.cart_items.len() < before)
    }

    async fn clear(&self, user_id: Uuid) -> DbResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.cart_items.len();
        tables.cart_items.retain(|_, i| i.user_id != user_id);
        Ok((before - tables.cart_items.len()) as u64)
    }
}

#[async_trait]
impl WishlistRepository for MemoryStore {
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<WishlistLine>> {
        let tables = self.tables.read().await;
        let items = tables
            .wishlist_items
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |i: &WishlistItem| (i.created_at, i.id))
            .iter()
            .map(|i| tables.wishlist_line(i))
            .collect())
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid) -> DbResult<Upsert<WishlistItem>> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .wishlist_items
            .values()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
        {
            return Ok(Upsert::Unchanged(existing.clone()));
        }

        let item = WishlistItem {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            created_at: Utc::now(),
        };
        tables.wishlist_items.insert(item.id, item.clone());
        Ok(Upsert::Created(item))
    }

    async fn repoint(&self, user_id: Uuid, id: Uuid, product_id: Uuid) -> DbResult<Option<WishlistItem>> {
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .wishlist_items
            .values()
            .any(|i| i.user_id == user_id && i.product_id == product_id && i.id != id);

        match tables.wishlist_items.get_mut(&id) {
            Some(item) if item.user_id == user_id => {
                if duplicate {
                    return Err(DatabaseError::UniqueViolation("wishlist item".to_string()));
                }
                item.product_id = product_id;
                Ok(Some(item.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn remove(&self, user_id: Uuid, id: Uuid) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.wishlist_items.get(&id) {
            Some(item) if item.user_id == user_id => {
                tables.wishlist_items.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_product(&self, user_id: Uuid, product_id: Uuid) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.wishlist_items.len();
        tables
            .wishlist_items
            .retain(|_, i| !(i.user_id == user_id && i.product_id == product_id));
        Ok(tables.wishlist_items.len() < before)
    }
}

#[async_trait]
impl AddressRepository for MemoryStore {
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<Address>> {
        let tables = self.tables.read().await;
        let addresses = tables
            .addresses
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(addresses, |a: &Address| (a.created_at, a.id)))
    }

    async fn find(&self, user_id: Uuid, id: Uuid) -> DbResult<Option<Address>> {
        let tables = self.tables.read().await;
        Ok(tables
            .addresses
            .get(&id)
            .filter(|a| a.user_id == user_id)
            .cloned())
    }

    async fn first(&self, user_id: Uuid) -> DbResult<Option<Address>> {
        Ok(AddressRepository::list(self, user_id).await?.into_iter().next())
    }

    async fn insert(&self, user_id: Uuid, address: NewAddress) -> DbResult<Address> {
        let now = Utc::now();
        let address = Address {
            id: Uuid::new_v4(),
            user_id,
            country: address.country,
            county: address.county,
            town: address.town,
            building: address.building,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .addresses
            .insert(address.id, address.clone());
        Ok(address)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, patch: AddressPatch) -> DbResult<Option<Address>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .addresses
            .get_mut(&id)
            .filter(|a| a.user_id == user_id)
            .map(|address| {
                patch.apply(address);
                address.updated_at = Utc::now();
                address.clone()
            }))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.addresses.get(&id) {
            Some(address) if address.user_id == user_id => {
                tables.addresses.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn list_for_product(&self, product_id: Uuid) -> DbResult<Vec<ReviewWithAuthor>> {
        let tables = self.tables.read().await;
        let reviews = tables
            .reviews
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(reviews, |r: &Review| (r.created_at, r.id))
            .into_iter()
            .map(|review| ReviewWithAuthor {
                author: tables.review_author(review.user_id),
                review,
            })
            .collect())
    }

    async fn insert(&self, review: NewReview) -> DbResult<Review> {
        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            user_id: review.user_id,
            product_id: review.product_id,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .reviews
            .insert(review.id, review.clone());
        Ok(review)
    }

    async fn update(&self, scope: Scope, id: Uuid, patch: ReviewPatch) -> DbResult<Option<Review>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .reviews
            .get_mut(&id)
            .filter(|r| scope.permits(r.user_id))
            .map(|review| {
                patch.apply(review);
                review.updated_at = Utc::now();
                review.clone()
            }))
    }

    async fn delete(&self, scope: Scope, id: Uuid) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.reviews.get(&id) {
            Some(review) if scope.permits(review.user_id) => {
                tables.reviews.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
