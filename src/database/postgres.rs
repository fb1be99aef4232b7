use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
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

const USER_COLUMNS: &str =
    "id, email, mobile, password_hash, firstname, lastname, role, profile_photo, created_at, updated_at";
const PRODUCT_COLUMNS: &str = "id, name, category, description, price, stock, created_at, updated_at";
const ADDRESS_COLUMNS: &str = "id, user_id, country, county, town, building, created_at, updated_at";
const REVIEW_COLUMNS: &str = "id, user_id, product_id, rating, comment, created_at, updated_at";

/// Product columns aliased with a `p_` prefix for joined reads
const JOINED_PRODUCT_COLUMNS: &str = "p.id AS p_id, p.name AS p_name, p.category AS p_category, \
     p.description AS p_description, p.price AS p_price, p.stock AS p_stock, \
     p.created_at AS p_created_at, p.updated_at AS p_updated_at";

/// Repositories backed by one Postgres pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        mobile: row.try_get("mobile")?,
        password_hash: row.try_get("password_hash")?,
        firstname: row.try_get("firstname")?,
        lastname: row.try_get("lastname")?,
        role: role.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
        profile_photo: row.try_get("profile_photo")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Decodes the `p_`-prefixed product of a LEFT JOIN; `None` when dangling
fn joined_product(row: &PgRow) -> Result<Option<Product>, sqlx::Error> {
    let id: Option<Uuid> = row.try_get("p_id")?;
    let Some(id) = id else {
        return Ok(None);
    };

    Ok(Some(Product {
        id,
        name: row.try_get("p_name")?,
        category: row.try_get("p_category")?,
        description: row.try_get("p_description")?,
        price: row.try_get::<Decimal, _>("p_price")?,
        stock: row.try_get("p_stock")?,
        created_at: row.try_get::<DateTime<Utc>, _>("p_created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("p_updated_at")?,
    }))
}

#[async_trait]
impl UserRepository for PgStore {
    async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at, id", USER_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(user_from_row).collect::<Result<_, _>>()?)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query(&sql).bind(email).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn insert(&self, user: NewUser) -> DbResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, mobile, password_hash, firstname, lastname, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.mobile)
            .bind(&user.password_hash)
            .bind(&user.firstname)
            .bind(&user.lastname)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(user_from_row(&row)?)
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> DbResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET \
                firstname = COALESCE($2, firstname), \
                lastname = COALESCE($3, lastname), \
                mobile = COALESCE($4, mobile), \
                profile_photo = COALESCE($5, profile_photo), \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.firstname)
            .bind(patch.lastname)
            .bind(patch.mobile)
            .bind(patch.profile_photo)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> DbResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE ($1::text IS NULL OR category = $1) ORDER BY created_at, id",
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(filter.category.as_deref())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert(&self, product: NewProduct) -> DbResult<Product> {
        let sql = format!(
            "INSERT INTO products (id, name, category, description, price, stock) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4())
            .bind(product.name)
            .bind(product.category)
            .bind(product.description)
            .bind(product.price)
            .bind(product.stock)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update(&self, id: Uuid, patch: ProductPatch) -> DbResult<Option<Product>> {
        let sql = format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                category = COALESCE($3, category), \
                description = COALESCE($4, description), \
                price = COALESCE($5, price), \
                stock = COALESCE($6, stock), \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.category)
            .bind(patch.description)
            .bind(patch.price)
            .bind(patch.stock)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn cart_line_from_row(row: &PgRow) -> Result<CartLine, sqlx::Error> {
    Ok(CartLine {
        item: CartItem::from_row(row)?,
        product: joined_product(row)?,
    })
}

#[async_trait]
impl CartRepository for PgStore {
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<CartLine>> {
        let sql = format!(
            "SELECT c.id, c.user_id, c.product_id, c.quantity, c.created_at, c.updated_at, {} \
             FROM cart_items c LEFT JOIN products p ON p.id = c.product_id \
             WHERE c.user_id = $1 ORDER BY c.created_at, c.id",
            JOINED_PRODUCT_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(cart_line_from_row).collect::<Result<_, _>>()?)
    }

    async fn find(&self, user_id: Uuid, product_id: Uuid) -> DbResult<Option<CartLine>> {
        let sql = format!(
            "SELECT c.id, c.user_id, c.product_id, c.quantity, c.created_at, c.updated_at, {} \
             FROM cart_items c LEFT JOIN products p ON p.id = c.product_id \
             WHERE c.user_id = $1 AND c.product_id = $2",
            JOINED_PRODUCT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(cart_line_from_row).transpose()?)
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> DbResult<Upsert<CartItem>> {
        // xmax = 0 only for a freshly inserted tuple. The WHERE skips an
        // increment that would overflow INTEGER, which then returns no row.
        let row = sqlx::query(
            "INSERT INTO cart_items (id, user_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT cart_items_user_product_key DO UPDATE \
                SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = now() \
                WHERE cart_items.quantity <= 2147483647 - EXCLUDED.quantity \
             RETURNING id, user_id, product_id, quantity, created_at, updated_at, (xmax = 0) AS inserted",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::OutOfRange("quantity".to_string()))?;

        let item = CartItem::from_row(&row)?;
        let inserted: bool = row.try_get("inserted")?;
        Ok(if inserted {
            Upsert::Created(item)
        } else {
            Upsert::Updated(item)
        })
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, user_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl WishlistRepository for PgStore {
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<WishlistLine>> {
        let sql = format!(
            "SELECT w.id, w.user_id, w.product_id, w.created_at, {} \
             FROM wishlist_items w LEFT JOIN products p ON p.id = w.product_id \
             WHERE w.user_id = $1 ORDER BY w.created_at, w.id",
            JOINED_PRODUCT_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(|row| {
                Ok(WishlistLine {
                    item: WishlistItem::from_row(row)?,
                    product: joined_product(row)?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()?)
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid) -> DbResult<Upsert<WishlistItem>> {
        let inserted = sqlx::query_as::<_, WishlistItem>(
            "INSERT INTO wishlist_items (id, user_id, product_id) VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT wishlist_items_user_product_key DO NOTHING \
             RETURNING id, user_id, product_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(item) = inserted {
            return Ok(Upsert::Created(item));
        }

        let existing = sqlx::query_as::<_, WishlistItem>(
            "SELECT id, user_id, product_id, created_at FROM wishlist_items \
             WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Upsert::Unchanged(existing))
    }

    async fn repoint(&self, user_id: Uuid, id: Uuid, product_id: Uuid) -> DbResult<Option<WishlistItem>> {
        Ok(sqlx::query_as::<_, WishlistItem>(
            "UPDATE wishlist_items SET product_id = $3 WHERE id = $1 AND user_id = $2 \
             RETURNING id, user_id, product_id, created_at",
        )
        .bind(id)
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn remove(&self, user_id: Uuid, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM wishlist_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_product(&self, user_id: Uuid, product_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AddressRepository for PgStore {
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<Address>> {
        let sql = format!(
            "SELECT {} FROM addresses WHERE user_id = $1 ORDER BY created_at, id",
            ADDRESS_COLUMNS
        );
        Ok(sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find(&self, user_id: Uuid, id: Uuid) -> DbResult<Option<Address>> {
        let sql = format!(
            "SELECT {} FROM addresses WHERE id = $1 AND user_id = $2",
            ADDRESS_COLUMNS
        );
        Ok(sqlx::query_as::<_, Address>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn first(&self, user_id: Uuid) -> DbResult<Option<Address>> {
        let sql = format!(
            "SELECT {} FROM addresses WHERE user_id = $1 ORDER BY created_at, id LIMIT 1",
            ADDRESS_COLUMNS
        );
        Ok(sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert(&self, user_id: Uuid, address: NewAddress) -> DbResult<Address> {
        let sql = format!(
            "INSERT INTO addresses (id, user_id, country, county, town, building) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            ADDRESS_COLUMNS
        );
        Ok(sqlx::query_as::<_, Address>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(address.country)
            .bind(address.county)
            .bind(address.town)
            .bind(address.building)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, patch: AddressPatch) -> DbResult<Option<Address>> {
        let sql = format!(
            "UPDATE addresses SET \
                country = COALESCE($3, country), \
                county = COALESCE($4, county), \
                town = COALESCE($5, town), \
                building = COALESCE($6, building), \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            ADDRESS_COLUMNS
        );
        Ok(sqlx::query_as::<_, Address>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(patch.country)
            .bind(patch.county)
            .bind(patch.town)
            .bind(patch.building)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn scope_owner(scope: Scope) -> Option<Uuid> {
    match scope {
        Scope::Owner(user_id) => Some(user_id),
        Scope::Any => None,
    }
}

#[async_trait]
impl ReviewRepository for PgStore {
    async fn list_for_product(&self, product_id: Uuid) -> DbResult<Vec<ReviewWithAuthor>> {
        let rows = sqlx::query(
            "SELECT r.id, r.user_id, r.product_id, r.rating, r.comment, r.created_at, r.updated_at, \
                    u.id AS author_id, u.firstname AS author_firstname, \
                    u.lastname AS author_lastname, u.profile_photo AS author_profile_photo \
             FROM reviews r LEFT JOIN users u ON u.id = r.user_id \
             WHERE r.product_id = $1 ORDER BY r.created_at, r.id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        let reviews = rows
            .iter()
            .map(|row| {
                let author_id: Option<Uuid> = row.try_get("author_id")?;
                let author = match author_id {
                    Some(id) => Some(ReviewAuthor {
                        id,
                        firstname: row.try_get("author_firstname")?,
                        lastname: row.try_get("author_lastname")?,
                        profile_photo: row.try_get("author_profile_photo")?,
                    }),
                    None => None,
                };
                Ok(ReviewWithAuthor {
                    review: Review::from_row(row)?,
                    author,
                })
            })
            .collect::<Result<_, sqlx::Error>>()?;
        Ok(reviews)
    }

    async fn insert(&self, review: NewReview) -> DbResult<Review> {
        let sql = format!(
            "INSERT INTO reviews (id, user_id, product_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            REVIEW_COLUMNS
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(Uuid::new_v4())
            .bind(review.user_id)
            .bind(review.product_id)
            .bind(review.rating)
            .bind(review.comment)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update(&self, scope: Scope, id: Uuid, patch: ReviewPatch) -> DbResult<Option<Review>> {
        let sql = format!(
            "UPDATE reviews SET \
                rating = COALESCE($3, rating), \
                comment = COALESCE($4, comment), \
                updated_at = now() \
             WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2) RETURNING {}",
            REVIEW_COLUMNS
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .bind(scope_owner(scope))
            .bind(patch.rating)
            .bind(patch.comment)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, scope: Scope, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)")
            .bind(id)
            .bind(scope_owner(scope))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
