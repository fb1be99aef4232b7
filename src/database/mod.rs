pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

use std::sync::Arc;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{
    AddressRepository, CartRepository, DbResult, ProductRepository, ReviewRepository, Scope,
    Upsert, UserRepository, WishlistRepository,
};

#[derive(Debug, Clone)]
enum Backend {
    Postgres(DatabaseManager),
    Memory,
}

/// One handle per entity repository, shared by every request
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub wishlists: Arc<dyn WishlistRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    backend: Backend,
}

impl Store {
    pub fn postgres(db: DatabaseManager) -> Self {
        let pg = Arc::new(PgStore::new(db.pool().clone()));

        Self {
            users: pg.clone(),
            products: pg.clone(),
            carts: pg.clone(),
            wishlists: pg.clone(),
            addresses: pg.clone(),
            reviews: pg,
            backend: Backend::Postgres(db),
        }
    }

    pub fn memory() -> Self {
        let mem = Arc::new(MemoryStore::new());

        Self {
            users: mem.clone(),
            products: mem.clone(),
            carts: mem.clone(),
            wishlists: mem.clone(),
            addresses: mem.clone(),
            reviews: mem,
            backend: Backend::Memory,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory => "memory",
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.backend {
            Backend::Postgres(db) => db.health_check().await,
            Backend::Memory => Ok(()),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("backend", &self.backend_name())
            .finish_non_exhaustive()
    }
}
