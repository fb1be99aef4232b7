use crate::auth::{JwtError, PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::Store;

/// Shared, cheaply cloneable handles injected into every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Store) -> Result<Self, JwtError> {
        Ok(Self {
            store,
            tokens: TokenService::from_config(&config.security)?,
            passwords: PasswordHasher::new(config.security.bcrypt_cost),
        })
    }
}
